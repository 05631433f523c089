//! MongoDB implementations of the notification stores

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
    options::FindOptions,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::NotificationResult;
use crate::models::{ChildRecord, DeliveryRecord, NotificationSettings, Role, UserRecord};
use crate::repository::{DEFAULT_ID_BATCH_SIZE, DeliveryLog, Directory, SettingsStore};

pub const USERS_COLLECTION: &str = "users";
pub const CHILDREN_COLLECTION: &str = "children";
pub const SETTINGS_COLLECTION: &str = "notificationSettings";
pub const DELIVERY_LOG_COLLECTION: &str = "notificationLogs";

/// Users and children read from the application database
pub struct MongoDirectory {
    users: Collection<UserRecord>,
    children: Collection<ChildRecord>,
    batch_size: usize,
}

impl MongoDirectory {
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let directory = MongoDirectory::new(&client.database("daycare"));
    /// ```
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection::<UserRecord>(USERS_COLLECTION),
            children: db.collection::<ChildRecord>(CHILDREN_COLLECTION),
            batch_size: DEFAULT_ID_BATCH_SIZE,
        }
    }

    /// Override the `$in` batch size used by callers.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn find_users(&self, filter: Document) -> NotificationResult<Vec<UserRecord>> {
        let cursor = self.users.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl Directory for MongoDirectory {
    #[instrument(skip(self))]
    async fn users_by_role(&self, role: Role) -> NotificationResult<Vec<UserRecord>> {
        self.find_users(doc! { "role": role.to_string() }).await
    }

    #[instrument(skip(self))]
    async fn children_in_groups(&self, groups: &[String]) -> NotificationResult<Vec<ChildRecord>> {
        let cursor = self.children.find(doc! { "group": { "$in": groups.to_vec() } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn users_by_ids(&self, ids: &[String]) -> NotificationResult<Vec<UserRecord>> {
        self.find_users(doc! { "uid": { "$in": ids.to_vec() } }).await
    }

    #[instrument(skip(self))]
    async fn user_by_id(&self, id: &str) -> NotificationResult<Option<UserRecord>> {
        Ok(self.users.find_one(doc! { "uid": id }).await?)
    }

    fn max_ids_per_query(&self) -> usize {
        self.batch_size
    }
}

/// Settings documents are keyed by the user id.
#[derive(Debug, Deserialize)]
struct SettingsDocument {
    #[serde(flatten)]
    settings: NotificationSettings,
}

pub struct MongoSettingsStore {
    collection: Collection<SettingsDocument>,
}

impl MongoSettingsStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(SETTINGS_COLLECTION),
        }
    }
}

#[async_trait]
impl SettingsStore for MongoSettingsStore {
    #[instrument(skip(self))]
    async fn get_settings(&self, user_id: &str) -> NotificationResult<Option<NotificationSettings>> {
        let found = self.collection.find_one(doc! { "_id": user_id }).await?;
        Ok(found.map(|d| d.settings))
    }
}

/// Append-only `notificationLogs` collection
pub struct MongoDeliveryLog {
    collection: Collection<DeliveryRecord>,
}

impl MongoDeliveryLog {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(DELIVERY_LOG_COLLECTION),
        }
    }
}

#[async_trait]
impl DeliveryLog for MongoDeliveryLog {
    #[instrument(skip(self, record), fields(record_id = %record.id, status = %record.status))]
    async fn record(&self, record: &DeliveryRecord) -> NotificationResult<()> {
        self.collection.insert_one(record).await?;
        tracing::debug!("Delivery record stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_recipient(
        &self,
        recipient_email: &str,
        limit: usize,
    ) -> NotificationResult<Vec<DeliveryRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();

        let cursor = self
            .collection
            .find(doc! { "recipientEmail": recipient_email })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
