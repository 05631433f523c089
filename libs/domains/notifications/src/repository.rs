use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::NotificationResult;
use crate::models::{ChildRecord, DeliveryRecord, NotificationSettings, Role, UserRecord};

/// Largest id list the hosted document store accepts in one `in` query.
pub const DEFAULT_ID_BATCH_SIZE: usize = 10;

/// Read access to users and children.
///
/// Implementations can use different storage backends (MongoDB, in-memory).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// All users with the given role
    async fn users_by_role(&self, role: Role) -> NotificationResult<Vec<UserRecord>>;

    /// Children whose group equals any of `groups`
    async fn children_in_groups(&self, groups: &[String]) -> NotificationResult<Vec<ChildRecord>>;

    /// Users whose uid is in `ids`. Callers never pass more than
    /// [`Directory::max_ids_per_query`] ids at once.
    async fn users_by_ids(&self, ids: &[String]) -> NotificationResult<Vec<UserRecord>>;

    /// A single user by uid
    async fn user_by_id(&self, id: &str) -> NotificationResult<Option<UserRecord>>;

    /// Backend limit for `users_by_ids`
    fn max_ids_per_query(&self) -> usize {
        DEFAULT_ID_BATCH_SIZE
    }
}

/// Per-user notification settings lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` when the user never saved settings
    async fn get_settings(&self, user_id: &str) -> NotificationResult<Option<NotificationSettings>>;
}

/// Append-only delivery audit log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Persist one delivery record
    async fn record(&self, record: &DeliveryRecord) -> NotificationResult<()>;

    /// Most recent records for a recipient email, newest first
    async fn list_for_recipient(
        &self,
        recipient_email: &str,
        limit: usize,
    ) -> NotificationResult<Vec<DeliveryRecord>>;
}

// ============================================================================
// In-memory implementations (for development/testing)
// ============================================================================

/// In-memory implementation of Directory
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    users: Arc<RwLock<Vec<UserRecord>>>,
    children: Arc<RwLock<Vec<ChildRecord>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
            children: Arc::default(),
        }
    }

    pub fn with_children(self, children: Vec<ChildRecord>) -> Self {
        Self {
            users: self.users,
            children: Arc::new(RwLock::new(children)),
        }
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn users_by_role(&self, role: Role) -> NotificationResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.role == role).cloned().collect())
    }

    async fn children_in_groups(&self, groups: &[String]) -> NotificationResult<Vec<ChildRecord>> {
        let children = self.children.read().await;
        Ok(children
            .iter()
            .filter(|c| groups.iter().any(|g| *g == c.group))
            .cloned()
            .collect())
    }

    async fn users_by_ids(&self, ids: &[String]) -> NotificationResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| ids.iter().any(|id| *id == u.uid))
            .cloned()
            .collect())
    }

    async fn user_by_id(&self, id: &str) -> NotificationResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.uid == id).cloned())
    }
}

/// In-memory implementation of SettingsStore
#[derive(Debug, Default, Clone)]
pub struct InMemorySettingsStore {
    settings: Arc<RwLock<HashMap<String, NotificationSettings>>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, user_id: impl Into<String>, settings: NotificationSettings) {
        self.settings.write().await.insert(user_id.into(), settings);
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_settings(&self, user_id: &str) -> NotificationResult<Option<NotificationSettings>> {
        let settings = self.settings.read().await;
        Ok(settings.get(user_id).copied())
    }
}

/// In-memory implementation of DeliveryLog
#[derive(Debug, Default, Clone)]
pub struct InMemoryDeliveryLog {
    records: Arc<RwLock<Vec<DeliveryRecord>>>,
}

impl InMemoryDeliveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record in insertion order
    pub async fn records(&self) -> Vec<DeliveryRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DeliveryLog for InMemoryDeliveryLog {
    async fn record(&self, record: &DeliveryRecord) -> NotificationResult<()> {
        self.records.write().await.push(record.clone());
        tracing::debug!(record_id = %record.id, status = %record.status, "Stored delivery record");
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient_email: &str,
        limit: usize,
    ) -> NotificationResult<Vec<DeliveryRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<DeliveryRecord> = records
            .iter()
            .filter(|r| r.recipient_email == recipient_email)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matching.truncate(limit);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryMetadata, TemplateKind};

    fn users() -> Vec<UserRecord> {
        vec![
            UserRecord::new("a1", "admin@daycare.test", Role::Admin),
            UserRecord::new("p1", "p1@x.com", Role::Parent),
            UserRecord::new("p2", "p2@x.com", Role::Parent),
        ]
    }

    #[tokio::test]
    async fn test_users_by_role() {
        let directory = InMemoryDirectory::with_users(users());

        let admins = directory.users_by_role(Role::Admin).await.unwrap();
        let parents = directory.users_by_role(Role::Parent).await.unwrap();

        assert_eq!(admins.len(), 1);
        assert_eq!(parents.len(), 2);
    }

    #[tokio::test]
    async fn test_children_in_groups_matches_exact_names() {
        let directory = InMemoryDirectory::new().with_children(vec![
            ChildRecord::new("c1", "Mia", "Toddler", "p1"),
            ChildRecord::new("c2", "Leo", "Infant", "p2"),
            ChildRecord::new("c3", "Ava", "Toddlers", "p2"),
        ]);

        let children = directory
            .children_in_groups(&["Toddler".to_string()])
            .await
            .unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Mia");
    }

    #[tokio::test]
    async fn test_users_by_ids_and_user_by_id() {
        let directory = InMemoryDirectory::with_users(users());

        let found = directory
            .users_by_ids(&["p2".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uid, "p2");

        assert!(directory.user_by_id("a1").await.unwrap().is_some());
        assert!(directory.user_by_id("nope").await.unwrap().is_none());
        assert_eq!(directory.max_ids_per_query(), DEFAULT_ID_BATCH_SIZE);
    }

    #[tokio::test]
    async fn test_settings_store_returns_none_when_unset() {
        let store = InMemorySettingsStore::new();
        store
            .set(
                "p1",
                NotificationSettings {
                    notify_on_invoices: false,
                    ..Default::default()
                },
            )
            .await;

        assert!(store.get_settings("p2").await.unwrap().is_none());
        let saved = store.get_settings("p1").await.unwrap().unwrap();
        assert!(!saved.notify_on_invoices);
    }

    #[tokio::test]
    async fn test_delivery_log_lists_newest_first() {
        let log = InMemoryDeliveryLog::new();
        let parent = UserRecord::new("p1", "p1@x.com", Role::Parent);
        let other = UserRecord::new("p2", "p2@x.com", Role::Parent);

        for (user, subject) in [(&parent, "first"), (&other, "other"), (&parent, "second")] {
            let record = DeliveryRecord::sent(
                user,
                subject.to_string(),
                String::new(),
                DeliveryMetadata::new(TemplateKind::NewInvoice, None),
                None,
            );
            log.record(&record).await.unwrap();
        }

        assert_eq!(log.len().await, 3);
        let listed = log.list_for_recipient("p1@x.com", 10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].subject, "second");

        let limited = log.list_for_recipient("p1@x.com", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
