//! Per-user opt-out gate.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::NotificationCategory;
use crate::repository::SettingsStore;

/// Decides whether a user receives a category of notification.
///
/// Users without a settings document get everything. A failed lookup
/// suppresses the send and is only logged.
#[derive(Clone)]
pub struct SettingsGate {
    store: Arc<dyn SettingsStore>,
}

impl SettingsGate {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub async fn is_enabled(&self, user_id: &str, category: NotificationCategory) -> bool {
        match self.store.get_settings(user_id).await {
            Ok(Some(settings)) => {
                let enabled = settings.is_enabled(category);
                if !enabled {
                    debug!(user_id, %category, "User opted out of category");
                }
                enabled
            }
            Ok(None) => true,
            Err(err) => {
                warn!(user_id, %category, error = %err, "Settings lookup failed, not sending");
                false
            }
        }
    }
}
