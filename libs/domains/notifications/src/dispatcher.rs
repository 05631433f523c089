//! Send-and-record.
//!
//! Every call makes exactly one transport attempt and appends exactly one
//! delivery record, whatever the transport says. Failures come back as a
//! value; nothing here returns an error to the caller.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::NotificationResult;
use crate::models::{DeliveryMetadata, DeliveryRecord, UserRecord};
use crate::processor::RenderedEmail;
use crate::providers::{EmailContent, EmailProvider};
use crate::repository::DeliveryLog;

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent { message_id: Option<String> },
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn EmailProvider>,
    log: Arc<dyn DeliveryLog>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn EmailProvider>, log: Arc<dyn DeliveryLog>) -> Self {
        Self { provider, log }
    }

    pub async fn health_check(&self) -> NotificationResult<bool> {
        self.provider.health_check().await
    }

    /// Send `email` to `recipient` and persist the outcome.
    pub async fn dispatch(
        &self,
        recipient: &UserRecord,
        email: RenderedEmail,
        metadata: DeliveryMetadata,
    ) -> DeliveryOutcome {
        let content = EmailContent {
            to_email: recipient.email.clone(),
            to_name: recipient.display_name.clone().unwrap_or_default(),
            subject: email.subject,
            html_body: email.html,
        };

        let (record, outcome) = match self.provider.send(&content).await {
            Ok(sent) => {
                info!(
                    recipient = %recipient.email,
                    kind = %metadata.kind,
                    provider = self.provider.name(),
                    message_id = ?sent.message_id,
                    "Notification sent"
                );
                let record = DeliveryRecord::sent(
                    recipient,
                    content.subject,
                    content.html_body,
                    metadata,
                    sent.message_id.clone(),
                );
                (record, DeliveryOutcome::Sent { message_id: sent.message_id })
            }
            Err(err) => {
                let reason = err.delivery_reason();
                warn!(
                    recipient = %recipient.email,
                    kind = %metadata.kind,
                    provider = self.provider.name(),
                    error = %reason,
                    "Notification delivery failed"
                );
                let record = DeliveryRecord::failed(
                    recipient,
                    content.subject,
                    content.html_body,
                    metadata,
                    reason.clone(),
                );
                (record, DeliveryOutcome::Failed { error: reason })
            }
        };

        if let Err(err) = self.log.record(&record).await {
            error!(
                record_id = %record.id,
                recipient = %recipient.email,
                error = %err,
                "Failed to persist delivery record"
            );
        }

        outcome
    }
}
