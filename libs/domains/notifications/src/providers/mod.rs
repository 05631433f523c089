//! Email provider implementations.
//!
//! This module contains the `EmailProvider` trait and the transports the
//! notifier can send through.

mod http;
mod mock;
mod smtp;

pub use http::{HttpEmailProvider, HttpTransportConfig};
pub use mock::MockEmailProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::NotificationResult;
use async_trait::async_trait;

/// Represents a sent email with provider-specific message ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentEmail {
    /// Provider-specific message ID for tracking.
    pub message_id: Option<String>,
}

/// Email content ready for sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailContent {
    /// Recipient email address.
    pub to_email: String,
    /// Recipient name, empty when unknown.
    pub to_name: String,
    /// Email subject.
    pub subject: String,
    /// Rendered HTML body.
    pub html_body: String,
}

/// Trait for email sending providers.
///
/// A returned error means the message was not accepted; the dispatcher turns
/// it into a failed delivery record.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email.
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;

    /// Check if the provider is healthy/configured.
    async fn health_check(&self) -> NotificationResult<bool>;
}
