//! Error types for the notifications domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur in the notifications domain.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The email transport failed or rejected the message.
    #[error("Email provider error: {0}")]
    ProviderError(String),

    /// The user/children/settings/log document store failed.
    #[error("Store error: {0}")]
    StoreError(String),

    /// A user referenced by id does not exist.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl NotificationError {
    /// The message persisted on a failed delivery record.
    ///
    /// Transport errors keep the provider's own wording ("quota exceeded"),
    /// everything else uses the full display form.
    pub fn delivery_reason(&self) -> String {
        match self {
            NotificationError::ProviderError(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl From<mongodb::error::Error> for NotificationError {
    fn from(err: mongodb::error::Error) -> Self {
        NotificationError::StoreError(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::ProviderError(err.to_string())
    }
}

impl From<lettre::address::AddressError> for NotificationError {
    fn from(err: lettre::address::AddressError) -> Self {
        NotificationError::InvalidEmail(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotificationError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotificationError::ProviderError(format!("SMTP send failed: {}", err))
    }
}

impl From<core_config::ConfigError> for NotificationError {
    fn from(err: core_config::ConfigError) -> Self {
        NotificationError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_reason_keeps_provider_wording() {
        let err = NotificationError::ProviderError("quota exceeded".to_string());
        assert_eq!(err.delivery_reason(), "quota exceeded");
        assert_eq!(err.to_string(), "Email provider error: quota exceeded");
    }

    #[test]
    fn test_delivery_reason_for_other_errors() {
        let err = NotificationError::InvalidEmail("not-an-address".to_string());
        assert_eq!(err.delivery_reason(), "Invalid email address: not-an-address");
    }
}
