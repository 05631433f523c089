//! Configuration for the daycare notifier

use std::str::FromStr;
use std::sync::Arc;

use core_config::mongodb::MongoConfig;
use core_config::{ConfigError, Environment, FromEnv, env_or_default};
use domain_notifications::providers::{EmailProvider, HttpEmailProvider, SmtpProvider};
use domain_notifications::{NotificationResult, NotificationServiceConfig};
use tracing::info;

/// Which outbound transport to send through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Http,
    Smtp,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(TransportKind::Http),
            "smtp" => Ok(TransportKind::Smtp),
            other => Err(format!("unknown transport '{}', expected 'http' or 'smtp'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub mongo: MongoConfig,
    pub notifications: NotificationServiceConfig,
    pub transport: TransportKind,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let transport = env_or_default("EMAIL_TRANSPORT", "http")
            .parse()
            .map_err(|details| ConfigError::ParseError {
                key: "EMAIL_TRANSPORT".to_string(),
                details,
            })?;

        Ok(Self {
            environment: Environment::from_env(),
            mongo: MongoConfig::from_env()?,
            notifications: NotificationServiceConfig::from_env()?,
            transport,
        })
    }
}

impl Config {
    /// Build the configured transport. Its own settings are read from the
    /// environment (`EMAIL_API_*` or `SMTP_*`).
    pub fn build_provider(&self) -> NotificationResult<Arc<dyn EmailProvider>> {
        let provider: Arc<dyn EmailProvider> = match self.transport {
            TransportKind::Http => Arc::new(HttpEmailProvider::from_env()?),
            TransportKind::Smtp => Arc::new(SmtpProvider::from_env()?),
        };
        info!(provider = provider.name(), "Email transport configured");
        Ok(provider)
    }
}
