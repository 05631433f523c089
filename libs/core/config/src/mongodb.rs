use crate::{env_or_default, env_required, ConfigError, FromEnv};

/// MongoDB configuration for the document store holding users, children,
/// notification settings and the delivery log.
#[derive(Clone, Debug)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl MongoConfig {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
        }
    }
}

impl FromEnv for MongoConfig {
    /// Requires MONGO_URI to be set (no default); MONGO_DATABASE defaults to "daycare"
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            uri: env_required("MONGO_URI")?,
            database: env_or_default("MONGO_DATABASE", "daycare"),
        })
    }
}
