use std::env;

use crate::errors::ClientError;

/// Environment variable naming the remote API base address, the one
/// external setting.
pub const API_URL_VAR: &str = "TASKBOARD_API_URL";

/// Default on-disk location of the snapshot database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:taskboard.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the remote task service, e.g. `http://localhost:5000/api`.
    pub api_url: String,
    /// SQLite URL for the local snapshot store.
    pub database_url: String,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }

    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }

    /// Read the API address from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_url = env::var(API_URL_VAR).map_err(|_| ClientError::MissingConfig(API_URL_VAR))?;
        Ok(Self::new(api_url))
    }
}
