//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::pool::DbConfig;

/// Default administrator account provisioned by `create-admin`.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@protechsolutions.cm";

/// Storefront backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,

    /// Administrator account email
    pub admin_email: String,

    /// Administrator password (only needed by `create-admin`)
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = StoreConfig {
            database_path: lookup("PROTECH_DB_PATH")
                .unwrap_or_else(|| "./protech.db".to_string())
                .into(),

            max_connections: lookup("PROTECH_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PROTECH_DB_MAX_CONNECTIONS".to_string()))?,

            busy_timeout_ms: lookup("PROTECH_DB_BUSY_TIMEOUT_MS")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PROTECH_DB_BUSY_TIMEOUT_MS".to_string()))?,

            admin_email: lookup("PROTECH_ADMIN_EMAIL")
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),

            admin_password: lookup("PROTECH_ADMIN_PASSWORD").filter(|p| !p.is_empty()),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PROTECH_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// The administrator password, or an error naming the missing variable.
    pub fn require_admin_password(&self) -> Result<&str, ConfigError> {
        self.admin_password
            .as_deref()
            .ok_or_else(|| ConfigError::MissingRequired("PROTECH_ADMIN_PASSWORD".to_string()))
    }

    /// Pool configuration for this store.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
