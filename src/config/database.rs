//! Database configuration
//!
//! The section is optional; without it the process runs on in-memory
//! adapters and loses all state on restart.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Largest pool the service will open against one database.
const POOL_CEILING: u32 = 100;

/// PostgreSQL pool settings. Every field except `url` has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    /// Apply the bundled schema migrations on startup
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let scheme_ok = ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme));

        if self.url.is_empty() {
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        } else if !scheme_ok {
            Err(ValidationError::InvalidDatabaseUrl)
        } else if self.min_connections > self.max_connections {
            Err(ValidationError::InvalidPoolSize)
        } else if self.max_connections > POOL_CEILING {
            Err(ValidationError::PoolSizeTooLarge)
        } else {
            Ok(())
        }
    }
}
