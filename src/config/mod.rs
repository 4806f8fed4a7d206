//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `HEATWATCH` prefix and
//! nested values use double underscores as separators. Every section has
//! defaults, so an empty environment yields a runnable in-memory setup.
//!
//! # Example
//!
//! ```no_run
//! use heatwatch::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod conduct;
mod cycle;
mod database;
mod error;
mod scheduler;
mod server;

pub use conduct::ConductConfig;
pub use cycle::CycleConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use scheduler::SchedulerConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection; in-memory adapters when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Rest-start mode and zone table source
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Deadline driver tuning
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// PIN allocation and idle deactivation
    #[serde(default)]
    pub conduct: ConductConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `HEATWATCH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `HEATWATCH__CYCLE__REST_START=confirmation` -> `cycle.rest_start`
    /// - `HEATWATCH__DATABASE__URL=...` -> `database.url`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HEATWATCH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// The zone table is checked separately by `CycleConfig::zone_table`,
    /// since building it reads the zone file.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.scheduler.validate()?;
        self.conduct.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::RestStart;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "HEATWATCH__SERVER__ENVIRONMENT",
        "HEATWATCH__SERVER__JSON_LOGS",
        "HEATWATCH__DATABASE__URL",
        "HEATWATCH__CYCLE__REST_START",
        "HEATWATCH__SCHEDULER__IDLE_WAIT_SECS",
        "HEATWATCH__CONDUCT__PIN_MAX_ATTEMPTS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.cycle.rest_start, RestStart::Automatic);
        assert_eq!(config.scheduler.idle_wait_secs, 60);
        assert_eq!(config.conduct.pin_length, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("HEATWATCH__SERVER__ENVIRONMENT", "production");
        env::set_var("HEATWATCH__SERVER__JSON_LOGS", "true");
        env::set_var("HEATWATCH__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("HEATWATCH__CYCLE__REST_START", "confirmation");
        env::set_var("HEATWATCH__SCHEDULER__IDLE_WAIT_SECS", "5");
        env::set_var("HEATWATCH__CONDUCT__PIN_MAX_ATTEMPTS", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(config.server.json_logs);
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("postgresql://test@localhost/test")
        );
        assert_eq!(config.cycle.rest_start, RestStart::Confirmation);
        assert_eq!(config.scheduler.idle_wait_secs, 5);
        assert_eq!(config.conduct.pin_max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_database_url_fails_validation() {
        let config = AppConfig {
            database: Some(DatabaseConfig {
                url: "mysql://localhost/x".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }
}
