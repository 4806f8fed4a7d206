//! Process-level configuration: deployment environment and logging

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

/// Default directive: chatty for this crate, quiet for the driver.
pub const DEFAULT_LOG_FILTER: &str = "info,heatwatch=debug,sqlx=warn";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub environment: Environment,

    /// `EnvFilter` directive, overridden by `RUST_LOG` when set
    pub log_level: String,

    /// Emit JSON lines instead of human-readable text
    pub json_logs: bool,
}

/// Where the process is deployed
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
        }
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    /// The log directive must parse as an `EnvFilter`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let directive = self.log_level.trim();
        if directive.is_empty() {
            return Err(ValidationError::MissingRequired("SERVER__LOG_LEVEL"));
        }
        match EnvFilter::try_new(directive) {
            Ok(_) => Ok(()),
            Err(_) => Err(ValidationError::InvalidLogFilter(self.log_level.clone())),
        }
    }
}
