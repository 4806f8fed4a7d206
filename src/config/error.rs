//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::zone::ZoneConfigError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Cannot read zone file {path}: {source}")]
    ZoneFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse zone file {path}: {source}")]
    ZoneFileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid zone table: {0}")]
    ZoneTable(#[from] ZoneConfigError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid log filter '{0}'")]
    InvalidLogFilter(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Scheduler idle wait must be between 1 and 3600 seconds")]
    InvalidIdleWait,

    #[error("PIN length must be between {min} and {max}, got {actual}")]
    InvalidPinLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("PIN allocation needs at least one attempt")]
    InvalidPinAttempts,

    #[error("Conduct inactivity window must be at least one hour")]
    InvalidInactivityWindow,

    #[error("Conduct sweep interval must be at least one second")]
    InvalidSweepInterval,
}
