//! Conduct configuration: PIN allocation and idle deactivation

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::conduct::{MAX_PIN_LENGTH, MIN_PIN_LENGTH};

#[derive(Debug, Clone, Deserialize)]
pub struct ConductConfig {
    /// Digits per PIN
    #[serde(default = "default_pin_length")]
    pub pin_length: usize,

    /// PIN draws before giving up with `PinExhausted`
    #[serde(default = "default_pin_max_attempts")]
    pub pin_max_attempts: u32,

    /// Hours without activity before an empty conduct is deactivated
    #[serde(default = "default_inactivity_hours")]
    pub inactivity_hours: u32,

    /// Seconds between idle-conduct sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl ConductConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&self.pin_length) {
            return Err(ValidationError::InvalidPinLength {
                min: MIN_PIN_LENGTH,
                max: MAX_PIN_LENGTH,
                actual: self.pin_length,
            });
        }
        if self.pin_max_attempts == 0 {
            return Err(ValidationError::InvalidPinAttempts);
        }
        if self.inactivity_hours == 0 {
            return Err(ValidationError::InvalidInactivityWindow);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for ConductConfig {
    fn default() -> Self {
        Self {
            pin_length: default_pin_length(),
            pin_max_attempts: default_pin_max_attempts(),
            inactivity_hours: default_inactivity_hours(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_pin_length() -> usize {
    6
}

fn default_pin_max_attempts() -> u32 {
    20
}

fn default_inactivity_hours() -> u32 {
    24
}

fn default_sweep_interval() -> u64 {
    300
}
