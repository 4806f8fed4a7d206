//! Scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Longest the driver sleeps when no deadline is armed, in seconds
    #[serde(default = "default_idle_wait")]
    pub idle_wait_secs: u64,
}

impl SchedulerConfig {
    pub fn idle_wait(&self) -> Duration {
        Duration::from_secs(self.idle_wait_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idle_wait_secs == 0 || self.idle_wait_secs > 3600 {
            return Err(ValidationError::InvalidIdleWait);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_wait_secs: default_idle_wait(),
        }
    }
}

fn default_idle_wait() -> u64 {
    60
}
