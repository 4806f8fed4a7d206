//! Externally visible cycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a user's work/rest cycle.
///
/// A user waiting to confirm rest reports `Idle` with `pending_rest` set on
/// the snapshot; the finer state lives in `CycleState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    #[default]
    Idle,
    Working,
    Resting,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Idle => "idle",
            CycleStatus::Working => "working",
            CycleStatus::Resting => "resting",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, CycleStatus::Idle)
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
