//! Per-user cycle state as a tagged variant.
//!
//! Each variant carries only the fields meaningful in it, so a working user
//! always has a most stringent zone and an idle user never has a deadline.

use serde::{Deserialize, Serialize};

use super::{CycleStatus, DeadlineKind};
use crate::domain::foundation::Timestamp;
use crate::domain::zone::ZoneId;

/// An open work interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// Zone most recently set by the supervisor.
    pub current_zone: ZoneId,
    /// Highest-ranked zone set since `started_at`.
    pub most_stringent_zone: ZoneId,
    pub started_at: Timestamp,
    /// `started_at` plus the work duration of `most_stringent_zone`.
    pub ends_at: Timestamp,
}

/// A completed work interval waiting for the user to confirm rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRest {
    /// Governing zone of the finished work interval.
    pub zone: ZoneId,
    /// Zone that was current when work ended.
    pub last_zone: ZoneId,
    pub work_ended_at: Timestamp,
}

/// An open rest interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestInterval {
    /// Governing zone of the work interval that triggered this rest.
    pub zone: ZoneId,
    /// Zone that was current when work ended.
    pub last_zone: ZoneId,
    pub started_at: Timestamp,
    pub ends_at: Timestamp,
}

/// Cycle state of one user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    Working(WorkInterval),
    AwaitingRest(PendingRest),
    Resting(RestInterval),
}

impl CycleState {
    /// Status as seen by the surrounding system.
    pub fn status(&self) -> CycleStatus {
        match self {
            CycleState::Idle | CycleState::AwaitingRest(_) => CycleStatus::Idle,
            CycleState::Working(_) => CycleStatus::Working,
            CycleState::Resting(_) => CycleStatus::Resting,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, CycleState::Idle)
    }

    /// True when nothing needs to be remembered across restarts.
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    /// The deadline this state expects, if any.
    pub fn deadline(&self) -> Option<(DeadlineKind, Timestamp)> {
        match self {
            CycleState::Working(work) => Some((DeadlineKind::Work, work.ends_at)),
            CycleState::Resting(rest) => Some((DeadlineKind::Rest, rest.ends_at)),
            CycleState::Idle | CycleState::AwaitingRest(_) => None,
        }
    }

    pub fn current_zone(&self) -> Option<&ZoneId> {
        match self {
            CycleState::Working(work) => Some(&work.current_zone),
            CycleState::AwaitingRest(pending) => Some(&pending.last_zone),
            CycleState::Resting(rest) => Some(&rest.last_zone),
            CycleState::Idle => None,
        }
    }

    pub fn most_stringent_zone(&self) -> Option<&ZoneId> {
        match self {
            CycleState::Working(work) => Some(&work.most_stringent_zone),
            CycleState::AwaitingRest(pending) => Some(&pending.zone),
            CycleState::Resting(rest) => Some(&rest.zone),
            CycleState::Idle => None,
        }
    }
}
