//! Read model of a user's cycle for UI rendering.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{CycleState, CycleStatus};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::zone::ZoneId;

/// Flat view of a `CycleState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub user_id: UserId,
    pub status: CycleStatus,
    pub current_zone: Option<ZoneId>,
    pub most_stringent_zone: Option<ZoneId>,
    pub interval_start: Option<Timestamp>,
    pub interval_end: Option<Timestamp>,
    /// Set once the last work interval ended at its deadline.
    pub work_completed: bool,
    /// Set while a completed work interval waits for rest confirmation.
    pub pending_rest: bool,
}

impl StateSnapshot {
    pub fn from_state(user_id: UserId, state: &CycleState) -> Self {
        let (interval_start, interval_end) = match state {
            CycleState::Working(work) => (Some(work.started_at), Some(work.ends_at)),
            CycleState::Resting(rest) => (Some(rest.started_at), Some(rest.ends_at)),
            CycleState::AwaitingRest(pending) => (Some(pending.work_ended_at), None),
            CycleState::Idle => (None, None),
        };

        Self {
            user_id,
            status: state.status(),
            current_zone: state.current_zone().cloned(),
            most_stringent_zone: state.most_stringent_zone().cloned(),
            interval_start,
            interval_end,
            work_completed: matches!(state, CycleState::Resting(_) | CycleState::AwaitingRest(_)),
            pending_rest: matches!(state, CycleState::AwaitingRest(_)),
        }
    }

    /// Snapshot of a user with no cycle in progress.
    pub fn idle(user_id: UserId) -> Self {
        Self::from_state(user_id, &CycleState::Idle)
    }

    /// Time left in the open interval, never negative.
    pub fn remaining(&self, now: Timestamp) -> Option<Duration> {
        self.interval_end
            .map(|end| end.duration_since(&now).max(Duration::zero()))
    }
}
