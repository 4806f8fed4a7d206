//! Events accepted by the cycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::audit::ActivityAction;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::zone::ZoneId;

/// Which deadline a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineKind {
    Work,
    Rest,
}

impl fmt::Display for DeadlineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadlineKind::Work => f.write_str("work"),
            DeadlineKind::Rest => f.write_str("rest"),
        }
    }
}

/// Why an operator forced a user back to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    /// The user's cycle was ended early.
    Stopped,
    /// A supervisor cleared all commands.
    InterfaceReset,
    /// The user left or was removed from the conduct.
    RemovedFromConduct,
    /// A supervisor put the conduct into cut-off.
    CutOff,
}

impl ResetReason {
    /// Activity action logged for this reset.
    pub fn action(&self) -> ActivityAction {
        match self {
            ResetReason::Stopped => ActivityAction::EarlyCompletion,
            ResetReason::InterfaceReset => ActivityAction::InterfaceReset,
            ResetReason::RemovedFromConduct => ActivityAction::UserRemoved,
            ResetReason::CutOff => ActivityAction::CutOffStarted,
        }
    }
}

/// Input to `CycleMachine::apply`.
///
/// Every event carries the time it happened; the machine never reads a clock.
/// Deadline events carry the deadline they were armed for so a superseded
/// timer can be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    SetZone {
        user_id: UserId,
        zone: ZoneId,
        at: Timestamp,
    },
    WorkDeadlineReached {
        user_id: UserId,
        deadline: Timestamp,
        at: Timestamp,
    },
    RestDeadlineReached {
        user_id: UserId,
        deadline: Timestamp,
        at: Timestamp,
    },
    /// Confirms rest for a user whose work completed in confirmation mode.
    StartRest { user_id: UserId, at: Timestamp },
    ManualReset {
        user_id: UserId,
        reason: ResetReason,
        at: Timestamp,
    },
    /// Cut-off was lifted; the user rests for the most stringent zone's
    /// rest duration whatever they were doing.
    MandatoryRest { user_id: UserId, at: Timestamp },
}

impl CycleEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            CycleEvent::SetZone { user_id, .. }
            | CycleEvent::WorkDeadlineReached { user_id, .. }
            | CycleEvent::RestDeadlineReached { user_id, .. }
            | CycleEvent::StartRest { user_id, .. }
            | CycleEvent::ManualReset { user_id, .. }
            | CycleEvent::MandatoryRest { user_id, .. } => *user_id,
        }
    }

    pub fn at(&self) -> Timestamp {
        match self {
            CycleEvent::SetZone { at, .. }
            | CycleEvent::WorkDeadlineReached { at, .. }
            | CycleEvent::RestDeadlineReached { at, .. }
            | CycleEvent::StartRest { at, .. }
            | CycleEvent::ManualReset { at, .. }
            | CycleEvent::MandatoryRest { at, .. } => *at,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CycleEvent::SetZone { .. } => "set_zone",
            CycleEvent::WorkDeadlineReached { .. } => "work_deadline_reached",
            CycleEvent::RestDeadlineReached { .. } => "rest_deadline_reached",
            CycleEvent::StartRest { .. } => "start_rest",
            CycleEvent::ManualReset { .. } => "manual_reset",
            CycleEvent::MandatoryRest { .. } => "mandatory_rest",
        }
    }

    /// Builds the deadline event matching an armed timer.
    pub fn deadline_reached(
        user_id: UserId,
        kind: DeadlineKind,
        deadline: Timestamp,
        at: Timestamp,
    ) -> Self {
        match kind {
            DeadlineKind::Work => CycleEvent::WorkDeadlineReached {
                user_id,
                deadline,
                at,
            },
            DeadlineKind::Rest => CycleEvent::RestDeadlineReached {
                user_id,
                deadline,
                at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_reasons_map_to_distinct_actions() {
        assert_eq!(ResetReason::Stopped.action(), ActivityAction::EarlyCompletion);
        assert_eq!(ResetReason::InterfaceReset.action(), ActivityAction::InterfaceReset);
        assert_eq!(ResetReason::RemovedFromConduct.action(), ActivityAction::UserRemoved);
        assert_eq!(ResetReason::CutOff.action(), ActivityAction::CutOffStarted);
    }

    #[test]
    fn deadline_reached_picks_variant_by_kind() {
        let user = UserId::new();
        let t = Timestamp::from_unix_secs(60);
        let event = CycleEvent::deadline_reached(user, DeadlineKind::Rest, t, t);
        assert!(matches!(event, CycleEvent::RestDeadlineReached { .. }));
        assert_eq!(event.user_id(), user);
        assert_eq!(event.at(), t);
    }
}
