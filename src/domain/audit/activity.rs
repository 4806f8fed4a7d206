//! Activity log - the append-only audit trail of a conduct.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ConductId, Timestamp, UserId};
use crate::domain::zone::ZoneId;

/// Username recorded for entries produced by the system itself.
pub const SYSTEM_USERNAME: &str = "SYSTEM";

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    UserJoined,
    StartWork,
    ZoneChanged,
    CompletedWork,
    StartRest,
    CompletedRest,
    EarlyCompletion,
    InterfaceReset,
    UserRemoved,
    ConductDeactivated,
    ClearCommands,
    CutOffStarted,
    CutOffLifted,
    MandatoryRest,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::UserJoined => "user_joined",
            ActivityAction::StartWork => "start_work",
            ActivityAction::ZoneChanged => "zone_changed",
            ActivityAction::CompletedWork => "completed_work",
            ActivityAction::StartRest => "start_rest",
            ActivityAction::CompletedRest => "completed_rest",
            ActivityAction::EarlyCompletion => "early_completion",
            ActivityAction::InterfaceReset => "interface_reset",
            ActivityAction::UserRemoved => "user_removed",
            ActivityAction::ConductDeactivated => "conduct_deactivated",
            ActivityAction::ClearCommands => "clear_commands",
            ActivityAction::CutOffStarted => "cut_off_started",
            ActivityAction::CutOffLifted => "cut_off_lifted",
            ActivityAction::MandatoryRest => "mandatory_rest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let action = match s {
            "user_joined" => ActivityAction::UserJoined,
            "start_work" => ActivityAction::StartWork,
            "zone_changed" => ActivityAction::ZoneChanged,
            "completed_work" => ActivityAction::CompletedWork,
            "start_rest" => ActivityAction::StartRest,
            "completed_rest" => ActivityAction::CompletedRest,
            "early_completion" => ActivityAction::EarlyCompletion,
            "interface_reset" => ActivityAction::InterfaceReset,
            "user_removed" => ActivityAction::UserRemoved,
            "conduct_deactivated" => ActivityAction::ConductDeactivated,
            "clear_commands" => ActivityAction::ClearCommands,
            "cut_off_started" => ActivityAction::CutOffStarted,
            "cut_off_lifted" => ActivityAction::CutOffLifted,
            "mandatory_rest" => ActivityAction::MandatoryRest,
            _ => return None,
        };
        Some(action)
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action, zone and details of a transition, before it is addressed and stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityNote {
    pub action: ActivityAction,
    pub zone: Option<ZoneId>,
    pub details: String,
}

impl ActivityNote {
    pub fn new(action: ActivityAction, zone: Option<ZoneId>, details: impl Into<String>) -> Self {
        Self {
            action,
            zone,
            details: details.into(),
        }
    }
}

/// An entry ready for the audit writer. The timestamp is always explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub conduct_id: ConductId,
    pub user_id: Option<UserId>,
    pub username: String,
    pub action: ActivityAction,
    pub zone: Option<ZoneId>,
    pub details: Option<String>,
    pub timestamp: Timestamp,
}

impl ActivityDraft {
    /// Addresses a note to a participant at the event's time.
    pub fn from_note(
        conduct_id: ConductId,
        user_id: UserId,
        username: impl Into<String>,
        note: ActivityNote,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            conduct_id,
            user_id: Some(user_id),
            username: username.into(),
            action: note.action,
            zone: note.zone,
            details: Some(note.details),
            timestamp,
        }
    }

    /// An entry written on behalf of the system rather than a participant.
    pub fn system(
        conduct_id: ConductId,
        action: ActivityAction,
        details: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            conduct_id,
            user_id: None,
            username: SYSTEM_USERNAME.to_string(),
            action,
            zone: None,
            details: Some(details.into()),
            timestamp,
        }
    }
}

/// Immutable audit entry. Ordering by `(timestamp, sequence)` is the trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub conduct_id: ConductId,
    pub user_id: Option<UserId>,
    pub username: String,
    pub action: ActivityAction,
    pub zone: Option<ZoneId>,
    pub details: Option<String>,
    pub timestamp: Timestamp,
    /// Per-conduct position, strictly increasing from 1.
    pub sequence: u64,
}

impl ActivityLogEntry {
    pub fn from_draft(draft: ActivityDraft, timestamp: Timestamp, sequence: u64) -> Self {
        Self {
            conduct_id: draft.conduct_id,
            user_id: draft.user_id,
            username: draft.username,
            action: draft.action,
            zone: draft.zone,
            details: draft.details,
            timestamp,
            sequence,
        }
    }
}
