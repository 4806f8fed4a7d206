//! Cycle error taxonomy.

use thiserror::Error;

use super::{CycleStatus, DeadlineKind};
use crate::domain::foundation::{ConductId, DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::zone::UnknownZone;

/// Errors from applying a cycle event.
///
/// Every variant leaves the user's state exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleError {
    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("Cannot {event} while {status}")]
    InvalidTransition {
        status: CycleStatus,
        event: &'static str,
    },

    /// A timer fired for a deadline that is no longer armed. Callers treat
    /// this as a no-op.
    #[error("Stale {kind} deadline {deadline} for user {user_id}")]
    StaleDeadline {
        user_id: UserId,
        kind: DeadlineKind,
        deadline: Timestamp,
    },

    #[error("User {0} is not a participant of any conduct")]
    ParticipantNotFound(UserId),

    /// Trainers cannot start or change work while their conduct is in cut-off.
    #[error("Conduct {0} is in cut-off")]
    CutOffActive(ConductId),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(DomainError),
}

impl CycleError {
    pub fn invalid_transition(status: CycleStatus, event: &'static str) -> Self {
        CycleError::InvalidTransition { status, event }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CycleError::UnknownZone(_) => ErrorCode::UnknownZone,
            CycleError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            CycleError::StaleDeadline { .. } => ErrorCode::StaleDeadline,
            CycleError::ParticipantNotFound(_) => ErrorCode::ParticipantNotFound,
            CycleError::CutOffActive(_) => ErrorCode::CutOffActive,
            CycleError::PersistenceFailure(err) => err.code,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, CycleError::StaleDeadline { .. })
    }
}

impl From<UnknownZone> for CycleError {
    fn from(err: UnknownZone) -> Self {
        CycleError::UnknownZone(err.0)
    }
}

impl From<DomainError> for CycleError {
    fn from(err: DomainError) -> Self {
        CycleError::PersistenceFailure(err)
    }
}
