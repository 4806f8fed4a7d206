//! Cycle state repository port.
//!
//! Holds the single current `CycleState` per user. A transition's session
//! records and activity entry are written together with the new state in one
//! `commit_transition`, so the store never shows one without the others.

use async_trait::async_trait;

use crate::domain::audit::{ActivityLogEntry, SessionRecord};
use crate::domain::cycle::CycleState;
use crate::domain::foundation::{ConductId, DomainError, UserId};

/// A user's cycle state together with the conduct it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCycleState {
    pub user_id: UserId,
    pub conduct_id: ConductId,
    pub state: CycleState,
}

/// Everything one applied transition writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleCommit {
    pub state: StoredCycleState,
    /// Intervals closed by the transition, in order.
    pub records: Vec<SessionRecord>,
    pub entry: ActivityLogEntry,
}

/// Repository port for per-user cycle state.
#[async_trait]
pub trait CycleStateRepository: Send + Sync {
    /// Loads a user's state. `None` means the user has never been saved,
    /// which callers treat as idle.
    async fn load(&self, user_id: &UserId) -> Result<Option<StoredCycleState>, DomainError>;

    /// Appends the records and the activity entry and replaces the user's
    /// state, all or nothing.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure, including an activity
    ///   sequence already taken for the conduct; nothing is written
    async fn commit_transition(&self, commit: &CycleCommit) -> Result<(), DomainError>;

    /// Every state that is not idle, for re-arming deadlines on startup.
    async fn find_active(&self) -> Result<Vec<StoredCycleState>, DomainError>;

    /// Drops a user's state; no-op if absent.
    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn CycleStateRepository) {}
}
