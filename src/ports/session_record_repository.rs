//! Session record repository port - read side of the interval history.
//!
//! Records are written only through `CycleStateRepository::commit_transition`.

use async_trait::async_trait;

use crate::domain::audit::SessionRecord;
use crate::domain::foundation::{ConductId, DomainError, UserId};

#[async_trait]
pub trait SessionRecordRepository: Send + Sync {
    /// A user's records ordered by start time, oldest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<SessionRecord>, DomainError>;

    /// All records of a conduct ordered by start time, oldest first.
    async fn find_by_conduct(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Vec<SessionRecord>, DomainError>;
}
