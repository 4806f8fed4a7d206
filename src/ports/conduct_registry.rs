//! Conduct registry port - identity and conduct collaborator.
//!
//! Resolves PINs to conducts, owns participant membership and reports which
//! conducts have gone quiet.

use async_trait::async_trait;

use crate::domain::conduct::{Conduct, Participant, Pin};
use crate::domain::foundation::{ConductId, DomainError, Timestamp, UserId};

/// Result of inserting a conduct under a freshly drawn PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinInsertOutcome {
    Inserted,
    /// Another conduct already holds the PIN; nothing was written.
    PinTaken,
}

#[async_trait]
pub trait ConductRegistry: Send + Sync {
    /// Inserts a new conduct, relying on the store's PIN uniqueness.
    async fn insert_conduct(&self, conduct: &Conduct) -> Result<PinInsertOutcome, DomainError>;

    async fn find_by_id(&self, id: &ConductId) -> Result<Option<Conduct>, DomainError>;

    async fn find_by_pin(&self, pin: &Pin) -> Result<Option<Conduct>, DomainError>;

    /// Persists status and activity changes of an existing conduct.
    ///
    /// # Errors
    ///
    /// - `ConductNotFound` if the conduct doesn't exist
    async fn update_conduct(&self, conduct: &Conduct) -> Result<(), DomainError>;

    async fn add_participant(&self, participant: &Participant) -> Result<(), DomainError>;

    async fn find_participant(&self, user_id: &UserId) -> Result<Option<Participant>, DomainError>;

    /// Looks up a participant by exact name within a conduct.
    async fn find_participant_by_name(
        &self,
        conduct_id: &ConductId,
        name: &str,
    ) -> Result<Option<Participant>, DomainError>;

    async fn list_participants(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Vec<Participant>, DomainError>;

    /// Removes a participant; returns false if they were not registered.
    async fn remove_participant(&self, user_id: &UserId) -> Result<bool, DomainError>;

    async fn count_participants(&self, conduct_id: &ConductId) -> Result<u64, DomainError>;

    /// Active conducts whose last activity is before `cutoff`.
    async fn find_active_idle_since(&self, cutoff: Timestamp) -> Result<Vec<Conduct>, DomainError>;
}
