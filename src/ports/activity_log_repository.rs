//! Activity log repository port.
//!
//! Storage for `ActivityLogEntry` rows. Ordering and sequencing are decided
//! by the audit writer; the store only keeps what it is given.

use async_trait::async_trait;

use crate::domain::audit::ActivityLogEntry;
use crate::domain::foundation::{ConductId, DomainError};

#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure, including a duplicate
    ///   `(conduct_id, sequence)`
    async fn append(&self, entry: &ActivityLogEntry) -> Result<(), DomainError>;

    /// The entry with the highest sequence in a conduct.
    async fn latest_for_conduct(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Option<ActivityLogEntry>, DomainError>;

    /// Entries of a conduct ordered by `(timestamp, sequence)`, newest first.
    async fn history(
        &self,
        conduct_id: &ConductId,
        limit: Option<u32>,
    ) -> Result<Vec<ActivityLogEntry>, DomainError>;
}
