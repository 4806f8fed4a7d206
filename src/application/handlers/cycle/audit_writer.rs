//! AuditLogWriter - serialized, append-only activity log per conduct.
//!
//! Appends for one conduct go through a single async lock. Each entry gets
//! the next sequence number of its conduct, and a timestamp earlier than the
//! conduct's last entry is moved forward to it, so the log read in
//! `(timestamp, sequence)` order is the order events were accepted.
//!
//! Callers that store the entry themselves take a `ReservedEntry`, which
//! holds the conduct's lock until they `commit` it. A reservation dropped
//! without commit forgets the cursor, so the next append reloads it from the
//! store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::warn;

use crate::domain::audit::{ActivityDraft, ActivityLogEntry};
use crate::domain::foundation::{ConductId, DomainError, Timestamp};
use crate::ports::ActivityLogRepository;

#[derive(Debug, Clone, Copy)]
struct Cursor {
    last_timestamp: Option<Timestamp>,
    next_sequence: u64,
}

type CursorSlot = Arc<AsyncMutex<Option<Cursor>>>;

pub struct AuditLogWriter {
    repository: Arc<dyn ActivityLogRepository>,
    cursors: Mutex<HashMap<ConductId, CursorSlot>>,
}

impl AuditLogWriter {
    pub fn new(repository: Arc<dyn ActivityLogRepository>) -> Self {
        Self {
            repository,
            cursors: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, conduct_id: ConductId) -> CursorSlot {
        let mut cursors = self.cursors.lock().unwrap_or_else(PoisonError::into_inner);
        cursors.entry(conduct_id).or_default().clone()
    }

    /// Prepares the conduct's next entry and holds its lock until the
    /// returned reservation is committed or dropped.
    ///
    /// # Errors
    ///
    /// Returns the repository's `DomainError` if the cursor cannot be loaded.
    pub async fn reserve(&self, draft: ActivityDraft) -> Result<ReservedEntry, DomainError> {
        let conduct_id = draft.conduct_id;
        let mut guard = self.slot(conduct_id).lock_owned().await;

        let cursor = match *guard {
            Some(cursor) => cursor,
            None => {
                let latest = self.repository.latest_for_conduct(&conduct_id).await?;
                let cursor = Cursor {
                    last_timestamp: latest.as_ref().map(|e| e.timestamp),
                    next_sequence: latest.map(|e| e.sequence + 1).unwrap_or(1),
                };
                *guard = Some(cursor);
                cursor
            }
        };

        let timestamp = match cursor.last_timestamp {
            Some(last) if draft.timestamp.is_before(&last) => {
                warn!(
                    conduct_id = %conduct_id,
                    action = draft.action.as_str(),
                    requested = %draft.timestamp,
                    clamped_to = %last,
                    "Activity timestamp precedes conduct log; clamping forward"
                );
                last
            }
            _ => draft.timestamp,
        };

        Ok(ReservedEntry {
            entry: ActivityLogEntry::from_draft(draft, timestamp, cursor.next_sequence),
            guard,
            committed: false,
        })
    }

    /// Appends one entry and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns the repository's `DomainError`; the sequence number is not
    /// consumed.
    pub async fn append(&self, draft: ActivityDraft) -> Result<ActivityLogEntry, DomainError> {
        let reserved = self.reserve(draft).await?;
        self.repository.append(reserved.entry()).await?;
        Ok(reserved.commit())
    }

    /// Entries of a conduct, newest first.
    pub async fn history(
        &self,
        conduct_id: &ConductId,
        limit: Option<u32>,
    ) -> Result<Vec<ActivityLogEntry>, DomainError> {
        self.repository.history(conduct_id, limit).await
    }
}

/// The next entry of a conduct, with the conduct's append lock held.
pub struct ReservedEntry {
    entry: ActivityLogEntry,
    guard: OwnedMutexGuard<Option<Cursor>>,
    committed: bool,
}

impl ReservedEntry {
    pub fn entry(&self) -> &ActivityLogEntry {
        &self.entry
    }

    /// Marks the entry as stored and advances the conduct's cursor.
    pub fn commit(mut self) -> ActivityLogEntry {
        *self.guard = Some(Cursor {
            last_timestamp: Some(self.entry.timestamp),
            next_sequence: self.entry.sequence + 1,
        });
        self.committed = true;
        self.entry.clone()
    }
}

impl Drop for ReservedEntry {
    fn drop(&mut self) {
        if !self.committed {
            *self.guard = None;
        }
    }
}
