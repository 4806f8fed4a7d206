//! In-memory persistence for cycle state and audit records.
//!
//! One store backs all three cycle ports so a transition commit can hold a
//! single lock over state, records and log. Used by tests and by
//! database-less runs. Data is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::audit::{ActivityLogEntry, SessionRecord};
use crate::domain::foundation::{ConductId, DomainError, UserId};
use crate::ports::{
    ActivityLogRepository, CycleCommit, CycleStateRepository, SessionRecordRepository,
    StoredCycleState,
};

#[derive(Debug, Default)]
struct Tables {
    states: HashMap<UserId, StoredCycleState>,
    records: Vec<SessionRecord>,
    activity: HashMap<ConductId, Vec<ActivityLogEntry>>,
}

impl Tables {
    fn check_sequence(&self, entry: &ActivityLogEntry) -> Result<(), DomainError> {
        let taken = self
            .activity
            .get(&entry.conduct_id)
            .is_some_and(|log| log.iter().any(|e| e.sequence == entry.sequence));
        if taken {
            return Err(DomainError::database(format!(
                "Duplicate activity sequence {} for conduct {}",
                entry.sequence, entry.conduct_id
            )));
        }
        Ok(())
    }

    fn push_entry(&mut self, entry: &ActivityLogEntry) {
        self.activity
            .entry(entry.conduct_id)
            .or_default()
            .push(entry.clone());
    }
}

/// Cycle state keyed by user, append-only session records and the
/// per-conduct activity log.
#[derive(Debug, Default)]
pub struct InMemoryCycleStore {
    tables: Mutex<Tables>,
}

impl InMemoryCycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored cycle states, idle ones included.
    pub fn len(&self) -> usize {
        self.tables().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every session record in append order.
    pub fn session_records(&self) -> Vec<SessionRecord> {
        self.tables().records.clone()
    }

    /// Entries of a conduct in append order.
    pub fn entries_for(&self, conduct_id: &ConductId) -> Vec<ActivityLogEntry> {
        self.tables()
            .activity
            .get(conduct_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CycleStateRepository for InMemoryCycleStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<StoredCycleState>, DomainError> {
        Ok(self.tables().states.get(user_id).cloned())
    }

    async fn commit_transition(&self, commit: &CycleCommit) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check_sequence(&commit.entry)?;

        tables.records.extend(commit.records.iter().cloned());
        tables.push_entry(&commit.entry);
        tables
            .states
            .insert(commit.state.user_id, commit.state.clone());
        Ok(())
    }

    async fn find_active(&self) -> Result<Vec<StoredCycleState>, DomainError> {
        Ok(self
            .tables()
            .states
            .values()
            .filter(|stored| stored.state.is_active())
            .cloned()
            .collect())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        self.tables().states.remove(user_id);
        Ok(())
    }
}

#[async_trait]
impl SessionRecordRepository for InMemoryCycleStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<SessionRecord>, DomainError> {
        let mut found: Vec<SessionRecord> = self
            .tables()
            .records
            .iter()
            .filter(|r| r.user_id == *user_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.start_time);
        Ok(found)
    }

    async fn find_by_conduct(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Vec<SessionRecord>, DomainError> {
        let mut found: Vec<SessionRecord> = self
            .tables()
            .records
            .iter()
            .filter(|r| r.conduct_id == *conduct_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.start_time);
        Ok(found)
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryCycleStore {
    async fn append(&self, entry: &ActivityLogEntry) -> Result<(), DomainError> {
        let mut tables = self.tables();
        tables.check_sequence(entry)?;
        tables.push_entry(entry);
        Ok(())
    }

    async fn latest_for_conduct(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Option<ActivityLogEntry>, DomainError> {
        Ok(self
            .tables()
            .activity
            .get(conduct_id)
            .and_then(|log| log.iter().max_by_key(|e| e.sequence))
            .cloned())
    }

    async fn history(
        &self,
        conduct_id: &ConductId,
        limit: Option<u32>,
    ) -> Result<Vec<ActivityLogEntry>, DomainError> {
        let mut history = self.entries_for(conduct_id);
        history.sort_by(|a, b| (b.timestamp, b.sequence).cmp(&(a.timestamp, a.sequence)));
        if let Some(limit) = limit {
            history.truncate(limit as usize);
        }
        Ok(history)
    }
}
