//! In-memory conduct registry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::conduct::{Conduct, Participant, Pin};
use crate::domain::foundation::{ConductId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{ConductRegistry, PinInsertOutcome};

#[derive(Debug, Default)]
struct RegistryData {
    conducts: HashMap<ConductId, Conduct>,
    participants: HashMap<UserId, Participant>,
}

/// Conducts and participants held in process memory.
///
/// PIN uniqueness is checked under the same write lock as the insert, like
/// a unique index would.
#[derive(Debug, Default)]
pub struct InMemoryConductRegistry {
    data: RwLock<RegistryData>,
}

impl InMemoryConductRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConductRegistry for InMemoryConductRegistry {
    async fn insert_conduct(&self, conduct: &Conduct) -> Result<PinInsertOutcome, DomainError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if data.conducts.values().any(|c| c.pin() == conduct.pin()) {
            return Ok(PinInsertOutcome::PinTaken);
        }
        data.conducts.insert(conduct.id(), conduct.clone());
        Ok(PinInsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: &ConductId) -> Result<Option<Conduct>, DomainError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.conducts.get(id).cloned())
    }

    async fn find_by_pin(&self, pin: &Pin) -> Result<Option<Conduct>, DomainError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.conducts.values().find(|c| c.pin() == pin).cloned())
    }

    async fn update_conduct(&self, conduct: &Conduct) -> Result<(), DomainError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        match data.conducts.get_mut(&conduct.id()) {
            Some(existing) => {
                *existing = conduct.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ConductNotFound,
                format!("Conduct not found: {}", conduct.id()),
            )),
        }
    }

    async fn add_participant(&self, participant: &Participant) -> Result<(), DomainError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if !data.conducts.contains_key(&participant.conduct_id) {
            return Err(DomainError::new(
                ErrorCode::ConductNotFound,
                format!("Conduct not found: {}", participant.conduct_id),
            ));
        }
        data.participants
            .insert(participant.user_id, participant.clone());
        Ok(())
    }

    async fn find_participant(&self, user_id: &UserId) -> Result<Option<Participant>, DomainError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.participants.get(user_id).cloned())
    }

    async fn find_participant_by_name(
        &self,
        conduct_id: &ConductId,
        name: &str,
    ) -> Result<Option<Participant>, DomainError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data
            .participants
            .values()
            .find(|p| p.conduct_id == *conduct_id && p.name == name)
            .cloned())
    }

    async fn list_participants(
        &self,
        conduct_id: &ConductId,
    ) -> Result<Vec<Participant>, DomainError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let mut participants: Vec<Participant> = data
            .participants
            .values()
            .filter(|p| p.conduct_id == *conduct_id)
            .cloned()
            .collect();
        participants.sort_by_key(|p| p.joined_at);
        Ok(participants)
    }

    async fn remove_participant(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        Ok(data.participants.remove(user_id).is_some())
    }

    async fn count_participants(&self, conduct_id: &ConductId) -> Result<u64, DomainError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data
            .participants
            .values()
            .filter(|p| p.conduct_id == *conduct_id)
            .count() as u64)
    }

    async fn find_active_idle_since(&self, cutoff: Timestamp) -> Result<Vec<Conduct>, DomainError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data
            .conducts
            .values()
            .filter(|c| c.is_active() && c.is_idle_since(cutoff))
            .cloned()
            .collect())
    }
}
