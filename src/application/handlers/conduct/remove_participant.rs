//! RemoveParticipantHandler - takes a user out of their conduct.
//!
//! The user's cycle is reset first, so any open interval is recorded as
//! interrupted and its deadline cancelled, before the registry forgets them.

use std::sync::Arc;

use tracing::info;

use super::reset_failed;
use crate::application::handlers::cycle::CycleCoordinator;
use crate::domain::conduct::{ConductError, Participant};
use crate::domain::cycle::{CycleEvent, ResetReason};
use crate::domain::foundation::UserId;
use crate::ports::{Clock, ConductRegistry};

pub struct RemoveParticipantHandler {
    registry: Arc<dyn ConductRegistry>,
    coordinator: Arc<CycleCoordinator>,
    clock: Arc<dyn Clock>,
}

impl RemoveParticipantHandler {
    pub fn new(
        registry: Arc<dyn ConductRegistry>,
        coordinator: Arc<CycleCoordinator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            coordinator,
            clock,
        }
    }

    /// Removes the participant and returns them as they were registered.
    pub async fn handle(&self, user_id: UserId) -> Result<Participant, ConductError> {
        let participant = self
            .registry
            .find_participant(&user_id)
            .await?
            .ok_or(ConductError::ParticipantNotFound(user_id))?;

        let now = self.clock.now();
        self.coordinator
            .handle_event(CycleEvent::ManualReset {
                user_id,
                reason: ResetReason::RemovedFromConduct,
                at: now,
            })
            .await
            .map_err(reset_failed)?;

        self.registry.remove_participant(&user_id).await?;
        self.coordinator
            .discard(&user_id)
            .await
            .map_err(reset_failed)?;

        if let Some(mut conduct) = self.registry.find_by_id(&participant.conduct_id).await? {
            conduct.touch(now);
            self.registry.update_conduct(&conduct).await?;
        }

        info!(
            user_id = %user_id,
            conduct_id = %participant.conduct_id,
            "Participant removed from conduct"
        );
        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryConductRegistry, InMemoryCycleStore};
    use crate::adapters::{InMemoryEventBus, ManualClock};
    use crate::application::handlers::cycle::{CycleScheduler, CycleStores};
    use crate::domain::audit::{ActivityAction, SessionRecordStatus};
    use crate::domain::conduct::{Conduct, ParticipantRole, Pin};
    use crate::domain::cycle::{CycleMachine, RestStart};
    use crate::domain::foundation::{CompanyId, Timestamp};
    use crate::domain::zone::{ZoneId, ZonePolicyTable};

    #[tokio::test]
    async fn removal_interrupts_running_cycle() {
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(1_700_000_000)));
        let registry = Arc::new(InMemoryConductRegistry::new());
        let store = Arc::new(InMemoryCycleStore::new());
        let scheduler = Arc::new(CycleScheduler::new());
        let zones = Arc::new(ZonePolicyTable::new(ZonePolicyTable::heat_zone_specs()).unwrap());
        let coordinator = Arc::new(CycleCoordinator::new(
            CycleMachine::new(zones, RestStart::Automatic),
            CycleStores::shared(store.clone()),
            registry.clone(),
            Arc::new(InMemoryEventBus::new()),
            scheduler.clone(),
            clock.clone(),
        ));

        let conduct = Conduct::new(
            CompanyId::new(),
            "Route march",
            Pin::try_new("246810").unwrap(),
            clock.now(),
        )
        .unwrap();
        registry.insert_conduct(&conduct).await.unwrap();
        let user = Participant::new(conduct.id(), "Pte Lim", ParticipantRole::Trainer, clock.now())
            .unwrap();
        registry.add_participant(&user).await.unwrap();
        coordinator
            .handle_event(CycleEvent::SetZone {
                user_id: user.user_id,
                zone: ZoneId::new("red").unwrap(),
                at: clock.now(),
            })
            .await
            .unwrap();

        let handler = RemoveParticipantHandler::new(registry.clone(), coordinator.clone(), clock);
        let removed = handler.handle(user.user_id).await.unwrap();

        assert_eq!(removed.user_id, user.user_id);
        assert!(registry.find_participant(&user.user_id).await.unwrap().is_none());
        assert!(scheduler.is_empty());
        let all = store.session_records();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, SessionRecordStatus::Interrupted);
        let latest = &store.entries_for(&conduct.id())[1];
        assert_eq!(latest.action, ActivityAction::UserRemoved);

        let again = handler.handle(user.user_id).await;
        assert_eq!(again.unwrap_err(), ConductError::ParticipantNotFound(user.user_id));
    }
}
