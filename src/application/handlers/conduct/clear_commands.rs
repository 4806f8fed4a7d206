//! ClearConductCommandsHandler - supervisor reset of every trainer interface.
//!
//! Each trainer's cycle is reset as an interface reset, so running intervals
//! are recorded as interrupted and their deadlines cancelled. Any cut-off is
//! cleared along with them.

use std::sync::Arc;

use tracing::info;

use super::{find_supervisor, reset_failed};
use crate::application::handlers::cycle::{AuditLogWriter, CycleCoordinator};
use crate::domain::audit::{ActivityAction, ActivityDraft, ActivityNote};
use crate::domain::conduct::{ConductError, ParticipantRole};
use crate::domain::cycle::{CycleEvent, ResetReason};
use crate::domain::foundation::UserId;
use crate::ports::{Clock, ConductRegistry};

pub struct ClearConductCommandsHandler {
    registry: Arc<dyn ConductRegistry>,
    coordinator: Arc<CycleCoordinator>,
    audit: Arc<AuditLogWriter>,
    clock: Arc<dyn Clock>,
}

impl ClearConductCommandsHandler {
    pub fn new(
        registry: Arc<dyn ConductRegistry>,
        coordinator: Arc<CycleCoordinator>,
        audit: Arc<AuditLogWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            coordinator,
            audit,
            clock,
        }
    }

    /// Resets every trainer of the supervisor's conduct. Returns how many
    /// trainers were reset.
    ///
    /// # Errors
    ///
    /// - `ParticipantNotFound` if the supervisor is not registered
    /// - `NotConductingBody` if they are a trainer
    /// - `NotFound` if their conduct no longer exists
    pub async fn handle(&self, supervisor_id: UserId) -> Result<usize, ConductError> {
        let supervisor = find_supervisor(self.registry.as_ref(), supervisor_id).await?;
        let mut conduct = self
            .registry
            .find_by_id(&supervisor.conduct_id)
            .await?
            .ok_or(ConductError::NotFound(supervisor.conduct_id))?;

        let now = self.clock.now();
        let trainers: Vec<UserId> = self
            .registry
            .list_participants(&conduct.id())
            .await?
            .into_iter()
            .filter(|p| p.role == ParticipantRole::Trainer)
            .map(|p| p.user_id)
            .collect();

        for user_id in &trainers {
            self.coordinator
                .handle_event(CycleEvent::ManualReset {
                    user_id: *user_id,
                    reason: ResetReason::InterfaceReset,
                    at: now,
                })
                .await
                .map_err(reset_failed)?;
        }

        conduct.clear_cut_off();
        conduct.touch(now);
        self.registry.update_conduct(&conduct).await?;

        self.audit
            .append(ActivityDraft::from_note(
                conduct.id(),
                supervisor.user_id,
                supervisor.name.clone(),
                ActivityNote::new(
                    ActivityAction::ClearCommands,
                    None,
                    "All commands cleared and trainer interfaces reset",
                ),
                now,
            ))
            .await?;

        info!(
            conduct_id = %conduct.id(),
            supervisor_id = %supervisor_id,
            trainers = trainers.len(),
            "Conduct commands cleared"
        );
        Ok(trainers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryConductRegistry, InMemoryCycleStore};
    use crate::adapters::{InMemoryEventBus, ManualClock};
    use crate::application::handlers::cycle::{CycleScheduler, CycleStores};
    use crate::domain::audit::SessionRecordStatus;
    use crate::domain::conduct::{Conduct, CutOff, Participant, Pin};
    use crate::domain::cycle::{CycleMachine, CycleStatus, RestStart};
    use crate::domain::foundation::{CompanyId, Timestamp};
    use crate::domain::zone::{ZoneId, ZonePolicyTable};
    use chrono::Duration;

    struct Fixture {
        handler: ClearConductCommandsHandler,
        coordinator: Arc<CycleCoordinator>,
        registry: Arc<InMemoryConductRegistry>,
        store: Arc<InMemoryCycleStore>,
        scheduler: Arc<CycleScheduler>,
        clock: Arc<ManualClock>,
        conduct: Conduct,
    }

    async fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(1_700_000_000)));
        let registry = Arc::new(InMemoryConductRegistry::new());
        let store = Arc::new(InMemoryCycleStore::new());
        let stores = CycleStores::shared(store.clone());
        let audit = stores.audit.clone();
        let scheduler = Arc::new(CycleScheduler::new());
        let zones = Arc::new(ZonePolicyTable::new(ZonePolicyTable::heat_zone_specs()).unwrap());
        let coordinator = Arc::new(CycleCoordinator::new(
            CycleMachine::new(zones, RestStart::Automatic),
            stores,
            registry.clone(),
            Arc::new(InMemoryEventBus::new()),
            scheduler.clone(),
            clock.clone(),
        ));
        let conduct = Conduct::new(
            CompanyId::new(),
            "Route march",
            Pin::try_new("551903").unwrap(),
            clock.now(),
        )
        .unwrap();
        registry.insert_conduct(&conduct).await.unwrap();

        Fixture {
            handler: ClearConductCommandsHandler::new(
                registry.clone(),
                coordinator.clone(),
                audit,
                clock.clone(),
            ),
            coordinator,
            registry,
            store,
            scheduler,
            clock,
            conduct,
        }
    }

    impl Fixture {
        async fn join(&self, name: &str, role: ParticipantRole) -> Participant {
            let participant = Participant::new(self.conduct.id(), name, role, self.clock.now())
                .unwrap();
            self.registry.add_participant(&participant).await.unwrap();
            participant
        }
    }

    #[tokio::test]
    async fn clears_running_cycles_and_cut_off() {
        let f = fixture().await;
        let supervisor = f.join("Capt Tan", ParticipantRole::ConductingBody).await;
        let working = f.join("Pte Lim", ParticipantRole::Trainer).await;
        let idle = f.join("Pte Ong", ParticipantRole::Trainer).await;
        f.coordinator
            .handle_event(CycleEvent::SetZone {
                user_id: working.user_id,
                zone: ZoneId::new("red").unwrap(),
                at: f.clock.now(),
            })
            .await
            .unwrap();
        let mut conduct = f.registry.find_by_id(&f.conduct.id()).await.unwrap().unwrap();
        conduct.toggle_cut_off(f.clock.now(), Duration::minutes(30));
        f.registry.update_conduct(&conduct).await.unwrap();
        f.clock.advance(Duration::minutes(4));

        let reset = f.handler.handle(supervisor.user_id).await.unwrap();

        assert_eq!(reset, 2);
        for user in [&working, &idle] {
            let snapshot = f.coordinator.get_snapshot(&user.user_id).await.unwrap();
            assert_eq!(snapshot.status, CycleStatus::Idle);
        }
        assert!(f.scheduler.is_empty());
        let records = f.store.session_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, SessionRecordStatus::Interrupted);

        let stored = f.registry.find_by_id(&f.conduct.id()).await.unwrap().unwrap();
        assert_eq!(stored.cut_off(), CutOff::Clear);

        let log = f.store.entries_for(&f.conduct.id());
        let last = log.last().unwrap();
        assert_eq!(last.action, ActivityAction::ClearCommands);
        assert_eq!(last.username, "Capt Tan");
        let interface_resets = log
            .iter()
            .filter(|e| e.action == ActivityAction::InterfaceReset)
            .count();
        assert_eq!(interface_resets, 2);
    }

    #[tokio::test]
    async fn trainer_cannot_clear_commands() {
        let f = fixture().await;
        let trainer = f.join("Pte Lim", ParticipantRole::Trainer).await;

        let result = f.handler.handle(trainer.user_id).await;

        assert_eq!(
            result.unwrap_err(),
            ConductError::NotConductingBody(trainer.user_id)
        );
        assert!(f.store.entries_for(&f.conduct.id()).is_empty());
    }

    #[tokio::test]
    async fn unknown_supervisor_is_rejected() {
        let f = fixture().await;
        let stranger = UserId::new();

        let result = f.handler.handle(stranger).await;

        assert_eq!(result.unwrap_err(), ConductError::ParticipantNotFound(stranger));
    }
}
