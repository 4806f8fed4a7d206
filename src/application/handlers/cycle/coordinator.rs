//! CycleCoordinator - applies cycle events for every participant.
//!
//! Events for one user are serialized through that user's slot lock, which is
//! held from loading the state until the scheduler has been updated. A
//! transition is applied in this order:
//!
//! 1. `CycleMachine::apply` computes the transition (pure)
//! 2. the `AuditLogWriter` reserves the conduct's next activity entry
//! 3. closed intervals, the entry and the new state are committed together
//! 4. the reservation, the cached state and the scheduler are updated
//! 5. a `CycleTransitioned` envelope is published
//!
//! A failure in steps 2-3 returns `PersistenceFailure`, writes nothing and
//! leaves the cached state and the armed deadline untouched. A publish
//! failure is only logged. Locks are taken user slot first, then the
//! conduct's audit cursor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use super::{AuditLogWriter, CycleScheduler};
use crate::domain::audit::{ActivityDraft, ActivityLogEntry, SessionRecord};
use crate::domain::conduct::{Participant, ParticipantRole};
use crate::domain::cycle::{
    CycleError, CycleEvent, CycleMachine, CycleState, CycleTransitioned, StateSnapshot,
    Transition,
};
use crate::domain::foundation::{ConductId, DomainEvent, EventId, UserId};
use crate::ports::{
    ActivityLogRepository, Clock, ConductRegistry, CycleCommit, CycleStateRepository,
    EventPublisher, SessionRecordRepository, StoredCycleState,
};

/// Persistence collaborators of the coordinator.
#[derive(Clone)]
pub struct CycleStores {
    pub states: Arc<dyn CycleStateRepository>,
    pub records: Arc<dyn SessionRecordRepository>,
    pub audit: Arc<AuditLogWriter>,
}

impl CycleStores {
    /// Stores backed by one adapter that implements every cycle port.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: CycleStateRepository + SessionRecordRepository + ActivityLogRepository + 'static,
    {
        Self {
            states: store.clone(),
            records: store.clone(),
            audit: Arc::new(AuditLogWriter::new(store)),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedCycle {
    participant: Participant,
    state: CycleState,
}

type UserSlot = Arc<AsyncMutex<Option<CachedCycle>>>;

pub struct CycleCoordinator {
    machine: CycleMachine,
    stores: CycleStores,
    registry: Arc<dyn ConductRegistry>,
    publisher: Arc<dyn EventPublisher>,
    scheduler: Arc<CycleScheduler>,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<UserId, UserSlot>>,
}

impl CycleCoordinator {
    pub fn new(
        machine: CycleMachine,
        stores: CycleStores,
        registry: Arc<dyn ConductRegistry>,
        publisher: Arc<dyn EventPublisher>,
        scheduler: Arc<CycleScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            machine,
            stores,
            registry,
            publisher,
            scheduler,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn machine(&self) -> &CycleMachine {
        &self.machine
    }

    pub fn scheduler(&self) -> &Arc<CycleScheduler> {
        &self.scheduler
    }

    fn slot(&self, user_id: UserId) -> UserSlot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(user_id).or_default().clone()
    }

    /// Loads the participant and their stored state into an empty slot.
    async fn ensure_loaded<'a>(
        &self,
        slot: &'a mut Option<CachedCycle>,
        user_id: UserId,
    ) -> Result<&'a mut CachedCycle, CycleError> {
        if slot.is_none() {
            let participant = self
                .registry
                .find_participant(&user_id)
                .await?
                .ok_or(CycleError::ParticipantNotFound(user_id))?;
            let state = self
                .stores
                .states
                .load(&user_id)
                .await?
                .map(|stored| stored.state)
                .unwrap_or_default();
            *slot = Some(CachedCycle { participant, state });
        }

        slot.as_mut().ok_or(CycleError::ParticipantNotFound(user_id))
    }

    /// Applies one event and returns the resulting snapshot.
    ///
    /// # Errors
    ///
    /// - `ParticipantNotFound` if the user is not registered in a conduct
    /// - `CutOffActive` for a trainer's `SetZone` while their conduct is in
    ///   cut-off
    /// - `UnknownZone`, `InvalidTransition`, `StaleDeadline` from the machine
    /// - `PersistenceFailure` if any write fails
    pub async fn handle_event(&self, event: CycleEvent) -> Result<StateSnapshot, CycleError> {
        let user_id = event.user_id();
        let slot = self.slot(user_id);
        let mut guard = slot.lock().await;
        let cached = self.ensure_loaded(&mut guard, user_id).await?;
        if matches!(event, CycleEvent::SetZone { .. }) {
            self.check_cut_off(&cached.participant).await?;
        }

        let transition = self.machine.apply(&cached.state, &event)?;
        let conduct_id = cached.participant.conduct_id;

        if let Err(err) = self.persist(&cached.participant, &event, &transition).await {
            error!(
                user_id = %user_id,
                event = event.name(),
                error = %err,
                "Failed to persist cycle transition"
            );
            return Err(err);
        }

        cached.state = transition.next.clone();
        self.scheduler.apply(user_id, transition.deadline);

        let snapshot = StateSnapshot::from_state(user_id, &cached.state);
        info!(
            user_id = %user_id,
            conduct_id = %conduct_id,
            event = event.name(),
            from = %transition.from,
            to = %snapshot.status,
            action = transition.activity.action.as_str(),
            "Cycle transition applied"
        );

        let username = cached.participant.name.clone();
        drop(guard);

        self.publish(user_id, conduct_id, username, &event, &transition, &snapshot)
            .await;
        Ok(snapshot)
    }

    async fn check_cut_off(&self, participant: &Participant) -> Result<(), CycleError> {
        if participant.role != ParticipantRole::Trainer {
            return Ok(());
        }
        let conduct = self.registry.find_by_id(&participant.conduct_id).await?;
        if conduct.is_some_and(|c| c.cut_off().is_active()) {
            return Err(CycleError::CutOffActive(participant.conduct_id));
        }
        Ok(())
    }

    async fn persist(
        &self,
        participant: &Participant,
        event: &CycleEvent,
        transition: &Transition,
    ) -> Result<(), CycleError> {
        let draft = ActivityDraft::from_note(
            participant.conduct_id,
            participant.user_id,
            participant.name.clone(),
            transition.activity.clone(),
            event.at(),
        );
        let reserved = self.stores.audit.reserve(draft).await?;

        let commit = CycleCommit {
            state: StoredCycleState {
                user_id: participant.user_id,
                conduct_id: participant.conduct_id,
                state: transition.next.clone(),
            },
            records: transition
                .closed_intervals
                .iter()
                .map(|interval| {
                    SessionRecord::from_interval(
                        participant.user_id,
                        participant.conduct_id,
                        interval.clone(),
                    )
                })
                .collect(),
            entry: reserved.entry().clone(),
        };
        self.stores.states.commit_transition(&commit).await?;

        reserved.commit();
        Ok(())
    }

    async fn publish(
        &self,
        user_id: UserId,
        conduct_id: ConductId,
        username: String,
        event: &CycleEvent,
        transition: &Transition,
        snapshot: &StateSnapshot,
    ) {
        let transitioned = CycleTransitioned {
            event_id: EventId::new(),
            user_id,
            conduct_id,
            username,
            from: transition.from,
            to: snapshot.status,
            action: transition.activity.action,
            snapshot: snapshot.clone(),
            occurred_at: event.at(),
        };
        let envelope = transitioned
            .to_envelope()
            .with_conduct_id(conduct_id.to_string());

        if let Err(err) = self.publisher.publish(envelope).await {
            warn!(
                user_id = %user_id,
                error = %err,
                "Failed to publish cycle transition"
            );
        }
    }

    /// Current snapshot of a participant's cycle.
    pub async fn get_snapshot(&self, user_id: &UserId) -> Result<StateSnapshot, CycleError> {
        let slot = self.slot(*user_id);
        let mut guard = slot.lock().await;
        let cached = self.ensure_loaded(&mut guard, *user_id).await?;
        Ok(StateSnapshot::from_state(*user_id, &cached.state))
    }

    /// Fires every deadline due by now. Returns how many transitions applied.
    ///
    /// Stale deadlines are dropped silently. Other failures are logged and
    /// the taken deadline is not re-armed: the deadline is already past, so
    /// re-arming it would fire it again on every poll while the store is
    /// failing. Nothing was written, so the stored state still holds the
    /// deadline and `rehydrate` arms it again once storage recovers.
    pub async fn fire_due_deadlines(&self) -> usize {
        let now = self.clock.now();
        let mut applied = 0;

        for due in self.scheduler.take_due(now) {
            let event = CycleEvent::deadline_reached(due.user_id, due.kind, due.due, now);
            match self.handle_event(event).await {
                Ok(_) => applied += 1,
                Err(err) if err.is_stale() => {
                    debug!(user_id = %due.user_id, kind = %due.kind, "Ignoring stale deadline");
                }
                Err(err) => {
                    error!(
                        user_id = %due.user_id,
                        kind = %due.kind,
                        error = %err,
                        "Deadline transition failed"
                    );
                }
            }
        }

        applied
    }

    /// Re-arms the deadlines of every persisted active cycle.
    ///
    /// Deadlines already in the past fire on the driver's next poll.
    pub async fn rehydrate(&self) -> Result<usize, CycleError> {
        let active = self.stores.states.find_active().await?;
        let mut armed = 0;

        for stored in active {
            if let Some((kind, due)) = stored.state.deadline() {
                self.scheduler.arm(stored.user_id, kind, due);
                armed += 1;
            }
        }

        info!(armed, "Rehydrated cycle deadlines");
        Ok(armed)
    }

    /// Drops a participant's cached and stored cycle state.
    ///
    /// Callers reset the cycle first; any armed deadline is cancelled.
    pub async fn discard(&self, user_id: &UserId) -> Result<(), CycleError> {
        let slot = self.slot(*user_id);
        let mut guard = slot.lock().await;

        self.stores.states.delete(user_id).await?;
        self.scheduler.cancel(user_id);
        *guard = None;
        drop(guard);

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(user_id);
        Ok(())
    }

    /// Closed intervals of a user, oldest first.
    pub async fn session_history(&self, user_id: &UserId) -> Result<Vec<SessionRecord>, CycleError> {
        Ok(self.stores.records.find_by_user(user_id).await?)
    }

    /// Activity of a conduct, newest first.
    pub async fn activity_history(
        &self,
        conduct_id: &ConductId,
        limit: Option<u32>,
    ) -> Result<Vec<ActivityLogEntry>, CycleError> {
        Ok(self.stores.audit.history(conduct_id, limit).await?)
    }
}
