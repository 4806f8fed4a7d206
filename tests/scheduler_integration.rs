//! Integration tests for deadline scheduling.
//!
//! Covers the driver loop, several users sharing one scheduler, re-arming
//! after a restart, and persistence failures on the deadline path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::watch;

use heatwatch::adapters::memory::{InMemoryConductRegistry, InMemoryCycleStore};
use heatwatch::adapters::{InMemoryEventBus, ManualClock};
use heatwatch::application::{
    AuditLogWriter, CycleCoordinator, CycleScheduler, CycleStores, SchedulerDriver,
};
use heatwatch::domain::conduct::{Conduct, Participant, ParticipantRole, Pin};
use heatwatch::domain::cycle::{CycleEvent, CycleMachine, CycleStatus, DeadlineKind, RestStart};
use heatwatch::domain::foundation::{
    CompanyId, ConductId, DomainError, ErrorCode, Timestamp, UserId,
};
use heatwatch::domain::zone::{ZoneId, ZonePolicyTable};
use heatwatch::ports::{
    Clock, ConductRegistry, CycleCommit, CycleStateRepository, StoredCycleState,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Cycle state store whose commits can be switched to fail.
struct SwitchableStates {
    inner: Arc<InMemoryCycleStore>,
    failing: AtomicBool,
}

impl SwitchableStates {
    fn new(inner: Arc<InMemoryCycleStore>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CycleStateRepository for SwitchableStates {
    async fn load(&self, user_id: &UserId) -> Result<Option<StoredCycleState>, DomainError> {
        self.inner.load(user_id).await
    }

    async fn commit_transition(&self, commit: &CycleCommit) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::DatabaseError, "write timed out"));
        }
        self.inner.commit_transition(commit).await
    }

    async fn find_active(&self) -> Result<Vec<StoredCycleState>, DomainError> {
        self.inner.find_active().await
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        self.inner.delete(user_id).await
    }
}

/// Storage shared across coordinator restarts.
struct Backing {
    clock: Arc<ManualClock>,
    registry: Arc<InMemoryConductRegistry>,
    store: Arc<InMemoryCycleStore>,
    states: Arc<SwitchableStates>,
    conduct_id: ConductId,
}

impl Backing {
    async fn new() -> Self {
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(1_730_000_000)));
        let registry = Arc::new(InMemoryConductRegistry::new());
        let conduct = Conduct::new(
            CompanyId::new(),
            "Endurance run",
            Pin::try_new("570123").unwrap(),
            clock.now(),
        )
        .unwrap();
        registry.insert_conduct(&conduct).await.unwrap();

        let store = Arc::new(InMemoryCycleStore::new());
        Self {
            clock,
            registry,
            states: Arc::new(SwitchableStates::new(store.clone())),
            store,
            conduct_id: conduct.id(),
        }
    }

    async fn participant(&self, name: &str) -> UserId {
        let participant = Participant::new(
            self.conduct_id,
            name,
            ParticipantRole::Trainer,
            self.clock.now(),
        )
        .unwrap();
        self.registry.add_participant(&participant).await.unwrap();
        participant.user_id
    }

    /// A fresh coordinator and scheduler over the shared storage.
    fn boot(&self) -> (Arc<CycleCoordinator>, Arc<CycleScheduler>) {
        let scheduler = Arc::new(CycleScheduler::new());
        let zones = Arc::new(ZonePolicyTable::new(ZonePolicyTable::heat_zone_specs()).unwrap());
        let coordinator = Arc::new(CycleCoordinator::new(
            CycleMachine::new(zones, RestStart::Automatic),
            CycleStores {
                states: self.states.clone(),
                records: self.store.clone(),
                audit: Arc::new(AuditLogWriter::new(self.store.clone())),
            },
            self.registry.clone(),
            Arc::new(InMemoryEventBus::new()),
            scheduler.clone(),
            self.clock.clone(),
        ));
        (coordinator, scheduler)
    }
}

async fn set_zone(coordinator: &CycleCoordinator, user: UserId, name: &str, at: Timestamp) {
    coordinator
        .handle_event(CycleEvent::SetZone {
            user_id: user,
            zone: ZoneId::new(name).unwrap(),
            at,
        })
        .await
        .unwrap();
}

async fn status(coordinator: &CycleCoordinator, user: UserId) -> CycleStatus {
    coordinator.get_snapshot(&user).await.unwrap().status
}

// =============================================================================
// Driver
// =============================================================================

#[tokio::test]
async fn running_driver_fires_deadline_armed_while_waiting() {
    let backing = Backing::new().await;
    let user = backing.participant("Pte Tan").await;
    let (coordinator, _) = backing.boot();
    let driver = SchedulerDriver::new(
        coordinator.clone(),
        backing.clock.clone(),
        StdDuration::from_secs(3600),
    );
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(async move { driver.run(rx).await });

    // Cut-off allows no work, so the deadline is due the moment it is armed.
    set_zone(&coordinator, user, "cut-off", backing.clock.now()).await;

    let mut rested = false;
    for _ in 0..200 {
        if status(&coordinator, user).await == CycleStatus::Resting {
            rested = true;
            break;
        }
        tokio::task::yield_now().await;
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
    assert!(rested, "driver did not fire the due work deadline");

    tx.send(true).unwrap();
    assert!(tokio::time::timeout(StdDuration::from_secs(5), task)
        .await
        .is_ok());
}

#[tokio::test]
async fn users_progress_independently() {
    let backing = Backing::new().await;
    let a = backing.participant("Pte A").await;
    let b = backing.participant("Pte B").await;
    let (coordinator, scheduler) = backing.boot();
    let driver = SchedulerDriver::new(
        coordinator.clone(),
        backing.clock.clone(),
        StdDuration::from_secs(60),
    );

    set_zone(&coordinator, a, "black", backing.clock.now()).await;
    set_zone(&coordinator, b, "white", backing.clock.now()).await;
    assert_eq!(scheduler.len(), 2);

    backing.clock.advance(Duration::minutes(15));
    assert_eq!(driver.poll_once().await, 1);
    assert_eq!(status(&coordinator, a).await, CycleStatus::Resting);
    assert_eq!(status(&coordinator, b).await, CycleStatus::Working);

    backing.clock.advance(Duration::minutes(45));
    assert_eq!(driver.poll_once().await, 2);
    assert_eq!(status(&coordinator, a).await, CycleStatus::Idle);
    assert_eq!(status(&coordinator, b).await, CycleStatus::Resting);
}

// =============================================================================
// Restart and failure
// =============================================================================

#[tokio::test]
async fn deadlines_survive_restart() {
    let backing = Backing::new().await;
    let user = backing.participant("Pte Lee").await;
    {
        let (coordinator, _) = backing.boot();
        set_zone(&coordinator, user, "yellow", backing.clock.now()).await;
    }

    let (restarted, scheduler) = backing.boot();
    assert!(scheduler.is_empty());
    assert_eq!(restarted.rehydrate().await.unwrap(), 1);
    let armed = scheduler.armed(&user).unwrap();
    assert_eq!(armed.kind, DeadlineKind::Work);

    backing.clock.advance(Duration::minutes(30));
    assert_eq!(restarted.fire_due_deadlines().await, 1);
    assert_eq!(status(&restarted, user).await, CycleStatus::Resting);
}

#[tokio::test]
async fn failed_deadline_write_leaves_user_working() {
    let backing = Backing::new().await;
    let user = backing.participant("Pte Ng").await;
    let (coordinator, scheduler) = backing.boot();
    set_zone(&coordinator, user, "red", backing.clock.now()).await;
    let log_before = backing.store.entries_for(&backing.conduct_id).len();

    backing.states.set_failing(true);
    backing.clock.advance(Duration::minutes(30));
    assert_eq!(coordinator.fire_due_deadlines().await, 0);

    assert_eq!(status(&coordinator, user).await, CycleStatus::Working);
    assert_eq!(
        backing.store.entries_for(&backing.conduct_id).len(),
        log_before
    );
    assert!(backing.store.session_records().is_empty());
    assert!(scheduler.is_empty());

    // The stored state still holds the deadline, so rehydration re-arms it.
    backing.states.set_failing(false);
    assert_eq!(coordinator.rehydrate().await.unwrap(), 1);
    assert_eq!(coordinator.fire_due_deadlines().await, 1);
    assert_eq!(status(&coordinator, user).await, CycleStatus::Resting);
    assert_eq!(backing.store.session_records().len(), 1);
    assert_eq!(
        backing.store.entries_for(&backing.conduct_id).len(),
        log_before + 1
    );
}
