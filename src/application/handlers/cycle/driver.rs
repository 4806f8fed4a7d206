//! SchedulerDriver - turns armed deadlines into deadline events.
//!
//! Sleeps until the earliest armed deadline (at most `idle_wait`), wakes early
//! whenever a deadline is armed, and hands due deadlines to the coordinator.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info};

use super::{CycleCoordinator, CycleScheduler};
use crate::ports::Clock;

pub struct SchedulerDriver {
    coordinator: Arc<CycleCoordinator>,
    scheduler: Arc<CycleScheduler>,
    clock: Arc<dyn Clock>,
    idle_wait: Duration,
}

impl SchedulerDriver {
    pub fn new(
        coordinator: Arc<CycleCoordinator>,
        clock: Arc<dyn Clock>,
        idle_wait: Duration,
    ) -> Self {
        let scheduler = coordinator.scheduler().clone();
        Self {
            coordinator,
            scheduler,
            clock,
            idle_wait,
        }
    }

    /// Run the driver loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(idle_wait_secs = self.idle_wait.as_secs(), "Scheduler driver started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let fired = self.poll_once().await;
            if fired > 0 {
                debug!(fired, "Fired due deadlines");
            }

            let wait = self.next_wait();
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = time::sleep(wait) => {}
                _ = self.scheduler.notified() => {}
            }
        }

        info!("Scheduler driver stopped");
    }

    /// Fires every deadline due now.
    pub async fn poll_once(&self) -> usize {
        self.coordinator.fire_due_deadlines().await
    }

    /// Time until the earliest deadline, capped at `idle_wait`.
    pub fn next_wait(&self) -> Duration {
        match self.scheduler.next_due() {
            Some(due) => due
                .duration_since(&self.clock.now())
                .to_std()
                .unwrap_or(Duration::ZERO)
                .min(self.idle_wait),
            None => self.idle_wait,
        }
    }
}
