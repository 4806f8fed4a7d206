//! CycleScheduler - the deadline table for every active user.
//!
//! Holds at most one armed deadline per user. Arming replaces whatever was
//! armed before, so an escalation never leaves the old deadline behind. The
//! table never fires anything itself: a driver asks for due entries with
//! `take_due` and feeds them back through the coordinator.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use crate::domain::cycle::{DeadlineChange, DeadlineKind};
use crate::domain::foundation::{Timestamp, UserId};

/// A deadline waiting to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedDeadline {
    pub user_id: UserId,
    pub kind: DeadlineKind,
    pub due: Timestamp,
}

#[derive(Debug, Default)]
pub struct CycleScheduler {
    deadlines: Mutex<HashMap<UserId, ArmedDeadline>>,
    rearmed: Notify,
}

impl CycleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<UserId, ArmedDeadline>> {
        self.deadlines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arms a deadline for `user_id`, returning the one it replaced.
    pub fn arm(&self, user_id: UserId, kind: DeadlineKind, due: Timestamp) -> Option<ArmedDeadline> {
        let previous = self.table().insert(user_id, ArmedDeadline { user_id, kind, due });
        self.rearmed.notify_one();
        previous
    }

    /// Removes the user's deadline, if any.
    pub fn cancel(&self, user_id: &UserId) -> Option<ArmedDeadline> {
        self.table().remove(user_id)
    }

    /// Applies the deadline outcome of a transition.
    pub fn apply(&self, user_id: UserId, change: DeadlineChange) {
        match change {
            DeadlineChange::Arm { kind, due } => {
                self.arm(user_id, kind, due);
            }
            DeadlineChange::Cancel => {
                self.cancel(&user_id);
            }
            DeadlineChange::Unchanged => {}
        }
    }

    pub fn armed(&self, user_id: &UserId) -> Option<ArmedDeadline> {
        self.table().get(user_id).copied()
    }

    /// Removes and returns every deadline due at or before `now`, earliest first.
    pub fn take_due(&self, now: Timestamp) -> Vec<ArmedDeadline> {
        let mut table = self.table();
        let due_users: Vec<UserId> = table
            .values()
            .filter(|d| !d.due.is_after(&now))
            .map(|d| d.user_id)
            .collect();

        let mut due: Vec<ArmedDeadline> = due_users
            .iter()
            .filter_map(|user_id| table.remove(user_id))
            .collect();
        due.sort_by_key(|d| (d.due, d.user_id));
        due
    }

    /// Earliest armed deadline.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.table().values().map(|d| d.due).min()
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Resolves after the next `arm` call, or at once if one happened since
    /// the last wait.
    pub fn notified(&self) -> Notified<'_> {
        self.rearmed.notified()
    }
}
