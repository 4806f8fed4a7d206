//! Cycle domain events handed to the notification layer.

use serde::{Deserialize, Serialize};

use super::{CycleStatus, StateSnapshot};
use crate::domain::audit::ActivityAction;
use crate::domain::foundation::{ConductId, DomainEvent, EventId, Timestamp, UserId};

/// A cycle transition was applied and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTransitioned {
    pub event_id: EventId,
    pub user_id: UserId,
    pub conduct_id: ConductId,
    pub username: String,
    pub from: CycleStatus,
    pub to: CycleStatus,
    pub action: ActivityAction,
    pub snapshot: StateSnapshot,
    pub occurred_at: Timestamp,
}

impl DomainEvent for CycleTransitioned {
    const EVENT_TYPE: &'static str = "cycle.transitioned.v1";
    const AGGREGATE_TYPE: &'static str = "Cycle";

    fn event_id(&self) -> EventId {
        self.event_id
    }

    fn aggregate_id(&self) -> String {
        self.user_id.to_string()
    }

    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
}
