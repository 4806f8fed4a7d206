//! Event bus that keeps envelopes in memory for assertions.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// Records every envelope it accepts. Can be switched into a failing mode
/// to exercise publish errors.
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    seen: Mutex<Vec<EventEnvelope>>,
    down: AtomicBool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.down.store(failing, Ordering::SeqCst);
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        !self.events_of_type(event_type).is_empty()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("bus down, dropped {}", event.event_type),
            ));
        }
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, EventMetadata, Timestamp};
    use serde_json::json;

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::new(),
            event_type: event_type.to_string(),
            schema_version: 1,
            aggregate_id: "u-1".to_string(),
            aggregate_type: "Cycle".to_string(),
            occurred_at: Timestamp::from_unix_secs(0),
            payload: json!({}),
            metadata: EventMetadata::default(),
        }
    }

    #[tokio::test]
    async fn keeps_envelopes_by_type() {
        let bus = InMemoryEventBus::new();
        bus.publish(envelope("cycle.transitioned.v1")).await.unwrap();
        bus.publish(envelope("cycle.transitioned.v1")).await.unwrap();
        bus.publish(envelope("conduct.closed.v1")).await.unwrap();

        assert_eq!(bus.event_count(), 3);
        assert_eq!(bus.events_of_type("cycle.transitioned.v1").len(), 2);
        assert!(!bus.has_event("missing.v1"));
    }

    #[tokio::test]
    async fn failing_bus_keeps_nothing() {
        let bus = InMemoryEventBus::new();
        bus.set_failing(true);

        let err = bus
            .publish(envelope("cycle.transitioned.v1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(bus.event_count(), 0);
        bus.set_failing(false);
        bus.publish(envelope("cycle.transitioned.v1")).await.unwrap();
        assert_eq!(bus.event_count(), 1);
    }
}
