//! Event publisher that writes envelopes to the log.
//!
//! Stands in for the external notification layer when none is wired.

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventPublisher;

impl LoggingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            conduct_id = event.metadata.conduct_id.as_deref().unwrap_or("-"),
            payload = %event.payload,
            "Event published"
        );
        Ok(())
    }
}
