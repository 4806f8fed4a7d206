//! EventPublisher port - hands cycle transitions to whatever notifies users.
//!
//! Publishing happens after the transition is stored, so a publisher error
//! is logged by the caller and never rolls a transition back.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Outbound sink for event envelopes.
///
/// Delivery is at-least-once; consumers key on `event_id` to drop repeats.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
