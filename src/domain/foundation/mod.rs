//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors, and event plumbing
//! that form the vocabulary of the heat-cycle domain.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::{CompanyId, ConductId, SessionRecordId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
