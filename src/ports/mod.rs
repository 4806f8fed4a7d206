//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the cycle core and its collaborators. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `CycleStateRepository` - Current cycle state per user
//! - `SessionRecordRepository` - Closed work/rest intervals
//! - `ActivityLogRepository` - Conduct audit trail
//!
//! ## Collaborator Ports
//!
//! - `ConductRegistry` - Conducts, PINs and participants
//! - `PinGenerator` - Candidate PIN source
//! - `EventPublisher` - Hand-off to the notification layer
//! - `Clock` - Injectable time source

mod activity_log_repository;
mod clock;
mod conduct_registry;
mod cycle_state_repository;
mod event_publisher;
mod pin_generator;
mod session_record_repository;

pub use activity_log_repository::ActivityLogRepository;
pub use clock::Clock;
pub use conduct_registry::{ConductRegistry, PinInsertOutcome};
pub use cycle_state_repository::{CycleCommit, CycleStateRepository, StoredCycleState};
pub use event_publisher::EventPublisher;
pub use pin_generator::PinGenerator;
pub use session_record_repository::SessionRecordRepository;
