//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `clock` - Wall clock and a manually advanced clock for tests
//! - `events` - Event publishers (in-memory capture, tracing log)
//! - `memory` - In-memory persistence for every repository port
//! - `pin` - Random conduct PIN generation
//! - `postgres` - PostgreSQL persistence

pub mod clock;
pub mod events;
pub mod memory;
pub mod pin;
pub mod postgres;

pub use clock::{ManualClock, SystemClock};
pub use events::{InMemoryEventBus, LoggingEventPublisher};
pub use pin::RandomPinGenerator;
