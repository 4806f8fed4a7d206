//! Event publisher adapters.
//!
//! - `InMemoryEventBus` - Captures events for test assertions
//! - `LoggingEventPublisher` - Logs envelopes when no notification layer is wired

mod in_memory;
mod logging;

pub use in_memory::InMemoryEventBus;
pub use logging::LoggingEventPublisher;
