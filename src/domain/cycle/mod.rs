//! Cycle module - per-user work/rest cycle.
//!
//! A user moves idle → working → resting → idle. While working, the most
//! stringent zone seen since the interval began governs both the work
//! deadline and the rest that follows.

mod errors;
mod event;
mod events;
mod machine;
mod snapshot;
mod state;
mod status;

pub use errors::CycleError;
pub use event::{CycleEvent, DeadlineKind, ResetReason};
pub use events::CycleTransitioned;
pub use machine::{CycleMachine, DeadlineChange, RestStart, Transition};
pub use snapshot::StateSnapshot;
pub use state::{CycleState, PendingRest, RestInterval, WorkInterval};
pub use status::CycleStatus;
