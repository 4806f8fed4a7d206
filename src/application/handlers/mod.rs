//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod conduct;
pub mod cycle;

pub use conduct::{
    ClearConductCommandsHandler, CreateConductCommand, CreateConductHandler,
    DeactivateIdleConductsHandler, JoinConductCommand, JoinConductHandler, JoinConductResult,
    RemoveParticipantHandler, ToggleCutOffHandler,
};
pub use cycle::{
    ArmedDeadline, AuditLogWriter, CycleCoordinator, CycleScheduler, CycleStores,
    SchedulerDriver,
};
