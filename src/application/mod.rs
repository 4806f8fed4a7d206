//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! the cycle coordinator with its deadline scheduler and audit writer, and
//! the conduct membership and supervisor command handlers.

pub mod handlers;

pub use handlers::{
    // Cycle
    ArmedDeadline, AuditLogWriter, CycleCoordinator, CycleScheduler, CycleStores,
    SchedulerDriver,
    // Conduct
    ClearConductCommandsHandler, CreateConductCommand, CreateConductHandler,
    DeactivateIdleConductsHandler, JoinConductCommand, JoinConductHandler, JoinConductResult,
    RemoveParticipantHandler, ToggleCutOffHandler,
};
