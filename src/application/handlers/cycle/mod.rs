//! Cycle handlers - coordination of per-user work/rest cycles.

mod audit_writer;
mod coordinator;
mod driver;
mod scheduler;

pub use audit_writer::{AuditLogWriter, ReservedEntry};
pub use coordinator::{CycleCoordinator, CycleStores};
pub use driver::SchedulerDriver;
pub use scheduler::{ArmedDeadline, CycleScheduler};
