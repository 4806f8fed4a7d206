//! Audit module - immutable records that outlive a user's cycle.
//!
//! - `SessionRecord` - one row per closed work or rest interval
//! - `ActivityLogEntry` - one row per transition or conduct event

mod activity;
mod session_record;

pub use activity::{ActivityAction, ActivityDraft, ActivityLogEntry, ActivityNote, SYSTEM_USERNAME};
pub use session_record::{ClosedInterval, SessionRecord, SessionRecordStatus, SessionType};
