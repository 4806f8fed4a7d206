//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, events)
//! - `zone` - Zone policy table and stringency resolver
//! - `cycle` - Per-user work/rest state machine
//! - `audit` - Session records and the activity log
//! - `conduct` - Exercises, PINs and participants

pub mod audit;
pub mod conduct;
pub mod cycle;
pub mod foundation;
pub mod zone;
