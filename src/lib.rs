//! Heatwatch - Heat-stress work/rest cycle tracking
//!
//! Tracks each participant of a training conduct through work and rest
//! intervals whose lengths depend on the current heat zone, escalating to the
//! most stringent zone seen during work and keeping an audit trail of every
//! completed or interrupted interval.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
