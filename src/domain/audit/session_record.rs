//! Session records - one immutable row per closed work or rest interval.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ConductId, SessionRecordId, Timestamp, UserId};
use crate::domain::zone::ZoneId;

/// Kind of interval a record covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Work,
    Rest,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::Rest => "rest",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an interval ended.
///
/// The cycle core writes records only when an interval closes, so it emits
/// `Completed` or `Interrupted`. `Ongoing` exists for stores that mirror
/// open intervals; such rows are final once they leave `Ongoing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRecordStatus {
    Completed,
    Interrupted,
    Ongoing,
}

impl SessionRecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionRecordStatus::Completed => "completed",
            SessionRecordStatus::Interrupted => "interrupted",
            SessionRecordStatus::Ongoing => "ongoing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(SessionRecordStatus::Completed),
            "interrupted" => Some(SessionRecordStatus::Interrupted),
            "ongoing" => Some(SessionRecordStatus::Ongoing),
            _ => None,
        }
    }
}

impl fmt::Display for SessionRecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interval closed by a cycle transition, before ownership is attached.
///
/// `zone` is the most stringent zone for work intervals and the zone that
/// triggered the rest for rest intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedInterval {
    pub session_type: SessionType,
    pub zone: ZoneId,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub status: SessionRecordStatus,
}

/// Immutable audit record of one work or rest interval.
///
/// Owned by the conduct; outlives the user's cycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionRecordId,
    pub user_id: UserId,
    pub conduct_id: ConductId,
    pub zone: ZoneId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: SessionRecordStatus,
    pub session_type: SessionType,
}

impl SessionRecord {
    /// Attaches ownership to a closed interval.
    pub fn from_interval(user_id: UserId, conduct_id: ConductId, interval: ClosedInterval) -> Self {
        Self {
            id: SessionRecordId::new(),
            user_id,
            conduct_id,
            zone: interval.zone,
            start_time: interval.started_at,
            end_time: interval.ended_at,
            status: interval.status,
            session_type: interval.session_type,
        }
    }

    /// Elapsed interval length.
    pub fn duration(&self) -> chrono::Duration {
        self.end_time.duration_since(&self.start_time)
    }
}
