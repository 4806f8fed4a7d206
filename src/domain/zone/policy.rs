//! Zone Policy Table.
//!
//! Static mapping from zone to safe work duration, mandatory rest duration
//! and stringency rank. Built once from configuration and read-only for the
//! process lifetime.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::ZoneId;
use crate::domain::foundation::ValidationError;

/// Longest work interval a zone may declare (24 hours).
pub const MAX_WORK_MINUTES: f64 = 24.0 * 60.0;

/// Lookup failure: the zone is not configured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown zone: {0}")]
pub struct UnknownZone(pub String);

/// Reasons a zone table configuration is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneConfigError {
    #[error("Zone table must configure at least one zone")]
    Empty,

    #[error("Invalid zone name: {0}")]
    InvalidZone(#[from] ValidationError),

    #[error("Zone '{0}' is configured more than once")]
    DuplicateZone(ZoneId),

    #[error("Zones '{first}' and '{second}' share stringency rank {rank}")]
    DuplicateRank {
        rank: u32,
        first: ZoneId,
        second: ZoneId,
    },

    #[error("Zone '{zone}' has invalid work duration {minutes} minutes")]
    InvalidWorkMinutes { zone: ZoneId, minutes: f64 },
}

/// One zone row as written in configuration.
///
/// `work_minutes` may be fractional (a 7-second drill zone is `0.1166…`);
/// it resolves to whole seconds. `rest_minutes` is always whole minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub zone: String,
    pub work_minutes: f64,
    pub rest_minutes: u32,
    pub rank: u32,
}

impl ZoneSpec {
    pub fn new(zone: impl Into<String>, work_minutes: f64, rest_minutes: u32, rank: u32) -> Self {
        Self {
            zone: zone.into(),
            work_minutes,
            rest_minutes,
            rank,
        }
    }
}

/// Resolved policy for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePolicy {
    zone: ZoneId,
    work: Duration,
    rest_minutes: u32,
    rank: u32,
}

impl ZonePolicy {
    pub fn zone(&self) -> &ZoneId {
        &self.zone
    }

    /// Safe work duration.
    pub fn work(&self) -> Duration {
        self.work
    }

    /// Safe work duration in (possibly fractional) minutes.
    pub fn work_minutes(&self) -> f64 {
        self.work.num_seconds() as f64 / 60.0
    }

    /// Mandatory rest duration.
    pub fn rest(&self) -> Duration {
        Duration::minutes(i64::from(self.rest_minutes))
    }

    pub fn rest_minutes(&self) -> u32 {
        self.rest_minutes
    }

    /// Stringency rank; higher is more hazardous.
    pub fn rank(&self) -> u32 {
        self.rank
    }
}

/// Configured zones, keyed by identifier.
///
/// # Invariants
///
/// - At least one zone
/// - Zone identifiers are unique
/// - Ranks are unique, so rank is a strict total order over zones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePolicyTable {
    policies: HashMap<ZoneId, ZonePolicy>,
    strictest: ZonePolicy,
}

impl ZonePolicyTable {
    /// Builds a table from configuration rows.
    ///
    /// # Errors
    ///
    /// Returns `ZoneConfigError` when any invariant above is violated or a
    /// work duration is negative, non-finite or longer than a day.
    pub fn new(specs: impl IntoIterator<Item = ZoneSpec>) -> Result<Self, ZoneConfigError> {
        let mut policies: HashMap<ZoneId, ZonePolicy> = HashMap::new();
        let mut ranks: HashMap<u32, ZoneId> = HashMap::new();

        for spec in specs {
            let zone = ZoneId::new(&spec.zone)?;
            if !spec.work_minutes.is_finite()
                || spec.work_minutes < 0.0
                || spec.work_minutes > MAX_WORK_MINUTES
            {
                return Err(ZoneConfigError::InvalidWorkMinutes {
                    zone,
                    minutes: spec.work_minutes,
                });
            }
            if policies.contains_key(&zone) {
                return Err(ZoneConfigError::DuplicateZone(zone));
            }
            if let Some(first) = ranks.get(&spec.rank) {
                return Err(ZoneConfigError::DuplicateRank {
                    rank: spec.rank,
                    first: first.clone(),
                    second: zone,
                });
            }

            let work_secs = (spec.work_minutes * 60.0).round() as i64;
            ranks.insert(spec.rank, zone.clone());
            policies.insert(
                zone.clone(),
                ZonePolicy {
                    zone,
                    work: Duration::seconds(work_secs),
                    rest_minutes: spec.rest_minutes,
                    rank: spec.rank,
                },
            );
        }

        let strictest = policies
            .values()
            .max_by_key(|p| p.rank)
            .cloned()
            .ok_or(ZoneConfigError::Empty)?;
        Ok(Self {
            policies,
            strictest,
        })
    }

    /// Built-in heat-stress zone rows.
    pub fn heat_zone_specs() -> Vec<ZoneSpec> {
        vec![
            ZoneSpec::new("white", 60.0, 15, 0),
            ZoneSpec::new("green", 45.0, 15, 1),
            ZoneSpec::new("yellow", 30.0, 15, 2),
            ZoneSpec::new("red", 30.0, 30, 3),
            ZoneSpec::new("black", 15.0, 30, 4),
            ZoneSpec::new("cut-off", 0.0, 30, 5),
        ]
    }

    /// Looks up the policy for a zone.
    ///
    /// # Errors
    ///
    /// - `UnknownZone` if the zone is not configured
    pub fn lookup(&self, zone: &ZoneId) -> Result<&ZonePolicy, UnknownZone> {
        self.policies
            .get(zone)
            .ok_or_else(|| UnknownZone(zone.to_string()))
    }

    /// The highest-ranked zone, which governs mandatory rest after cut-off.
    pub fn strictest(&self) -> &ZonePolicy {
        &self.strictest
    }

    /// Stringency rank of a configured zone.
    pub fn rank(&self, zone: &ZoneId) -> Result<u32, UnknownZone> {
        self.lookup(zone).map(ZonePolicy::rank)
    }

    pub fn contains(&self, zone: &ZoneId) -> bool {
        self.policies.contains_key(zone)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Policies ordered from least to most stringent.
    pub fn by_rank(&self) -> Vec<&ZonePolicy> {
        let mut policies: Vec<&ZonePolicy> = self.policies.values().collect();
        policies.sort_by_key(|p| p.rank);
        policies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str) -> ZoneId {
        ZoneId::new(name).unwrap()
    }

    fn heat_table() -> ZonePolicyTable {
        ZonePolicyTable::new(ZonePolicyTable::heat_zone_specs()).unwrap()
    }

    #[test]
    fn heat_table_has_expected_durations() {
        let table = heat_table();

        let white = table.lookup(&zone("white")).unwrap();
        assert_eq!(white.work(), Duration::minutes(60));
        assert_eq!(white.rest_minutes(), 15);

        let black = table.lookup(&zone("black")).unwrap();
        assert_eq!(black.work(), Duration::minutes(15));
        assert_eq!(black.rest(), Duration::minutes(30));

        let cut_off = table.lookup(&zone("cut-off")).unwrap();
        assert_eq!(cut_off.work(), Duration::zero());
    }

    #[test]
    fn heat_table_ranks_are_ordered() {
        let table = heat_table();
        let names: Vec<&str> = table
            .by_rank()
            .into_iter()
            .map(|p| p.zone().as_str())
            .collect();
        assert_eq!(names, vec!["white", "green", "yellow", "red", "black", "cut-off"]);
        assert_eq!(heat_table().strictest().zone(), &zone("cut-off"));
    }

    #[test]
    fn lookup_unknown_zone_fails() {
        let err = heat_table().lookup(&zone("purple")).unwrap_err();
        assert_eq!(err, UnknownZone("purple".to_string()));
    }

    #[test]
    fn fractional_work_minutes_resolve_to_seconds() {
        let table = ZonePolicyTable::new(vec![ZoneSpec::new("drill", 7.0 / 60.0, 10, 9)]).unwrap();
        let drill = table.lookup(&zone("drill")).unwrap();
        assert_eq!(drill.work(), Duration::seconds(7));
    }

    #[test]
    fn rejects_duplicate_rank() {
        let err = ZonePolicyTable::new(vec![
            ZoneSpec::new("white", 60.0, 15, 0),
            ZoneSpec::new("green", 45.0, 15, 0),
        ])
        .unwrap_err();
        assert!(matches!(err, ZoneConfigError::DuplicateRank { rank: 0, .. }));
    }

    #[test]
    fn rejects_duplicate_zone_case_insensitively() {
        let err = ZonePolicyTable::new(vec![
            ZoneSpec::new("white", 60.0, 15, 0),
            ZoneSpec::new("WHITE", 45.0, 15, 1),
        ])
        .unwrap_err();
        assert_eq!(err, ZoneConfigError::DuplicateZone(zone("white")));
    }

    #[test]
    fn rejects_negative_or_nan_work() {
        assert!(ZonePolicyTable::new(vec![ZoneSpec::new("x", -1.0, 15, 0)]).is_err());
        assert!(ZonePolicyTable::new(vec![ZoneSpec::new("x", f64::NAN, 15, 0)]).is_err());
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(ZonePolicyTable::new(vec![]).unwrap_err(), ZoneConfigError::Empty);
    }

    #[test]
    fn new_zones_are_pluggable() {
        let mut specs = ZonePolicyTable::heat_zone_specs();
        specs.push(ZoneSpec::new("extreme", 5.0, 45, 10));
        let table = ZonePolicyTable::new(specs).unwrap();

        assert_eq!(table.len(), 7);
        assert_eq!(table.rank(&zone("extreme")).unwrap(), 10);
    }
}
