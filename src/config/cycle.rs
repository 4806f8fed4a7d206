//! Cycle configuration: rest-start mode and the zone table source
//!
//! A zone file is YAML:
//!
//! ```yaml
//! zones:
//!   - { zone: white, work_minutes: 60, rest_minutes: 15, rank: 0 }
//!   - { zone: test, work_minutes: 0.1166667, rest_minutes: 1, rank: 6 }
//! ```

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ConfigError;
use crate::domain::cycle::RestStart;
use crate::domain::zone::{ZonePolicyTable, ZoneSpec};

/// Cycle configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CycleConfig {
    /// Whether rest starts automatically or waits for confirmation
    #[serde(default)]
    pub rest_start: RestStart,

    /// Optional YAML zone table; the built-in heat zones are used without it
    #[serde(default)]
    pub zones_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ZoneFile {
    zones: Vec<ZoneSpec>,
}

impl CycleConfig {
    /// Builds the zone table from the configured source.
    ///
    /// # Errors
    ///
    /// - `ZoneFileRead` / `ZoneFileParse` if the file is unreadable
    /// - `ZoneTable` if the zones violate the table invariants
    pub fn zone_table(&self) -> Result<ZonePolicyTable, ConfigError> {
        let specs = match &self.zones_file {
            Some(path) => Self::read_zone_file(path)?,
            None => ZonePolicyTable::heat_zone_specs(),
        };
        Ok(ZonePolicyTable::new(specs)?)
    }

    fn read_zone_file(path: &PathBuf) -> Result<Vec<ZoneSpec>, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ZoneFileRead {
            path: path.clone(),
            source,
        })?;
        let file: ZoneFile =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::ZoneFileParse {
                path: path.clone(),
                source,
            })?;
        Ok(file.zones)
    }
}
