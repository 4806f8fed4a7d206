//! Conduct aggregate - one exercise session under a shared PIN.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Pin;
use crate::domain::foundation::{
    CompanyId, ConductId, StateMachine, Timestamp, ValidationError,
};

pub const MAX_CONDUCT_NAME_LENGTH: usize = 200;

/// Lifecycle of a conduct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductStatus {
    #[default]
    Active,
    Inactive,
}

impl ConductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConductStatus::Active => "active",
            ConductStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ConductStatus::Active),
            "inactive" => Some(ConductStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for ConductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ConductStatus {
    fn successors(&self) -> &'static [Self] {
        match self {
            ConductStatus::Active => &[ConductStatus::Inactive],
            ConductStatus::Inactive => &[],
        }
    }
}

/// Cut-off state of a conduct.
///
/// While cut-off is active trainers cannot start work. Lifting it sends every
/// trainer into a mandatory rest that ends at `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CutOff {
    #[default]
    Clear,
    Active { since: Timestamp },
    MandatoryRest { until: Timestamp },
}

impl CutOff {
    /// Rebuilds the state from its stored columns. `since` wins if both are set.
    pub fn from_columns(since: Option<Timestamp>, until: Option<Timestamp>) -> Self {
        match (since, until) {
            (Some(since), _) => CutOff::Active { since },
            (None, Some(until)) => CutOff::MandatoryRest { until },
            (None, None) => CutOff::Clear,
        }
    }

    pub fn since(&self) -> Option<Timestamp> {
        match self {
            CutOff::Active { since } => Some(*since),
            _ => None,
        }
    }

    pub fn mandatory_rest_until(&self) -> Option<Timestamp> {
        match self {
            CutOff::MandatoryRest { until } => Some(*until),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CutOff::Active { .. })
    }
}

/// An exercise owned by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conduct {
    id: ConductId,
    company_id: CompanyId,
    name: String,
    pin: Pin,
    status: ConductStatus,
    cut_off: CutOff,
    created_at: Timestamp,
    last_activity_at: Timestamp,
}

impl Conduct {
    /// Creates an active conduct.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank or too long.
    pub fn new(
        company_id: CompanyId,
        name: &str,
        pin: Pin,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if name.chars().count() > MAX_CONDUCT_NAME_LENGTH {
            return Err(ValidationError::out_of_range(
                "name",
                1,
                MAX_CONDUCT_NAME_LENGTH as i64,
                name.chars().count() as i64,
            ));
        }

        Ok(Self {
            id: ConductId::new(),
            company_id,
            name: name.to_string(),
            pin,
            status: ConductStatus::Active,
            cut_off: CutOff::Clear,
            created_at: now,
            last_activity_at: now,
        })
    }

    /// Reconstitutes a conduct from storage without validation.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ConductId,
        company_id: CompanyId,
        name: String,
        pin: Pin,
        status: ConductStatus,
        cut_off: CutOff,
        created_at: Timestamp,
        last_activity_at: Timestamp,
    ) -> Self {
        Self {
            id,
            company_id,
            name,
            pin,
            status,
            cut_off,
            created_at,
            last_activity_at,
        }
    }

    pub fn id(&self) -> ConductId {
        self.id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    pub fn status(&self) -> ConductStatus {
        self.status
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    pub fn is_active(&self) -> bool {
        self.status == ConductStatus::Active
    }

    pub fn cut_off(&self) -> CutOff {
        self.cut_off
    }

    /// Starts cut-off, or lifts it into a mandatory rest of `rest` if it is
    /// already active. Returns the new state.
    pub fn toggle_cut_off(&mut self, now: Timestamp, rest: Duration) -> CutOff {
        self.cut_off = match self.cut_off {
            CutOff::Active { .. } => CutOff::MandatoryRest {
                until: now.plus(rest),
            },
            CutOff::Clear | CutOff::MandatoryRest { .. } => CutOff::Active { since: now },
        };
        self.cut_off
    }

    pub fn clear_cut_off(&mut self) {
        self.cut_off = CutOff::Clear;
    }

    /// Replaces the PIN after an allocation conflict.
    pub fn with_pin(mut self, pin: Pin) -> Self {
        self.pin = pin;
        self
    }

    /// Records activity, restarting the inactivity window.
    pub fn touch(&mut self, now: Timestamp) {
        if now.is_after(&self.last_activity_at) {
            self.last_activity_at = now;
        }
    }

    /// True if nothing happened since `cutoff`.
    pub fn is_idle_since(&self, cutoff: Timestamp) -> bool {
        self.last_activity_at.is_before(&cutoff)
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if the conduct is already inactive.
    pub fn deactivate(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(ConductStatus::Inactive)?;
        Ok(())
    }
}
