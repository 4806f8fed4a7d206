//! Zone identifier value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Maximum length for a zone identifier.
pub const MAX_ZONE_ID_LENGTH: usize = 20;

/// Identifier of a heat-hazard zone (e.g. `white`, `black`, `cut-off`).
///
/// Identifiers are case-insensitive; they are trimmed and stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneId(String);

impl ZoneId {
    /// Creates a zone identifier.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if blank
    /// - `InvalidFormat` if longer than 20 characters or not made of
    ///   ASCII letters, digits and hyphens
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized = raw.as_ref().trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("zone"));
        }
        if normalized.len() > MAX_ZONE_ID_LENGTH {
            return Err(ValidationError::invalid_format(
                "zone",
                format!("must be at most {} characters", MAX_ZONE_ID_LENGTH),
            ));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid_format(
                "zone",
                "only letters, digits, '-' and '_' are allowed",
            ));
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ZoneId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ZoneId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ZoneId> for String {
    fn from(zone: ZoneId) -> Self {
        zone.0
    }
}
