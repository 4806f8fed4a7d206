//! Participants of a conduct.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ConductId, Timestamp, UserId, ValidationError};

pub const MAX_PARTICIPANT_NAME_LENGTH: usize = 100;

/// Role a participant plays in the exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// Personnel whose work/rest cycle is tracked.
    Trainer,
    /// Supervisor who sets zones and resets cycles.
    ConductingBody,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Trainer => "trainer",
            ParticipantRole::ConductingBody => "conducting_body",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trainer" => Some(ParticipantRole::Trainer),
            "conducting_body" => Some(ParticipantRole::ConductingBody),
            _ => None,
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user registered in a conduct. Names are unique within a conduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub conduct_id: ConductId,
    pub name: String,
    pub role: ParticipantRole,
    pub joined_at: Timestamp,
}

impl Participant {
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank or too long.
    pub fn new(
        conduct_id: ConductId,
        name: &str,
        role: ParticipantRole,
        joined_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            user_id: UserId::new(),
            conduct_id,
            name: Self::normalize_name(name)?,
            role,
            joined_at,
        })
    }

    /// Trims a display name and checks its length.
    pub fn normalize_name(name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let len = name.chars().count();
        if len > MAX_PARTICIPANT_NAME_LENGTH {
            return Err(ValidationError::out_of_range(
                "name",
                1,
                MAX_PARTICIPANT_NAME_LENGTH as i64,
                len as i64,
            ));
        }
        Ok(name.to_string())
    }
}
