//! Domain events and the envelope they travel in.
//!
//! An event type names itself with a dotted, versioned string such as
//! `cycle.transitioned.v1`. The trailing `vN` becomes the envelope's
//! schema version.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// Identity of one emitted event; consumers use it to drop duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Something that happened to an aggregate and is worth telling others.
pub trait DomainEvent: Serialize + Send + Sync {
    const EVENT_TYPE: &'static str;
    const AGGREGATE_TYPE: &'static str;

    fn event_id(&self) -> EventId;
    fn aggregate_id(&self) -> String;
    fn occurred_at(&self) -> Timestamp;

    fn schema_version(&self) -> u32 {
        schema_version_of(Self::EVENT_TYPE)
    }

    /// Wraps the event for publishing. The payload is the event itself
    /// as JSON; a payload that fails to serialize degrades to `null`.
    fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope {
            event_id: self.event_id(),
            event_type: Self::EVENT_TYPE.to_string(),
            schema_version: self.schema_version(),
            aggregate_id: self.aggregate_id(),
            aggregate_type: Self::AGGREGATE_TYPE.to_string(),
            occurred_at: self.occurred_at(),
            payload: serde_json::to_value(self).unwrap_or_default(),
            metadata: EventMetadata::default(),
        }
    }
}

/// `a.b.v3` -> 3; anything without a version suffix is version 1.
fn schema_version_of(event_type: &str) -> u32 {
    event_type
        .rsplit_once(".v")
        .and_then(|(_, n)| n.parse().ok())
        .unwrap_or(1)
}

/// Routing context outside the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Notification rooms are keyed by conduct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conduct_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    pub schema_version: u32,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    pub fn with_conduct_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.conduct_id = Some(id.into());
        self
    }

    /// Decodes the payload back into a concrete event.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
