//! UTC instants.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time, always UTC. Serializes as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wall-clock now. Only `SystemClock` should call this; everything
    /// else asks the `Clock` port.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Out-of-range values fall back to the Unix epoch.
    pub fn from_unix_secs(secs: i64) -> Self {
        Self(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn is_before(&self, other: &Timestamp) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &Timestamp) -> bool {
        self > other
    }

    /// Signed: negative when `earlier` is actually later.
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    pub fn plus(&self, offset: Duration) -> Self {
        Self(self.0 + offset)
    }

    pub fn plus_secs(&self, secs: i64) -> Self {
        self.plus(Duration::seconds(secs))
    }

    /// `HH:MM:SS`, as shown in activity notes.
    pub fn time_of_day(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
            .into()
    }

    #[test]
    fn displays_as_rfc3339_seconds() {
        assert_eq!(Timestamp::from_unix_secs(0).to_string(), "1970-01-01T00:00:00Z");
        assert_eq!(at("2024-03-02T07:15:00Z").to_string(), "2024-03-02T07:15:00Z");
    }

    #[test]
    fn ordering_helpers_agree_with_ord() {
        let start = Timestamp::from_unix_secs(1_000);
        let end = start.plus_secs(1);

        assert!(start.is_before(&end) && end.is_after(&start));
        assert!(!start.is_after(&start));
    }

    #[test]
    fn json_is_a_plain_string() {
        let ts = at("2024-01-15T10:30:00Z");
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-15T10:30:00Z\"");
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
    }

    #[test]
    fn offsets_are_signed() {
        let ts = Timestamp::from_unix_secs(1_000);
        assert_eq!(ts.plus(Duration::minutes(2)), Timestamp::from_unix_secs(1_120));
        assert_eq!(ts.plus_secs(-10), Timestamp::from_unix_secs(990));
        assert_eq!(
            ts.duration_since(&ts.plus_secs(60)),
            Duration::seconds(-60)
        );
    }

    #[test]
    fn time_of_day_drops_the_date() {
        assert_eq!(at("2024-01-15T09:05:07Z").time_of_day(), "09:05:07");
    }
}
