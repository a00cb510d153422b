//! ISO-8601 timestamps with millisecond precision.
//!
//! Use with `#[serde(with = "crate::types::timestamp")]` on `DateTime<Utc>`
//! fields. Serializes as `2026-10-19T08:15:30.123Z`; deserializes any RFC 3339
//! string.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format a timestamp the way every record and envelope carries it.
#[must_use]
pub fn format(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde serializer for `DateTime<Utc>`.
///
/// # Errors
///
/// Propagates serializer failures.
pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(at))
}

/// Serde deserializer for `DateTime<Utc>`.
///
/// # Errors
///
/// Fails when the input is not an RFC 3339 timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_uses_millis_and_z() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 15, 30).unwrap();
        assert_eq!(format(&at), "2026-10-19T08:15:30.000Z");
    }
}
