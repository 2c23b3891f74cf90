//! Timestamp parsing and formatting for stored rows.
//!
//! Rows coming back from the store carry timestamps in whatever shape the
//! backend produced: RFC 3339 from PostgREST, a space-separated form from
//! hand-edited SQLite files, or a bare date for `due_date` columns. All of
//! them are read as UTC instants. No timezone conversion is applied beyond
//! honouring an explicit offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses any supported timestamp shape. Returns `None` for unrecognised input.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres `timestamptz` text without the `T` separator, e.g. "2024-01-15 10:00:00+00"
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The canonical text form written by this crate: RFC 3339, microseconds, `Z` suffix.
///
/// Fixed width, so lexicographic order matches chronological order.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now() -> String {
    format_timestamp(Utc::now())
}

/// Lenient `Option<DateTime<Utc>>` deserializer: null, missing and unparseable all map to `None`.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-01-15T23:30:00+08:00").unwrap();
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 15);
    }

    #[test]
    fn parses_postgres_and_naive_forms() {
        assert!(parse_timestamp("2024-01-15 10:00:00.123456+00").is_some());
        assert!(parse_timestamp("2024-01-15 10:00:00").is_some());
        let date_only = parse_timestamp("2024-03-01").unwrap();
        assert_eq!((date_only.month(), date_only.day(), date_only.hour()), (3, 1, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn formatted_timestamps_round_trip() {
        let dt = parse_timestamp("2024-01-15T10:00:00Z").unwrap();
        assert_eq!(format_timestamp(dt), "2024-01-15T10:00:00.000000Z");
        assert_eq!(parse_timestamp(&format_timestamp(dt)), Some(dt));
    }
}
