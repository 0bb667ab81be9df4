//! Value parsing shared by the validator and the SQL compiler.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex_lite::Regex;

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("UUID pattern is a valid regex")
});

static TYPE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$")
        .expect("type name pattern is a valid regex")
});

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Whether `value` is a canonical v1–v5 UUID string.
pub fn is_uuid(value: &str) -> bool {
    UUID_PATTERN.is_match(value)
}

/// Whether `value` is a bare, optionally schema-qualified SQL type name
/// that can follow a `::` cast unquoted.
pub fn is_type_name(value: &str) -> bool {
    TYPE_NAME_PATTERN.is_match(value)
}

/// Parse a calendar date or timestamp.
///
/// Accepts RFC 3339 timestamps, offset-less timestamps and bare dates.
/// Offset-less inputs are read as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_pattern() {
        assert!(is_uuid("550e8400-e29b-41d4-a716-446655440001"));
        assert!(is_uuid("550E8400-E29B-41D4-A716-446655440001"));
        // version nibble 0 and 6 are outside v1-v5
        assert!(!is_uuid("550e8400-e29b-01d4-a716-446655440001"));
        assert!(!is_uuid("550e8400-e29b-61d4-a716-446655440001"));
        // variant nibble must be 8, 9, a or b
        assert!(!is_uuid("550e8400-e29b-41d4-c716-446655440001"));
        assert!(!is_uuid("not-a-uuid"));
        assert!(!is_uuid(" 550e8400-e29b-41d4-a716-446655440001"));
    }

    #[test]
    fn test_type_names() {
        assert!(is_type_name("role"));
        assert!(is_type_name("public.user_role"));
        assert!(!is_type_name("role; DROP TABLE users"));
        assert!(!is_type_name("\"role\""));
        assert!(!is_type_name("1role"));
        assert!(!is_type_name(""));
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-01-15").is_some());
        assert!(parse_date("2024-01-15T10:30:00Z").is_some());
        assert!(parse_date("2024-01-15T10:30:00.250+02:00").is_some());
        assert!(parse_date("2024-01-15T10:30:00").is_some());
        assert!(parse_date("2024-01-15 10:30").is_some());
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_format_timestamp() {
        let dt = parse_date("2024-01-15").unwrap();
        assert_eq!(format_timestamp(&dt), "2024-01-15T00:00:00.000Z");

        let dt = parse_date("2024-01-15T10:30:00.250+02:00").unwrap();
        assert_eq!(format_timestamp(&dt), "2024-01-15T08:30:00.250Z");
    }
}
