//! Timestamp utilities
//!
//! Timestamps are stored as RFC 3339 strings with microsecond precision in
//! UTC, so lexical order in SQL matches chronological order. Calendar dates
//! are stored as `YYYY-MM-DD`.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

use crate::{Error, Result};

/// Calendar date format used in forms, storage and exports
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's date on the server's local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a timestamp for storage
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp '{}': {}", value, e)))
}

/// Format a calendar date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("Invalid date '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[tokio::test]
    async fn test_formatted_timestamps_sort_chronologically() {
        let first = format_timestamp(&now());
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = format_timestamp(&now());
        assert!(second > first);
    }

    #[test]
    fn test_timestamp_round_trip_keeps_microseconds() {
        let ts = now();
        let parsed = parse_timestamp(&format_timestamp(&ts)).unwrap();
        assert_eq!(parsed.timestamp_micros(), ts.timestamp_micros());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_date_iso() {
        let d = parse_date("2025-09-30").unwrap();
        assert_eq!(format_date(d), "2025-09-30");
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("09/30/2025").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }
}
