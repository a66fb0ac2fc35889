//! Date range validation for search and edit forms
//!
//! Runs before any network call so malformed input never reaches the
//! weather API.

use chrono::NaiveDate;
use skylog_common::time::parse_date;
use thiserror::Error;

/// Default longest accepted range, inclusive of both ends
pub const DEFAULT_MAX_RANGE_DAYS: i64 = 31;

/// Validated inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn as_tuple(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }
}

/// Date range validation failures; messages are shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("Dates must be in YYYY-MM-DD format.")]
    Format,

    #[error("Start date must be on or before end date.")]
    Order,

    #[error("Date range too large ({span} days). Max {max} days.")]
    TooLarge { span: i64, max: i64 },
}

/// Validate optional start/end form values
///
/// Both blank means "no range". One blank, or either unparseable, is a
/// format error.
pub fn validate_date_range(
    start: Option<&str>,
    end: Option<&str>,
    max_days: i64,
) -> Result<Option<DateRange>, DateRangeError> {
    let start = non_blank(start);
    let end = non_blank(end);

    if start.is_none() && end.is_none() {
        return Ok(None);
    }

    let start = start.and_then(|s| parse_date(s).ok());
    let end = end.and_then(|s| parse_date(s).ok());
    let (Some(start), Some(end)) = (start, end) else {
        return Err(DateRangeError::Format);
    };

    if start > end {
        return Err(DateRangeError::Order);
    }

    let range = DateRange { start, end };
    let span = range.days();
    if span > max_days {
        return Err(DateRangeError::TooLarge { span, max: max_days });
    }

    Ok(Some(range))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_both_absent_is_no_range() {
        assert_eq!(validate_date_range(None, None, 31), Ok(None));
        assert_eq!(validate_date_range(Some(""), Some("  "), 31), Ok(None));
    }

    #[test]
    fn test_valid_range() {
        let range = validate_date_range(Some("2025-01-01"), Some("2025-01-10"), 31)
            .unwrap()
            .unwrap();
        assert_eq!(range.start, date(2025, 1, 1));
        assert_eq!(range.end, date(2025, 1, 10));
        assert_eq!(range.days(), 10);
    }

    #[test]
    fn test_single_day_range() {
        let range = validate_date_range(Some("2025-02-28"), Some("2025-02-28"), 31)
            .unwrap()
            .unwrap();
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_surrounding_whitespace_accepted() {
        let range = validate_date_range(Some(" 2025-01-01 "), Some("2025-01-02\n"), 31).unwrap();
        assert!(range.is_some());
    }

    #[test]
    fn test_only_one_date_is_format_error() {
        assert_eq!(
            validate_date_range(Some("2025-01-01"), None, 31),
            Err(DateRangeError::Format)
        );
        assert_eq!(
            validate_date_range(Some(""), Some("2025-01-01"), 31),
            Err(DateRangeError::Format)
        );
    }

    #[test]
    fn test_bad_format() {
        assert_eq!(
            validate_date_range(Some("01/02/2025"), Some("2025-01-05"), 31),
            Err(DateRangeError::Format)
        );
        assert_eq!(
            validate_date_range(Some("2025-02-30"), Some("2025-03-01"), 31),
            Err(DateRangeError::Format)
        );
    }

    #[test]
    fn test_reversed_order() {
        assert_eq!(
            validate_date_range(Some("2025-01-10"), Some("2025-01-01"), 31),
            Err(DateRangeError::Order)
        );
    }

    #[test]
    fn test_span_limit_is_inclusive() {
        // Jan 1..=Jan 31 is exactly 31 days
        assert!(validate_date_range(Some("2025-01-01"), Some("2025-01-31"), 31).is_ok());

        let err = validate_date_range(Some("2025-01-01"), Some("2025-02-01"), 31).unwrap_err();
        assert_eq!(err, DateRangeError::TooLarge { span: 32, max: 31 });
        assert_eq!(err.to_string(), "Date range too large (32 days). Max 31 days.");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DateRangeError::Format.to_string(),
            "Dates must be in YYYY-MM-DD format."
        );
        assert_eq!(
            DateRangeError::Order.to_string(),
            "Start date must be on or before end date."
        );
    }
}
