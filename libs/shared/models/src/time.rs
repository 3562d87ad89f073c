//! Calendar parsing and half-open interval helpers shared by slot generation
//! and booking validation. All times are wall-clock in one implicit timezone.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::SchedulingError;

/// Width of every generated slot.
pub const SLOT_MINUTES: i64 = 30;

/// Duration used when a booking request does not specify one.
pub const DEFAULT_BOOKING_MINUTES: u32 = 30;

/// Longest booking accepted in a single request.
pub const MAX_BOOKING_MINUTES: u32 = 8 * 60;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parses a canonical `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, SchedulingError> {
    let raw = raw.trim();
    // chrono accepts single-digit months and days; the canonical form does not
    if raw.len() != 10 {
        return Err(invalid_date(raw));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid_date(raw))
}

/// Parses a slot start such as `2024-06-03 10:00` or `2024-06-03T10:00:00`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SchedulingError> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            SchedulingError::InvalidFormat(format!(
                "'{}' is not a valid timestamp, expected YYYY-MM-DD HH:MM",
                raw
            ))
        })
}

/// Parses a time of day stored as `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

pub fn format_display(at: NaiveDateTime) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

pub fn minutes(value: impl Into<i64>) -> Duration {
    Duration::minutes(value.into())
}

/// Half-open overlap test for `[a_start, a_end)` and `[b_start, b_end)`.
/// Intervals that only touch at a boundary do not overlap.
pub fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start.max(b_start) < a_end.min(b_end)
}

fn invalid_date(raw: &str) -> SchedulingError {
    SchedulingError::InvalidFormat(format!(
        "'{}' is not a valid date, expected YYYY-MM-DD",
        raw
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn parses_canonical_dates_only() {
        assert_eq!(parse_date("2024-06-03").unwrap(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert!(parse_date("2024-6-3").is_err());
        assert!(parse_date("03/06/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn parses_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(at("2024-06-03 10:00"), expected);
        assert_eq!(at("2024-06-03T10:00"), expected);
        assert_eq!(at("2024-06-03T10:00:00"), expected);
        assert!(parse_timestamp("tomorrow at ten").is_err());
    }

    #[test]
    fn time_of_day_accepts_optional_seconds() {
        assert_eq!(parse_time_of_day("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_time_of_day("17:00:00"), NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(parse_time_of_day("5pm"), None);
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let (a, b, c) = (at("2024-06-03 10:00"), at("2024-06-03 10:30"), at("2024-06-03 11:00"));
        assert!(!intervals_overlap(a, b, b, c));
        assert!(!intervals_overlap(b, c, a, b));
    }

    #[test]
    fn partial_and_nested_intervals_overlap() {
        let a = at("2024-06-03 10:00");
        let b = at("2024-06-03 10:15");
        let c = at("2024-06-03 10:30");
        let d = at("2024-06-03 10:45");
        assert!(intervals_overlap(a, c, b, d));
        assert!(intervals_overlap(a, d, b, c));
        assert!(intervals_overlap(a, c, a, c));
    }

    #[test]
    fn display_format_drops_seconds() {
        assert_eq!(format_display(at("2024-06-03T09:30:00")), "2024-06-03 09:30");
    }
}
