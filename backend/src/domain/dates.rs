//! Date normalization and arithmetic.
//!
//! All timestamps are stored as RFC 3339 UTC strings in a single fixed
//! format, so range filters and ordering can compare them lexically.
//! Clients may send either a full RFC 3339 timestamp or a bare
//! `YYYY-MM-DD` date; bare dates widen to the start or end of that day
//! depending on which side of a window they bound.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::AppError;

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_rfc3339() -> String {
    to_rfc3339(now_utc())
}

/// Parse a client-supplied date or timestamp as the lower bound of a window
pub fn parse_start_bound(s: &str) -> Result<String, AppError> {
    parse_flexible(s, false).map(to_rfc3339)
}

/// Parse a client-supplied date or timestamp as the upper (inclusive) bound
pub fn parse_end_bound(s: &str) -> Result<String, AppError> {
    parse_flexible(s, true).map(to_rfc3339)
}

/// Parse a transaction timestamp; bare dates mean start of day
pub fn parse_timestamp(s: &str) -> Result<String, AppError> {
    parse_flexible(s, false).map(to_rfc3339)
}

fn parse_flexible(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        // and_hms_opt only fails for out-of-range times, never these
        let naive = time.ok_or_else(|| AppError::BadRequest(format!("Invalid date: {s}")))?;
        return Ok(naive.and_utc());
    }
    Err(AppError::BadRequest(format!("Invalid date: {s}")))
}

/// Parse one of our stored RFC 3339 strings back to a timestamp
pub fn parse_stored(s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {s}")))
}

/// Whole days between two instants, rounded up
pub fn days_between_ceil(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let secs = (to - from).num_seconds();
    (secs as f64 / 86_400.0).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dates_widen_to_day_bounds() {
        assert_eq!(
            parse_start_bound("2025-01-15").unwrap(),
            "2025-01-15T00:00:00Z"
        );
        assert_eq!(
            parse_end_bound("2025-01-15").unwrap(),
            "2025-01-15T23:59:59Z"
        );
    }

    #[test]
    fn rfc3339_inputs_normalize_to_utc() {
        assert_eq!(
            parse_timestamp("2025-06-14T10:30:00-04:00").unwrap(),
            "2025-06-14T14:30:00Z"
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("not-a-date").is_err());
        assert!(parse_start_bound("2025-13-40").is_err());
    }

    #[test]
    fn day_arithmetic_rounds_up() {
        let from = parse_stored("2025-01-01T00:00:00Z").unwrap();
        let to = parse_stored("2025-01-11T12:00:00Z").unwrap();
        assert_eq!(days_between_ceil(from, to), 11);
        assert_eq!(days_between_ceil(from, from), 0);
    }
}
