//! Timestamp parsing for simulated and real sensor logs
//!
//! Accepted forms, tried in order:
//! - `YYYY-MM-DD HH:MM:SS`
//! - `YYYY-MM-DD HH:MM`
//! - `HH:MM` (date set to [`time_only_date`])

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// A calendar date plus time-of-day, second precision
pub type TimePoint = NaiveDateTime;

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const TIME_ONLY_FORMAT: &str = "%H:%M";

/// Placeholder date for time-of-day only readings (1900-01-01)
pub fn time_only_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Timestamp did not match any known format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized timestamp {input:?}")]
pub struct ParseError {
    pub input: String,
}

/// Parse a raw timestamp string into a [`TimePoint`]
pub fn parse_time_point(raw: &str) -> Result<TimePoint, ParseError> {
    for fmt in DATE_TIME_FORMATS {
        if let Ok(point) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(point);
        }
    }

    NaiveTime::parse_from_str(raw, TIME_ONLY_FORMAT)
        .map(|time| time_only_date().and_time(time))
        .map_err(|_| ParseError { input: raw.to_string() })
}

/// Format a [`TimePoint`] the way the logs write it
pub fn format_time_point(point: &TimePoint) -> String {
    point.format(DATE_TIME_FORMATS[0]).to_string()
}
