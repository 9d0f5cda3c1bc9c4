//! Series construction and date re-basing
//!
//! `build_series` turns raw (timestamp, value) pairs into a clean
//! [`TimeSeries`] on a 1-minute grid. `align_to_day` moves a series onto a
//! reference calendar day so simulated and real data share one x-axis.

use crate::domain::time::{parse_time_point, ParseError, TimePoint};
use crate::domain::types::{RawValue, TimeSeries};
use chrono::{Duration, NaiveDate, Timelike};
use std::collections::BTreeMap;
use thiserror::Error;

/// Resampling cadence
const CADENCE_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error(transparent)]
    Timestamp(#[from] ParseError),
    #[error("{times} timestamps but {values} values")]
    LengthMismatch { times: usize, values: usize },
}

/// Build a resampled series from parallel timestamp and value lists
///
/// All timestamps are parsed up front, so an unparseable timestamp fails
/// the call even when its value would have been dropped. Values that do
/// not coerce to a number are dropped together with their timestamp.
/// Duplicate timestamps keep the value that came last in input order.
pub fn build_series<S: AsRef<str>>(
    times: &[S],
    values: &[RawValue],
) -> Result<TimeSeries, SeriesError> {
    if times.len() != values.len() {
        return Err(SeriesError::LengthMismatch { times: times.len(), values: values.len() });
    }

    let parsed = times
        .iter()
        .map(|t| parse_time_point(t.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(series_from_points(parsed.into_iter().zip(values.iter().cloned())))
}

/// Build a resampled series from already-parsed points
///
/// Same cleaning rules as [`build_series`], for callers that filter
/// unparseable timestamps themselves.
pub fn series_from_points<I>(points: I) -> TimeSeries
where
    I: IntoIterator<Item = (TimePoint, RawValue)>,
{
    // BTreeMap insert in input order gives sort + last-write-wins dedup
    let mut observations = BTreeMap::new();
    for (at, raw) in points {
        if let Some(value) = raw.as_number() {
            observations.insert(at, value);
        }
    }

    resample(&observations)
}

/// Forward-fill observations onto a minute grid
///
/// Slots run from the first observation floored to the minute through the
/// last observation floored to the minute. Each slot takes the latest
/// observation at or before it; a slot with none is left out.
fn resample(observations: &BTreeMap<TimePoint, f64>) -> TimeSeries {
    let (Some((&first, _)), Some((&last, _))) =
        (observations.first_key_value(), observations.last_key_value())
    else {
        return TimeSeries::new();
    };

    let step = Duration::seconds(CADENCE_SECS);
    let end = floor_to_minute(last);
    let mut slot = floor_to_minute(first);
    let mut pending = observations.iter().peekable();
    let mut current = None;
    let mut series = TimeSeries::new();

    while slot <= end {
        while let Some((_, value)) = pending.next_if(|(at, _)| **at <= slot) {
            current = Some(*value);
        }
        if let Some(value) = current {
            series.insert(slot, value);
        }
        slot += step;
    }

    series
}

fn floor_to_minute(at: TimePoint) -> TimePoint {
    at.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(at)
}

/// Replace the date of every key with `day`, keeping the time of day
///
/// Keys that collide after re-basing keep the value of the later original
/// key. No resampling happens here.
pub fn align_to_day(series: &TimeSeries, day: NaiveDate) -> TimeSeries {
    series.iter().map(|(at, value)| (day.and_time(at.time()), value)).collect()
}
