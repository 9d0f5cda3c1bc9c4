//! Domain models - time points, series, bindings and plot results
//!
//! This module contains the canonical data types used throughout the system:
//! - `time` - timestamp parsing (`TimePoint`, `ParseError`)
//! - `series` - resampled series construction and date re-basing
//! - `types` - `TimeSeries`, `SensorBinding`, `SensorCategory`, `ReconciledPair`

pub mod series;
pub mod time;
pub mod types;

// Re-export commonly used types at module level
pub use series::{align_to_day, build_series, series_from_points, SeriesError};
pub use time::{parse_time_point, ParseError, TimePoint};
pub use types::{
    RawValue, ReconciledPair, SensorBinding, SensorCategory, SensorPlot, SensorSnapshot,
    SingleSeries, TimeSeries,
};
