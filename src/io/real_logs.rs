//! Real-device log loaders
//!
//! Physical sensors log to CSV files directly under the logs directory.
//! Several naming conventions are in use, so each loader scans for every
//! file that belongs to its device key and merges the rows:
//! - DHT temperature: `dht_<label>.csv`, `dht_<label>_<suffix>.csv`, `dht-<label>...`
//! - Smart meter power: `smartmeter_<ip>...`, `power_<ip>...`, with `<ip>`
//!   written literally or with `.`/`:` replaced by `_`

use crate::domain::series::series_from_points;
use crate::domain::time::{parse_time_point, TimePoint};
use crate::domain::types::{RawValue, TimeSeries};
use crate::io::csv_log::{self, LoadError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_COLUMNS: &[&str] = &["timestamp", "time", "datetime", "ts"];
const TEMPERATURE_COLUMNS: &[&str] = &["temp", "temperature", "value"];
const POWER_COLUMNS: &[&str] = &["power", "power_w", "watts", "value"];

const DHT_PREFIXES: &[&str] = &["dht_", "dht-"];
const POWER_PREFIXES: &[&str] = &["smartmeter_", "smartmeter-", "power_", "power-"];

/// Loads the real measurement series for one device
pub trait RealDataLoader {
    /// `key` identifies the device (DHT label or meter IP). No matching
    /// log is an empty series, not an error.
    fn load(&self, key: &str, logs_dir: &Path) -> Result<TimeSeries, LoadError>;
}

/// DHT temperature logs keyed by device label
#[derive(Debug, Clone, Copy, Default)]
pub struct TemperatureLogLoader;

impl RealDataLoader for TemperatureLogLoader {
    fn load(&self, label: &str, logs_dir: &Path) -> Result<TimeSeries, LoadError> {
        let keys = [label.to_string(), label.replace(' ', "_")];
        let files = matching_logs(logs_dir, DHT_PREFIXES, &keys)?;
        load_files(&files, TEMPERATURE_COLUMNS)
    }
}

/// Smart-meter power logs keyed by IP address
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerLogLoader;

impl RealDataLoader for PowerLogLoader {
    fn load(&self, ip: &str, logs_dir: &Path) -> Result<TimeSeries, LoadError> {
        let keys = [ip.to_string(), ip.replace(['.', ':'], "_")];
        let files = matching_logs(logs_dir, POWER_PREFIXES, &keys)?;
        load_files(&files, POWER_COLUMNS)
    }
}

/// CSV files under `logs_dir` whose stem is `<prefix><key>` optionally
/// followed by `_` or `-` and a suffix, sorted by path
fn matching_logs(
    logs_dir: &Path,
    prefixes: &[&str],
    keys: &[String],
) -> Result<Vec<PathBuf>, LoadError> {
    let entries = match fs::read_dir(logs_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(LoadError::Io { path: logs_dir.to_path_buf(), source }),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let is_csv = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            is_csv && stem_matches(stem, prefixes, keys)
        })
        .collect();
    files.sort();
    files.dedup();
    Ok(files)
}

fn stem_matches(stem: &str, prefixes: &[&str], keys: &[String]) -> bool {
    prefixes.iter().filter_map(|p| stem.strip_prefix(p)).any(|rest| {
        keys.iter().filter(|k| !k.is_empty()).any(|key| match rest.strip_prefix(key.as_str()) {
            Some("") => true,
            Some(tail) => tail.starts_with('_') || tail.starts_with('-'),
            None => false,
        })
    })
}

fn load_files(files: &[PathBuf], value_columns: &[&'static str]) -> Result<TimeSeries, LoadError> {
    let mut points = Vec::new();
    for path in files {
        read_points(path, value_columns, &mut points)?;
    }
    Ok(series_from_points(points))
}

fn read_points(
    path: &Path,
    value_columns: &[&'static str],
    points: &mut Vec<(TimePoint, RawValue)>,
) -> Result<(), LoadError> {
    let (mut reader, headers) = csv_log::open_log(path)?;
    let ts_col = csv_log::require_column(path, &headers, TIMESTAMP_COLUMNS)?;
    let value_col = csv_log::require_column(path, &headers, value_columns)?;

    let mut rows = 0usize;
    let mut skipped = 0usize;
    for row in csv_log::rows(path, &mut reader) {
        let row = row?;
        rows += 1;
        let Some(at) = row.get(ts_col).and_then(parse_log_timestamp) else {
            skipped += 1;
            continue;
        };
        points.push((at, RawValue::from(row.get(value_col).unwrap_or_default())));
    }

    debug!(path = %path.display(), rows, skipped, "real_log_read");
    Ok(())
}

/// Device loggers write ISO timestamps; bring them into parser shape
///
/// `2024-03-01T14:05:09.123+01:00` becomes `2024-03-01 14:05:09`.
fn parse_log_timestamp(raw: &str) -> Option<TimePoint> {
    let raw = raw.trim();
    if let Ok(at) = parse_time_point(raw) {
        return Some(at);
    }

    let head = raw.get(..19).unwrap_or(raw);
    let normalized: String = head
        .char_indices()
        .map(|(i, c)| if i == 10 && c == 'T' { ' ' } else { c })
        .collect();
    parse_time_point(&normalized).ok()
}
