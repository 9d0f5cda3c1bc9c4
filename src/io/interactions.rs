//! Interaction log - simulated sensor values recorded per run
//!
//! Each simulator run writes `<logs_root>/<run>/interactions.csv` with at
//! least `event_type`, `name`, `timestamp_sim` and `value` columns. The
//! newest run (by file modification time) is the one consulted.

use crate::domain::types::RawValue;
use crate::io::csv_log::{self, LoadError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SENSOR_EVENT: &str = "sensor";

/// Most recently modified `<logs_root>/*/<file_name>`
pub fn latest_interactions_csv(logs_root: &Path, file_name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(logs_root).ok()?;

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let csv_path = entry.path().join(file_name);
            let modified = fs::metadata(&csv_path).ok().filter(|m| m.is_file())?.modified().ok()?;
            Some((modified, csv_path))
        })
        .max_by(|(a, a_path), (b, b_path)| a.cmp(b).then_with(|| a_path.cmp(b_path)))
        .map(|(_, path)| path)
}

/// Simulated timestamp → value map for one sensor, in first-seen key order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionLog {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl ConsumptionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; a repeated key keeps its position and takes the new value
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value for a simulated time string
    ///
    /// A 5-character `HH:MM` string matches the first key ending in
    /// `" HH:MM"`; a key that carries seconds (`"... HH:MM:SS"`) does not
    /// match. Any other string must equal a key exactly.
    pub fn lookup(&self, time: &str) -> Option<f64> {
        if time.chars().count() == 5 {
            let suffix = format!(" {time}");
            self.entries.iter().find(|(key, _)| key.ends_with(&suffix)).map(|(_, v)| *v)
        } else {
            self.get(time)
        }
    }

    /// One raw value per simulated time, missing where nothing matched
    pub fn map_times<S: AsRef<str>>(&self, times: &[S]) -> Vec<RawValue> {
        times.iter().map(|t| self.lookup(t.as_ref()).into()).collect()
    }
}

/// Collect `sensor` events for `sensor_name` from an interaction log
pub fn load_consumption(path: &Path, sensor_name: &str) -> Result<ConsumptionLog, LoadError> {
    let (mut reader, headers) = csv_log::open_log(path)?;
    let event_col = csv_log::require_column(path, &headers, &["event_type"])?;
    let name_col = csv_log::require_column(path, &headers, &["name"])?;
    let ts_col = csv_log::require_column(path, &headers, &["timestamp_sim"])?;
    let value_col = csv_log::require_column(path, &headers, &["value"])?;

    let mut log = ConsumptionLog::new();
    for row in csv_log::rows(path, &mut reader) {
        let row = row?;
        if row.get(event_col) != Some(SENSOR_EVENT) || row.get(name_col) != Some(sensor_name) {
            continue;
        }
        let ts = row.get(ts_col).unwrap_or_default();
        if let Some(value) = row.get(value_col).and_then(|v| v.trim().parse::<f64>().ok()) {
            log.insert(ts, value);
        }
    }

    debug!(
        path = %path.display(),
        sensor = %sensor_name,
        entries = log.len(),
        "consumption_loaded"
    );
    Ok(log)
}
