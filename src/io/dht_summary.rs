//! Latest real temperature from a DHT summary log (`<logs_dir>/dht_<label>.csv`)

use crate::io::csv_log::{self, LoadError};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn summary_path(logs_dir: &Path, label: &str) -> PathBuf {
    logs_dir.join(format!("dht_{label}.csv"))
}

/// Mean of the last `n` valid `temp` readings, rounded half-to-even to 2 decimals
///
/// `None` when the file is missing or unreadable, has no `temp` column,
/// or holds no numeric reading.
pub fn last_real_temperature(logs_dir: &Path, label: &str, n: usize) -> Option<f64> {
    let path = summary_path(logs_dir, label);
    if !path.exists() {
        return None;
    }

    let readings = match valid_temperatures(&path) {
        Ok(readings) => readings,
        Err(e) => {
            debug!(label = %label, error = %e, "dht_summary_unavailable");
            return None;
        }
    };

    let recent = &readings[readings.len().saturating_sub(n)..];
    if recent.is_empty() {
        return None;
    }
    let mean = recent.iter().sum::<f64>() / recent.len() as f64;
    Some((mean * 100.0).round_ties_even() / 100.0)
}

fn valid_temperatures(path: &Path) -> Result<Vec<f64>, LoadError> {
    let (mut reader, headers) = csv_log::open_log(path)?;
    let temp_col = csv_log::require_column(path, &headers, &["temp"])?;

    let mut readings = Vec::new();
    for row in csv_log::rows(path, &mut reader) {
        let parsed = row?.get(temp_col).and_then(|v| v.trim().parse::<f64>().ok());
        readings.extend(parsed.filter(|v| !v.is_nan()));
    }
    Ok(readings)
}
