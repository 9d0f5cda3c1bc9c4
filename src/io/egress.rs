//! Plot egress - writes reconciled sensor plots to file
//!
//! Plots are written in JSONL format (one JSON object per line) for the
//! chart front end to pick up.

use crate::domain::types::{SensorCategory, SensorPlot};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info};

/// One ready-to-plot sensor
#[derive(Debug, Serialize)]
pub struct PlotPayload<'a> {
    pub sensor: &'a str,
    pub category: SensorCategory,
    pub y_label: &'a str,
    /// Date shared by both series (`YYYY-MM-DD`), absent when nothing to plot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_day: Option<String>,
    pub no_data: bool,
    /// Step-plot hint for 0/1 series
    pub binary: bool,
    pub simulated: Vec<(String, f64)>,
    pub real: Vec<(String, f64)>,
}

impl<'a> PlotPayload<'a> {
    pub fn new(sensor: &'a str, category: SensorCategory, plot: &SensorPlot) -> Self {
        let no_data = plot.is_no_data();
        match plot {
            SensorPlot::Dual(pair) => Self {
                sensor,
                category,
                y_label: pair.y_axis_label,
                reference_day: (!no_data).then(|| pair.reference_day.to_string()),
                no_data,
                binary: false,
                simulated: pair.simulated.to_points(),
                real: pair.real.to_points(),
            },
            SensorPlot::Single(single) => Self {
                sensor,
                category,
                y_label: single.y_axis_label,
                reference_day: single.series.first_day().map(|d| d.to_string()),
                no_data,
                binary: single.binary,
                simulated: single.series.to_points(),
                real: Vec::new(),
            },
        }
    }
}

/// Egress writer for plots
pub struct Egress {
    file_path: String,
}

impl Egress {
    pub fn new(file_path: &str) -> Self {
        info!(file_path = %file_path, "egress_initialized");
        Self { file_path: file_path.to_string() }
    }

    /// Write a plot to the egress file
    /// Returns true if successful, false otherwise
    pub fn write_plot(&self, payload: &PlotPayload<'_>) -> bool {
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(e) => {
                error!(sensor = %payload.sensor, error = %e, "plot_serialize_failed");
                return false;
            }
        };

        match self.append_line(&json) {
            Ok(()) => {
                info!(
                    sensor = %payload.sensor,
                    category = %payload.category.as_str(),
                    simulated = payload.simulated.len(),
                    real = payload.real.len(),
                    "plot_egressed"
                );
                true
            }
            Err(e) => {
                error!(sensor = %payload.sensor, error = %e, "plot_egress_failed");
                false
            }
        }
    }

    /// Append a line to the egress file
    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let path = Path::new(&self.file_path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        writeln!(file, "{}", line)?;
        debug!(file = %self.file_path, bytes = %line.len(), "egress_written");

        Ok(())
    }
}
