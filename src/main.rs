//! Sensor graph - simulated vs real sensor plots for home automation
//!
//! Reads the simulator's sensor-state snapshot, reconciles each selected
//! sensor against the real device logs and appends ready-to-plot payloads
//! to a JSONL file for the chart front end.
//!
//! Module structure:
//! - `domain/` - Time points, series building, plot types
//! - `io/` - Binding file, interaction log, device logs, egress
//! - `services/` - Classification and reconciliation
//! - `infra/` - Config and sensor registries

use anyhow::Context;
use clap::{Parser, Subcommand};
use sensor_graph::domain::SensorSnapshot;
use sensor_graph::infra::Config;
use sensor_graph::io::dht_summary::last_real_temperature;
use sensor_graph::io::{Egress, PlotPayload};
use sensor_graph::services::DualSeriesReconciler;
use std::collections::HashMap;
use std::fs;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Sensor graph - reconcile simulated and real sensor readings
#[derive(Parser, Debug)]
#[command(name = "sensor-graph", version, about)]
struct Args {
    /// Path to TOML configuration file (default: $CONFIG_FILE or config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile sensors and write plot payloads
    Plot {
        /// JSON snapshot of sensor states (name → {time, state, consumption, type})
        #[arg(short, long)]
        states: String,

        /// Sensors to plot (repeatable); all sensors in the snapshot when omitted
        #[arg(long = "sensor")]
        sensors: Vec<String>,

        /// Output JSONL file, overrides egress.file from config
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Mean of the latest real DHT readings for a label
    DhtSummary {
        #[arg(short, long)]
        label: String,

        /// Number of trailing readings to average
        #[arg(short)]
        n: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), git = env!("GIT_HASH"), "sensor_graph_starting");

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(|| Config::resolve_config_path(&[]));
    let config = Config::load_from_path(&config_path);

    info!(
        config_file = %config.config_file(),
        logs_dir = %config.logs_dir().display(),
        sensor_map = %config.sensor_map().display(),
        "config_loaded"
    );

    match args.command {
        Command::Plot { states, sensors, out } => plot(&config, &states, sensors, out),
        Command::DhtSummary { label, n } => {
            let n = n.unwrap_or_else(|| config.recent_readings());
            match last_real_temperature(config.logs_dir(), &label, n) {
                Some(temp) => println!("{temp:.2}"),
                None => println!("unavailable"),
            }
            Ok(())
        }
    }
}

fn plot(
    config: &Config,
    states_path: &str,
    mut selected: Vec<String>,
    out: Option<String>,
) -> anyhow::Result<()> {
    let content = fs::read_to_string(states_path)
        .with_context(|| format!("Failed to read sensor states {states_path}"))?;
    let states: HashMap<String, SensorSnapshot> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse sensor states {states_path}"))?;

    if selected.is_empty() {
        selected = states.keys().cloned().collect();
        selected.sort();
    }

    let reconciler = DualSeriesReconciler::new(config);
    let egress = Egress::new(out.as_deref().unwrap_or(config.egress_file()));

    let mut written = 0usize;
    let mut failed = 0usize;
    for name in &selected {
        if !states.contains_key(name) {
            warn!(sensor = %name, "sensor_not_in_snapshot");
            continue;
        }

        let category = reconciler.classify(name, &states);
        match reconciler.reconcile_as(name, category, &states) {
            Ok(plot) => {
                if egress.write_plot(&PlotPayload::new(name, category, &plot)) {
                    written += 1;
                } else {
                    failed += 1;
                }
            }
            Err(e) => {
                error!(sensor = %name, error = %e, "reconcile_failed");
                failed += 1;
            }
        }
    }

    info!(selected = selected.len(), written, failed, "plot_run_complete");
    Ok(())
}
