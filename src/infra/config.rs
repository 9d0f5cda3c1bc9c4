//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use crate::infra::registry::{KnownSensor, SensorRegistry};
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Root of real-device logs and interaction-log run directories
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    /// JSON file mapping sensor names to device bindings
    #[serde(default = "default_sensor_map")]
    pub sensor_map: String,
    /// File name of the interaction log inside each run directory
    #[serde(default = "default_interactions_file")]
    pub interactions_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            sensor_map: default_sensor_map(),
            interactions_file: default_interactions_file(),
        }
    }
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

fn default_sensor_map() -> String {
    "sensor_map.json".to_string()
}

fn default_interactions_file() -> String {
    "interactions.csv".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    /// Number of trailing DHT readings averaged by the summary
    #[serde(default = "default_recent_readings")]
    pub recent_readings: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self { recent_readings: default_recent_readings() }
    }
}

fn default_recent_readings() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct EgressConfig {
    /// File path for plot egress (JSONL format)
    #[serde(default = "default_egress_file")]
    pub file: String,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self { file: default_egress_file() }
    }
}

fn default_egress_file() -> String {
    "plots.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegistryConfig {
    /// Sensors known to the simulator
    #[serde(default)]
    pub simulated: Vec<KnownSensor>,
    /// Sensors with a physical reader
    #[serde(default)]
    pub readable: Vec<KnownSensor>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub egress: EgressConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    logs_dir: PathBuf,
    sensor_map: PathBuf,
    interactions_file: String,
    recent_readings: usize,
    egress_file: String,
    registry: SensorRegistry,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from(default_logs_dir()),
            sensor_map: PathBuf::from(default_sensor_map()),
            interactions_file: default_interactions_file(),
            recent_readings: default_recent_readings(),
            egress_file: default_egress_file(),
            registry: SensorRegistry::default(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Determine config file path from args or environment
    pub fn resolve_config_path(args: &[String]) -> String {
        // Check for --config argument
        for (i, arg) in args.iter().enumerate() {
            if arg == "--config" {
                if let Some(path) = args.get(i + 1) {
                    return path.clone();
                }
            }
            if let Some(path) = arg.strip_prefix("--config=") {
                return path.to_string();
            }
        }

        // Check CONFIG_FILE environment variable
        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        "config/dev.toml".to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            logs_dir: PathBuf::from(toml_config.paths.logs_dir),
            sensor_map: PathBuf::from(toml_config.paths.sensor_map),
            interactions_file: toml_config.paths.interactions_file,
            recent_readings: toml_config.summary.recent_readings,
            egress_file: toml_config.egress.file,
            registry: SensorRegistry::new(
                toml_config.registry.simulated,
                toml_config.registry.readable,
            ),
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration from a path, falling back to defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load(args: &[String]) -> Self {
        Self::load_from_path(Self::resolve_config_path(args))
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn sensor_map(&self) -> &Path {
        &self.sensor_map
    }

    pub fn interactions_file(&self) -> &str {
        &self.interactions_file
    }

    pub fn recent_readings(&self) -> usize {
        self.recent_readings
    }

    pub fn egress_file(&self) -> &str {
        &self.egress_file
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method to point every log lookup at another directory
    pub fn with_logs_dir(mut self, logs_dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = logs_dir.into();
        self
    }

    /// Builder method to use another binding file
    pub fn with_sensor_map(mut self, sensor_map: impl Into<PathBuf>) -> Self {
        self.sensor_map = sensor_map.into();
        self
    }

    /// Builder method to replace the sensor registries
    pub fn with_registry(mut self, registry: SensorRegistry) -> Self {
        self.registry = registry;
        self
    }
}
