//! IO modules - on-disk data sources and outputs
//!
//! This module contains all file-system IO:
//! - `sensor_map` - sensor binding file (name → IP / DHT pin)
//! - `interactions` - simulated values from the latest interaction log
//! - `real_logs` - real-device CSV loaders (DHT temperature, smart meter power)
//! - `dht_summary` - mean of the latest DHT readings
//! - `egress` - plot output to file (JSONL format)
//! - `csv_log` - shared CSV helpers and `LoadError`

pub mod csv_log;
pub mod dht_summary;
pub mod egress;
pub mod interactions;
pub mod real_logs;
pub mod sensor_map;

// Re-export commonly used types
pub use csv_log::LoadError;
pub use egress::{Egress, PlotPayload};
pub use interactions::{latest_interactions_csv, load_consumption, ConsumptionLog};
pub use real_logs::{PowerLogLoader, RealDataLoader, TemperatureLogLoader};
pub use sensor_map::{BindingError, SensorIdentityResolver};
