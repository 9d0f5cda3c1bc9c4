//! Infrastructure - configuration and sensor registries
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults)
//! - `registry` - Known-sensor registries used for classification

pub mod config;
pub mod registry;

// Re-export commonly used types
pub use config::Config;
pub use registry::{KnownSensor, SensorRegistry};
