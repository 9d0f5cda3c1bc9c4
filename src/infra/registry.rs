//! Registries of known sensors
//!
//! Two lists: sensors the simulator models, and sensors with a physical
//! reader. Each entry declares a type string used by the classifier.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnownSensor {
    pub name: String,
    /// Declared type, e.g. "Temperature", "Smart Meter", "PIR"
    #[serde(rename = "type")]
    pub kind: String,
}

impl KnownSensor {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { name: name.into(), kind: kind.into() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    simulated: Vec<KnownSensor>,
    readable: Vec<KnownSensor>,
}

impl SensorRegistry {
    pub fn new(simulated: Vec<KnownSensor>, readable: Vec<KnownSensor>) -> Self {
        Self { simulated, readable }
    }

    /// Declared type for `name`, simulated registry first
    pub fn declared_type(&self, name: &str) -> Option<&str> {
        self.simulated
            .iter()
            .chain(&self.readable)
            .find(|s| s.name == name)
            .map(|s| s.kind.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.simulated.is_empty() && self.readable.is_empty()
    }
}
