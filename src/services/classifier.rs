//! Sensor category resolution
//!
//! Priority:
//! 1. explicit `type` tag on the sensor's snapshot
//! 2. declared type in the simulated, then readable, registry
//! 3. a `consumption` key on the snapshot (even `null`) means a smart meter
//! 4. unknown

use crate::domain::types::{SensorCategory, SensorSnapshot};
use crate::infra::registry::SensorRegistry;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SensorTypeClassifier {
    registry: SensorRegistry,
}

impl SensorTypeClassifier {
    pub fn new(registry: SensorRegistry) -> Self {
        Self { registry }
    }

    pub fn classify(&self, name: &str, states: &HashMap<String, SensorSnapshot>) -> SensorCategory {
        let snapshot = states.get(name);

        let tag = snapshot.and_then(|s| s.kind.as_deref()).filter(|t| !t.is_empty());
        let (category, source) = if let Some(tag) = tag {
            (parse_category(tag), "tag")
        } else if let Some(declared) = self.registry.declared_type(name) {
            (parse_category(declared), "registry")
        } else if snapshot.is_some_and(|s| s.consumption.is_some()) {
            (SensorCategory::Power, "consumption")
        } else {
            (SensorCategory::Unknown, "none")
        };

        debug!(sensor = %name, category = %category.as_str(), source, "sensor_classified");
        category
    }
}

fn parse_category(tag: &str) -> SensorCategory {
    tag.parse().unwrap_or(SensorCategory::Unknown)
}
