//! Sensor binding file - maps logical sensor names to physical devices
//!
//! File format (JSON object):
//! ```json
//! { "Kitchen Plug": { "by": "ip", "value": "192.168.1.40" },
//!   "Living Room":  { "by": "dht", "gpio": 4 } }
//! ```
//!
//! The file is re-read on every lookup. Any problem with the file or with
//! an entry resolves to [`SensorBinding::None`].

use crate::domain::types::SensorBinding;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub type BindingMap = Map<String, Value>;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} is not a JSON object")]
    NotAnObject { path: PathBuf },
}

/// Read the whole binding file
///
/// A missing file is an empty map, not an error.
pub fn load_bindings(path: &Path) -> Result<BindingMap, BindingError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BindingMap::new()),
        Err(source) => return Err(BindingError::Io { path: path.to_path_buf(), source }),
    };

    let value: Value = serde_json::from_str(&content)
        .map_err(|source| BindingError::Json { path: path.to_path_buf(), source })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(BindingError::NotAnObject { path: path.to_path_buf() }),
    }
}

/// Interpret one mapping entry
pub fn binding_from_entry(name: &str, entry: &Value) -> SensorBinding {
    let Some(entry) = entry.as_object() else {
        return SensorBinding::None;
    };

    match entry.get("by").and_then(Value::as_str) {
        Some("ip") => match entry.get("value").and_then(Value::as_str).map(str::trim) {
            Some(addr) if !addr.is_empty() => SensorBinding::Ip(addr.to_string()),
            _ => SensorBinding::None,
        },
        Some("dht") => match entry.get("gpio").and_then(pin_from_value) {
            Some(pin) => SensorBinding::Gpio { label: name.to_string(), pin },
            None => SensorBinding::None,
        },
        _ => SensorBinding::None,
    }
}

fn pin_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read-through resolver over a binding file
#[derive(Debug, Clone)]
pub struct SensorIdentityResolver {
    path: PathBuf,
}

impl SensorIdentityResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Binding for `name`, re-reading the file on every call
    pub fn resolve(&self, name: &str) -> SensorBinding {
        let bindings = match load_bindings(&self.path) {
            Ok(bindings) => bindings,
            Err(e) => {
                warn!(sensor = %name, error = %e, "sensor_map_unavailable");
                return SensorBinding::None;
            }
        };

        let binding = bindings
            .get(name)
            .map(|entry| binding_from_entry(name, entry))
            .unwrap_or_default();
        debug!(sensor = %name, by = %binding.as_str(), "sensor_binding_resolved");
        binding
    }

    /// IP address of a smart meter bound to `name`
    pub fn ip_for(&self, name: &str) -> Option<String> {
        match self.resolve(name) {
            SensorBinding::Ip(addr) => Some(addr),
            _ => None,
        }
    }

    /// GPIO pin of a DHT sensor bound to `name`
    pub fn gpio_for(&self, name: &str) -> Option<i64> {
        match self.resolve(name) {
            SensorBinding::Gpio { pin, .. } => Some(pin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_ip_binding_trimmed() {
        let entry = json!({"by": "ip", "value": "  10.0.0.7 "});
        assert_eq!(binding_from_entry("plug", &entry), SensorBinding::Ip("10.0.0.7".to_string()));
    }

    #[test]
    fn test_ip_binding_whitespace_is_none() {
        for entry in [
            json!({"by": "ip", "value": "   "}),
            json!({"by": "ip", "value": ""}),
            json!({"by": "ip", "value": 42}),
            json!({"by": "ip"}),
        ] {
            assert_eq!(binding_from_entry("plug", &entry), SensorBinding::None, "{entry}");
        }
    }

    #[test]
    fn test_gpio_binding() {
        let expected = SensorBinding::Gpio { label: "living".to_string(), pin: 4 };
        assert_eq!(binding_from_entry("living", &json!({"by": "dht", "gpio": 4})), expected);
        assert_eq!(binding_from_entry("living", &json!({"by": "dht", "gpio": " 4 "})), expected);
        assert_eq!(binding_from_entry("living", &json!({"by": "dht", "gpio": 4.9})), expected);
    }

    #[test]
    fn test_gpio_binding_not_an_int_is_none() {
        let entry = json!({"by": "dht", "gpio": "not-an-int"});
        assert_eq!(binding_from_entry("living", &entry), SensorBinding::None);
        assert_eq!(binding_from_entry("living", &json!({"by": "dht"})), SensorBinding::None);
        let null_pin = json!({"by": "dht", "gpio": null});
        assert_eq!(binding_from_entry("living", &null_pin), SensorBinding::None);
    }

    #[test]
    fn test_unknown_scheme_and_non_object() {
        let zigbee = json!({"by": "zigbee", "value": "a"});
        assert_eq!(binding_from_entry("x", &zigbee), SensorBinding::None);
        assert_eq!(binding_from_entry("x", &json!("10.0.0.7")), SensorBinding::None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let bindings = load_bindings(&dir.path().join("sensor_map.json")).unwrap();
        assert!(bindings.is_empty());

        let resolver = SensorIdentityResolver::new(dir.path().join("sensor_map.json"));
        assert_eq!(resolver.resolve("plug"), SensorBinding::None);
    }

    #[test]
    fn test_malformed_file_is_error_but_resolves_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sensor_map.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_bindings(&path), Err(BindingError::Json { .. })));
        assert_eq!(SensorIdentityResolver::new(&path).resolve("plug"), SensorBinding::None);

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(load_bindings(&path), Err(BindingError::NotAnObject { .. })));
        assert_eq!(SensorIdentityResolver::new(&path).resolve("plug"), SensorBinding::None);
    }

    #[test]
    fn test_resolver_rereads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sensor_map.json");
        let resolver = SensorIdentityResolver::new(&path);

        fs::write(&path, r#"{"plug": {"by": "ip", "value": "10.0.0.7"}}"#).unwrap();
        assert_eq!(resolver.ip_for("plug").as_deref(), Some("10.0.0.7"));

        fs::write(
            &path,
            r#"{"plug": {"by": "ip", "value": "10.0.0.8"}, "living": {"by": "dht", "gpio": 17}}"#,
        )
        .unwrap();
        assert_eq!(resolver.ip_for("plug").as_deref(), Some("10.0.0.8"));
        assert_eq!(resolver.gpio_for("living"), Some(17));
        assert_eq!(resolver.gpio_for("plug"), None);
        assert_eq!(resolver.ip_for("missing"), None);
    }
}
