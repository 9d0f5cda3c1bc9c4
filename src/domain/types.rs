//! Shared types for sensor reconciliation

use crate::domain::time::{format_time_point, TimePoint};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Raw reading value as handed over by the simulator or a log reader
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Missing,
    Flag(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Numeric coercion; `None` means the reading is missing
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawValue::Missing => return None,
            RawValue::Flag(flag) => f64::from(u8::from(*flag)),
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (!value.is_nan()).then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Number)
    }
}

/// Ordered, deduplicated numeric series keyed by [`TimePoint`]
///
/// Series produced by [`crate::domain::series::build_series`] sit on a
/// 1-minute grid with no gaps between the first and last key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    points: BTreeMap<TimePoint, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point, replacing any value already stored at `at`
    pub fn insert(&mut self, at: TimePoint, value: f64) {
        self.points.insert(at, value);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn get(&self, at: &TimePoint) -> Option<f64> {
        self.points.get(at).copied()
    }

    pub fn first(&self) -> Option<(TimePoint, f64)> {
        self.points.first_key_value().map(|(k, v)| (*k, *v))
    }

    pub fn last(&self) -> Option<(TimePoint, f64)> {
        self.points.last_key_value().map(|(k, v)| (*k, *v))
    }

    /// Calendar date of the first key
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.first().map(|(at, _)| at.date())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimePoint, f64)> + '_ {
        self.points.iter().map(|(k, v)| (*k, *v))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.values().copied()
    }

    /// True when every value is 0 or 1
    pub fn is_binary(&self) -> bool {
        self.values().all(|v| v == 0.0 || v == 1.0)
    }

    /// Points as `[timestamp, value]` pairs for JSON output
    pub fn to_points(&self) -> Vec<(String, f64)> {
        self.iter().map(|(at, v)| (format_time_point(&at), v)).collect()
    }
}

impl FromIterator<(TimePoint, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (TimePoint, f64)>>(iter: I) -> Self {
        Self { points: iter.into_iter().collect() }
    }
}

/// How a logical sensor maps to a physical data source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SensorBinding {
    #[default]
    None,
    /// Smart meter reachable at an IP address
    Ip(String),
    /// DHT sensor on a GPIO pin, logged under `label`
    Gpio { label: String, pin: i64 },
}

impl SensorBinding {
    pub fn as_str(&self) -> &str {
        match self {
            SensorBinding::None => "none",
            SensorBinding::Ip(_) => "ip",
            SensorBinding::Gpio { .. } => "dht",
        }
    }
}

/// Semantic category of a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorCategory {
    Temperature,
    Power,
    Binary,
    Unknown,
}

impl std::str::FromStr for SensorCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "temperature" => SensorCategory::Temperature,
            "smart meter" | "smartmeter" | "power" | "energy" => SensorCategory::Power,
            "pir" | "switch" | "binary" | "motion" | "contact" => SensorCategory::Binary,
            _ => SensorCategory::Unknown,
        })
    }
}

impl SensorCategory {
    pub fn as_str(&self) -> &str {
        match self {
            SensorCategory::Temperature => "temperature",
            SensorCategory::Power => "power",
            SensorCategory::Binary => "binary",
            SensorCategory::Unknown => "unknown",
        }
    }

    /// Y-axis label used when plotting this category
    pub fn y_axis_label(&self) -> &'static str {
        match self {
            SensorCategory::Temperature => "Temperature (°C)",
            SensorCategory::Power => "Power (W)",
            SensorCategory::Binary => "State",
            SensorCategory::Unknown => "Value",
        }
    }
}

/// Per-sensor state record recorded by the simulator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorSnapshot {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub state: Vec<RawValue>,
    /// `Some` whenever the key is present, `"consumption": null` included
    #[serde(default, deserialize_with = "present_key")]
    pub consumption: Option<Vec<RawValue>>,
    /// Explicit type tag, e.g. "Temperature" or "Smart Meter"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

fn present_key<'de, D>(deserializer: D) -> Result<Option<Vec<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::<Vec<RawValue>>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Simulated and real series for one sensor on a shared reference day
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledPair {
    pub simulated: TimeSeries,
    pub real: TimeSeries,
    pub reference_day: NaiveDate,
    pub y_axis_label: &'static str,
}

impl ReconciledPair {
    /// Neither source produced any data; the caller renders a placeholder
    pub fn is_no_data(&self) -> bool {
        self.simulated.is_empty() && self.real.is_empty()
    }
}

/// Simulated-only series for sensors outside the dual paths
#[derive(Debug, Clone, PartialEq)]
pub struct SingleSeries {
    pub series: TimeSeries,
    pub y_axis_label: &'static str,
    /// All values are 0/1, render as a step plot
    pub binary: bool,
}

/// Ready-to-plot result for one sensor
#[derive(Debug, Clone, PartialEq)]
pub enum SensorPlot {
    Dual(ReconciledPair),
    Single(SingleSeries),
}

impl SensorPlot {
    pub fn y_axis_label(&self) -> &'static str {
        match self {
            SensorPlot::Dual(pair) => pair.y_axis_label,
            SensorPlot::Single(single) => single.y_axis_label,
        }
    }

    pub fn is_no_data(&self) -> bool {
        match self {
            SensorPlot::Dual(pair) => pair.is_no_data(),
            SensorPlot::Single(single) => single.series.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_coercion() {
        assert_eq!(RawValue::Number(21.5).as_number(), Some(21.5));
        assert_eq!(RawValue::from(" 7.25 ").as_number(), Some(7.25));
        assert_eq!(RawValue::Flag(true).as_number(), Some(1.0));
        assert_eq!(RawValue::Flag(false).as_number(), Some(0.0));
        assert_eq!(RawValue::from("on").as_number(), None);
        assert_eq!(RawValue::from("NaN").as_number(), None);
        assert_eq!(RawValue::Missing.as_number(), None);
    }

    #[test]
    fn test_raw_value_deserialize_untagged() {
        let values: Vec<RawValue> =
            serde_json::from_str(r#"[1.5, "2", null, true, "off"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                RawValue::Number(1.5),
                RawValue::Text("2".to_string()),
                RawValue::Missing,
                RawValue::Flag(true),
                RawValue::Text("off".to_string()),
            ]
        );
    }

    #[test]
    fn test_sensor_category_from_str() {
        assert_eq!("Temperature".parse::<SensorCategory>().unwrap(), SensorCategory::Temperature);
        assert_eq!("Smart Meter".parse::<SensorCategory>().unwrap(), SensorCategory::Power);
        assert_eq!("PIR".parse::<SensorCategory>().unwrap(), SensorCategory::Binary);
        assert_eq!("Switch".parse::<SensorCategory>().unwrap(), SensorCategory::Binary);
        assert_eq!("Humidity".parse::<SensorCategory>().unwrap(), SensorCategory::Unknown);
    }

    #[test]
    fn test_snapshot_deserialize() {
        let snapshot: SensorSnapshot = serde_json::from_str(
            r#"{"time": ["10:00"], "state": [0], "consumption": [120.0], "type": "Smart Meter"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.time, vec!["10:00"]);
        assert_eq!(snapshot.kind.as_deref(), Some("Smart Meter"));
        assert_eq!(snapshot.consumption, Some(vec![RawValue::Number(120.0)]));

        let bare: SensorSnapshot = serde_json::from_str("{}").unwrap();
        assert!(bare.time.is_empty());
        assert!(bare.consumption.is_none());
    }

    #[test]
    fn test_snapshot_null_consumption_is_present() {
        let snapshot: SensorSnapshot =
            serde_json::from_str(r#"{"time": [], "state": [], "consumption": null}"#).unwrap();
        assert_eq!(snapshot.consumption, Some(Vec::new()));
    }
}
