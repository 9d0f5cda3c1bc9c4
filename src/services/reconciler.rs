//! Dual-series reconciliation - simulated vs real data on one time axis
//!
//! For temperature and power sensors the simulated series and the real
//! device series are built independently, then the real one is re-based
//! onto the simulated series' calendar day (the reference day). Every
//! failure while fetching real data, or the interaction-log fallback,
//! degrades to an empty series. Only malformed simulated timestamps
//! propagate.

use crate::domain::series::{align_to_day, build_series, SeriesError};
use crate::domain::time::time_only_date;
use crate::domain::types::{
    RawValue, ReconciledPair, SensorBinding, SensorCategory, SensorPlot, SensorSnapshot,
    SingleSeries, TimeSeries,
};
use crate::infra::config::Config;
use crate::io::interactions::{latest_interactions_csv, load_consumption};
use crate::io::real_logs::{PowerLogLoader, RealDataLoader, TemperatureLogLoader};
use crate::io::sensor_map::SensorIdentityResolver;
use crate::services::classifier::SensorTypeClassifier;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct DualSeriesReconciler {
    logs_dir: PathBuf,
    interactions_file: String,
    resolver: SensorIdentityResolver,
    classifier: SensorTypeClassifier,
    temperature_loader: Box<dyn RealDataLoader>,
    power_loader: Box<dyn RealDataLoader>,
}

impl DualSeriesReconciler {
    pub fn new(config: &Config) -> Self {
        Self::with_loaders(config, Box::new(TemperatureLogLoader), Box::new(PowerLogLoader))
    }

    /// Reconciler with custom real-data loaders
    pub fn with_loaders(
        config: &Config,
        temperature_loader: Box<dyn RealDataLoader>,
        power_loader: Box<dyn RealDataLoader>,
    ) -> Self {
        Self {
            logs_dir: config.logs_dir().to_path_buf(),
            interactions_file: config.interactions_file().to_string(),
            resolver: SensorIdentityResolver::new(config.sensor_map()),
            classifier: SensorTypeClassifier::new(config.registry().clone()),
            temperature_loader,
            power_loader,
        }
    }

    pub fn classify(&self, name: &str, states: &HashMap<String, SensorSnapshot>) -> SensorCategory {
        self.classifier.classify(name, states)
    }

    /// Classify `name` and build its plot from the matching path
    pub fn reconcile(
        &self,
        name: &str,
        states: &HashMap<String, SensorSnapshot>,
    ) -> Result<SensorPlot, SeriesError> {
        let category = self.classify(name, states);
        self.reconcile_as(name, category, states)
    }

    /// Build the plot for an already classified sensor
    pub fn reconcile_as(
        &self,
        name: &str,
        category: SensorCategory,
        states: &HashMap<String, SensorSnapshot>,
    ) -> Result<SensorPlot, SeriesError> {
        let empty = SensorSnapshot::default();
        let snapshot = states.get(name).unwrap_or(&empty);

        let plot = match category {
            SensorCategory::Temperature => {
                SensorPlot::Dual(self.reconcile_temperature(name, snapshot)?)
            }
            SensorCategory::Power => SensorPlot::Dual(self.reconcile_power(name, snapshot)?),
            SensorCategory::Binary | SensorCategory::Unknown => {
                SensorPlot::Single(single_series(category, snapshot)?)
            }
        };

        if plot.is_no_data() {
            info!(sensor = %name, category = %category.as_str(), "reconcile_no_data");
        }
        Ok(plot)
    }

    /// Simulated `state` readings against the sensor's DHT log
    pub fn reconcile_temperature(
        &self,
        name: &str,
        snapshot: &SensorSnapshot,
    ) -> Result<ReconciledPair, SeriesError> {
        let simulated = if snapshot.time.is_empty() || snapshot.state.is_empty() {
            TimeSeries::new()
        } else {
            build_series(&snapshot.time, &snapshot.state)?
        };

        let label = match self.resolver.resolve(name) {
            SensorBinding::Gpio { label, pin } => {
                debug!(sensor = %name, pin, "dht_binding");
                label
            }
            _ => name.to_string(),
        };
        let real = self.load_real(self.temperature_loader.as_ref(), name, &label);

        Ok(self.pair(name, simulated, real, SensorCategory::Temperature))
    }

    /// Simulated consumption against the smart meter bound by IP
    pub fn reconcile_power(
        &self,
        name: &str,
        snapshot: &SensorSnapshot,
    ) -> Result<ReconciledPair, SeriesError> {
        let mut consumption = snapshot.consumption.clone().unwrap_or_default();
        if consumption.is_empty() {
            consumption = self.consumption_from_interactions(name, &snapshot.time);
        }

        let simulated = if consumption.is_empty() || snapshot.time.is_empty() {
            TimeSeries::new()
        } else {
            build_series(&snapshot.time, &align_len(consumption, snapshot.time.len()))?
        };

        let real = match self.resolver.ip_for(name) {
            Some(ip) => self.load_real(self.power_loader.as_ref(), name, &ip),
            None => {
                debug!(sensor = %name, "no_ip_binding");
                TimeSeries::new()
            }
        };

        Ok(self.pair(name, simulated, real, SensorCategory::Power))
    }

    /// Values for `times` recovered from the newest interaction log
    fn consumption_from_interactions(&self, name: &str, times: &[String]) -> Vec<RawValue> {
        let Some(path) = latest_interactions_csv(&self.logs_dir, &self.interactions_file) else {
            debug!(sensor = %name, logs_dir = %self.logs_dir.display(), "no_interaction_log");
            return Vec::new();
        };

        match load_consumption(&path, name) {
            Ok(log) if log.is_empty() => Vec::new(),
            Ok(log) => log.map_times(times),
            Err(e) => {
                warn!(sensor = %name, error = %e, "interaction_log_unavailable");
                Vec::new()
            }
        }
    }

    fn load_real(&self, loader: &dyn RealDataLoader, name: &str, key: &str) -> TimeSeries {
        match loader.load(key, &self.logs_dir) {
            Ok(series) => series,
            Err(e) => {
                warn!(sensor = %name, key = %key, error = %e, "real_data_unavailable");
                TimeSeries::new()
            }
        }
    }

    fn pair(
        &self,
        name: &str,
        simulated: TimeSeries,
        real: TimeSeries,
        category: SensorCategory,
    ) -> ReconciledPair {
        let pair = align_pair(simulated, real, category.y_axis_label());
        debug!(
            sensor = %name,
            category = %category.as_str(),
            simulated = pair.simulated.len(),
            real = pair.real.len(),
            reference_day = %pair.reference_day,
            "sensor_reconciled"
        );
        pair
    }
}

/// Put `real` on the simulated series' day (1900-01-01 without simulated data)
pub fn align_pair(
    simulated: TimeSeries,
    real: TimeSeries,
    y_axis_label: &'static str,
) -> ReconciledPair {
    let reference_day = simulated.first_day().unwrap_or_else(time_only_date);
    let real = if real.is_empty() { real } else { align_to_day(&real, reference_day) };
    ReconciledPair { simulated, real, reference_day, y_axis_label }
}

/// Generic single-series plot from the raw `state` readings
pub fn single_series(
    category: SensorCategory,
    snapshot: &SensorSnapshot,
) -> Result<SingleSeries, SeriesError> {
    let series = if snapshot.state.is_empty() {
        TimeSeries::new()
    } else {
        build_series(&snapshot.time, &snapshot.state)?
    };
    let binary = !series.is_empty() && series.is_binary();
    Ok(SingleSeries { series, y_axis_label: category.y_axis_label(), binary })
}

/// Pad with missing values or truncate to `len`
fn align_len(mut values: Vec<RawValue>, len: usize) -> Vec<RawValue> {
    values.resize(len, RawValue::Missing);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_time_point;
    use crate::io::csv_log::LoadError;
    use chrono::NaiveDate;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    struct FixedLoader(TimeSeries);

    impl RealDataLoader for FixedLoader {
        fn load(&self, _key: &str, _logs_dir: &Path) -> Result<TimeSeries, LoadError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLoader;

    impl RealDataLoader for FailingLoader {
        fn load(&self, key: &str, logs_dir: &Path) -> Result<TimeSeries, LoadError> {
            Err(LoadError::MissingColumn {
                path: logs_dir.join(format!("{key}.csv")),
                expected: vec!["temp"],
            })
        }
    }

    fn at(s: &str) -> chrono::NaiveDateTime {
        parse_time_point(s).unwrap()
    }

    fn config_in(dir: &TempDir) -> Config {
        Config::default()
            .with_logs_dir(dir.path().join("logs"))
            .with_sensor_map(dir.path().join("sensor_map.json"))
    }

    fn snapshot(time: &[&str], state: &[f64]) -> SensorSnapshot {
        SensorSnapshot {
            time: time.iter().map(|t| t.to_string()).collect(),
            state: state.iter().copied().map(RawValue::from).collect(),
            ..Default::default()
        }
    }

    fn real_series(points: &[(&str, f64)]) -> TimeSeries {
        points.iter().map(|(t, v)| (at(t), *v)).collect()
    }

    #[test]
    fn test_temperature_real_rebased_to_simulated_day() {
        let dir = tempdir().unwrap();
        let real = real_series(&[("2023-11-20 10:01", 19.5)]);
        let reconciler = DualSeriesReconciler::with_loaders(
            &config_in(&dir),
            Box::new(FixedLoader(real)),
            Box::new(FailingLoader),
        );

        let sim = snapshot(&["2024-03-01 10:00", "2024-03-01 10:02"], &[20.0, 21.0]);
        let pair = reconciler.reconcile_temperature("living", &sim).unwrap();

        assert_eq!(pair.reference_day, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(pair.simulated.len(), 3);
        assert_eq!(pair.real.iter().collect::<Vec<_>>(), vec![(at("2024-03-01 10:01"), 19.5)]);
        assert_eq!(pair.y_axis_label, "Temperature (°C)");
    }

    #[test]
    fn test_temperature_real_only_uses_placeholder_day() {
        let dir = tempdir().unwrap();
        let real = real_series(&[("2023-11-20 10:01", 19.5)]);
        let reconciler = DualSeriesReconciler::with_loaders(
            &config_in(&dir),
            Box::new(FixedLoader(real)),
            Box::new(FailingLoader),
        );

        let pair = reconciler.reconcile_temperature("living", &SensorSnapshot::default()).unwrap();
        assert!(pair.simulated.is_empty());
        assert_eq!(pair.reference_day, time_only_date());
        assert_eq!(pair.real.first(), Some((at("10:01"), 19.5)));
        assert!(!pair.is_no_data());
    }

    #[test]
    fn test_loader_failure_keeps_simulated() {
        let dir = tempdir().unwrap();
        let reconciler = DualSeriesReconciler::with_loaders(
            &config_in(&dir),
            Box::new(FailingLoader),
            Box::new(FailingLoader),
        );

        let sim = snapshot(&["10:00"], &[20.0]);
        let pair = reconciler.reconcile_temperature("living", &sim).unwrap();
        assert_eq!(pair.simulated.len(), 1);
        assert!(pair.real.is_empty());
    }

    #[test]
    fn test_no_data_sentinels() {
        let dir = tempdir().unwrap();
        let reconciler = DualSeriesReconciler::new(&config_in(&dir));

        let temp = reconciler.reconcile_temperature("living", &SensorSnapshot::default()).unwrap();
        assert!(temp.is_no_data());
        assert_eq!(temp.y_axis_label, "Temperature (°C)");

        let power = reconciler.reconcile_power("plug", &SensorSnapshot::default()).unwrap();
        assert!(power.is_no_data());
        assert_eq!(power.y_axis_label, "Power (W)");
    }

    #[test]
    fn test_bad_simulated_timestamp_propagates() {
        let dir = tempdir().unwrap();
        let reconciler = DualSeriesReconciler::new(&config_in(&dir));
        let result = reconciler.reconcile_temperature("living", &snapshot(&["soon"], &[1.0]));
        assert!(matches!(result, Err(SeriesError::Timestamp(_))));
    }

    #[test]
    fn test_power_inline_consumption_padded() {
        let dir = tempdir().unwrap();
        let reconciler = DualSeriesReconciler::new(&config_in(&dir));

        let mut sim = snapshot(&["2024-03-01 09:00", "2024-03-01 09:01", "2024-03-01 09:02"], &[]);
        sim.consumption = Some(vec![RawValue::Number(100.0), RawValue::Number(150.0)]);

        let pair = reconciler.reconcile_power("plug", &sim).unwrap();
        // third slot has no consumption value and is dropped
        assert_eq!(
            pair.simulated.iter().collect::<Vec<_>>(),
            vec![(at("2024-03-01 09:00"), 100.0), (at("2024-03-01 09:01"), 150.0)]
        );
        assert!(pair.real.is_empty());
    }

    #[test]
    fn test_power_consumption_truncated() {
        let dir = tempdir().unwrap();
        let reconciler = DualSeriesReconciler::new(&config_in(&dir));

        let mut sim = snapshot(&["09:00"], &[]);
        sim.consumption = Some(vec![RawValue::Number(100.0), RawValue::Number(150.0)]);

        let pair = reconciler.reconcile_power("plug", &sim).unwrap();
        assert_eq!(pair.simulated.len(), 1);
        assert_eq!(pair.simulated.get(&at("09:00")), Some(100.0));
    }

    #[test]
    fn test_power_falls_back_to_interaction_log() {
        let dir = tempdir().unwrap();
        let run = dir.path().join("logs").join("run_1");
        fs::create_dir_all(&run).unwrap();
        fs::write(
            run.join("interactions.csv"),
            "event_type,name,timestamp_sim,value\n\
             sensor,plug,2024-03-01 09:00,100\n\
             sensor,plug,2024-03-01 09:02:00,300\n",
        )
        .unwrap();

        let reconciler = DualSeriesReconciler::new(&config_in(&dir));
        // "09:02" misses the key carrying seconds
        let sim = snapshot(&["09:00", "09:02"], &[]);
        let pair = reconciler.reconcile_power("plug", &sim).unwrap();

        assert_eq!(pair.simulated.iter().collect::<Vec<_>>(), vec![(at("09:00"), 100.0)]);
        assert_eq!(pair.reference_day, time_only_date());
    }

    #[test]
    fn test_power_real_requires_ip_binding() {
        let dir = tempdir().unwrap();
        let real = real_series(&[("2023-11-20 09:00", 250.0)]);
        let config = config_in(&dir);
        let reconciler = DualSeriesReconciler::with_loaders(
            &config,
            Box::new(FailingLoader),
            Box::new(FixedLoader(real)),
        );

        let mut sim = snapshot(&["2024-03-01 09:00"], &[]);
        sim.consumption = Some(vec![RawValue::Number(100.0)]);

        let unbound = reconciler.reconcile_power("plug", &sim).unwrap();
        assert!(unbound.real.is_empty());

        fs::write(config.sensor_map(), r#"{"plug": {"by": "ip", "value": "10.0.0.7"}}"#).unwrap();
        let bound = reconciler.reconcile_power("plug", &sim).unwrap();
        assert_eq!(bound.real.iter().collect::<Vec<_>>(), vec![(at("2024-03-01 09:00"), 250.0)]);
    }

    #[test]
    fn test_reconcile_dispatch() {
        let dir = tempdir().unwrap();
        let reconciler = DualSeriesReconciler::new(&config_in(&dir));

        let mut states = HashMap::new();
        let mut motion = snapshot(&["10:00", "10:02"], &[0.0, 1.0]);
        motion.kind = Some("PIR".to_string());
        states.insert("hall".to_string(), motion);
        let mut thermo = snapshot(&["10:00"], &[20.0]);
        thermo.kind = Some("Temperature".to_string());
        states.insert("living".to_string(), thermo);
        states.insert("lamp".to_string(), snapshot(&["10:00"], &[3.0]));

        match reconciler.reconcile("hall", &states).unwrap() {
            SensorPlot::Single(single) => {
                assert_eq!(single.y_axis_label, "State");
                assert!(single.binary);
                assert_eq!(single.series.len(), 3);
            }
            other => panic!("expected single series, got {other:?}"),
        }

        assert!(matches!(reconciler.reconcile("living", &states).unwrap(), SensorPlot::Dual(_)));

        let lamp = reconciler.reconcile("lamp", &states).unwrap();
        assert_eq!(lamp.y_axis_label(), "Value");
        assert!(matches!(lamp, SensorPlot::Single(SingleSeries { binary: false, .. })));
    }

    #[test]
    fn test_reconcile_as_uses_given_category() {
        let dir = tempdir().unwrap();
        let reconciler = DualSeriesReconciler::new(&config_in(&dir));
        let mut states = HashMap::new();
        states.insert("lamp".to_string(), snapshot(&["10:00"], &[3.0]));

        let forced = SensorCategory::Temperature;
        let plot = reconciler.reconcile_as("lamp", forced, &states).unwrap();
        assert_eq!(plot.y_axis_label(), "Temperature (°C)");
        assert_eq!(plot, reconciler.reconcile_as("lamp", forced, &states).unwrap());
        assert!(matches!(reconciler.reconcile("lamp", &states).unwrap(), SensorPlot::Single(_)));
    }

    #[test]
    fn test_align_len() {
        let values = vec![RawValue::Number(1.0)];
        assert_eq!(align_len(values.clone(), 2), vec![RawValue::Number(1.0), RawValue::Missing]);
        assert_eq!(align_len(values, 0), Vec::<RawValue>::new());
    }
}
