//! In-process telemetry for the mesh mock. Counters and numeric readings are
//! kept in memory so tests can assert which operations were accepted or
//! rejected without wiring an exporter.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::SystemTime,
};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TelemetryConfig {
    /// Endpoint where telemetry would be shipped (never contacted by the mock).
    pub endpoint: String,
    /// Global labels attached to every snapshot.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl TelemetryConfig {
    pub fn sample(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            labels: BTreeMap::from([("component".into(), "mesh-mock".into())]),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("counter overflow for metric {0}")]
    CounterOverflow(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TelemetrySnapshot {
    pub timestamp: SystemTime,
    pub labels: BTreeMap<String, String>,
    pub counters: BTreeMap<String, u64>,
    pub readings: BTreeMap<String, Vec<f64>>,
}

impl TelemetrySnapshot {
    /// Counter value, zero when the metric was never recorded.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or_default()
    }
}

#[derive(Default)]
struct TelemetryState {
    counters: BTreeMap<String, u64>,
    readings: BTreeMap<String, Vec<f64>>,
}

#[derive(Clone)]
pub struct TelemetryHandle {
    config: TelemetryConfig,
    state: Arc<Mutex<TelemetryState>>,
}

impl TelemetryHandle {
    pub fn from_config(config: TelemetryConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(TelemetryState::default())),
        }
    }

    // A poisoned lock still holds consistent maps; every write is a single insert.
    fn state(&self) -> MutexGuard<'_, TelemetryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_counter(&self, name: &str, delta: u64) -> Result<(), TelemetryError> {
        let mut guard = self.state();
        let entry = guard.counters.entry(name.to_owned()).or_default();
        *entry = entry
            .checked_add(delta)
            .ok_or_else(|| TelemetryError::CounterOverflow(name.to_owned()))?;
        Ok(())
    }

    pub fn record_reading(&self, name: &str, value: f64) {
        self.state()
            .readings
            .entry(name.to_owned())
            .or_default()
            .push(value);
    }

    pub fn flush(&self) -> TelemetrySnapshot {
        let mut guard = self.state();
        TelemetrySnapshot {
            timestamp: SystemTime::now(),
            labels: self.config.labels.clone(),
            counters: std::mem::take(&mut guard.counters),
            readings: std::mem::take(&mut guard.readings),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> TelemetryHandle {
        TelemetryHandle::from_config(TelemetryConfig::sample("http://localhost:4318"))
    }

    #[test]
    fn records_counters_and_readings() {
        let handle = handle();
        handle.record_counter("mesh.op.interconnect", 1).unwrap();
        handle.record_counter("mesh.op.interconnect", 2).unwrap();
        handle.record_reading("mesh.temperature_c", 41.5);
        let snapshot = handle.flush();
        assert_eq!(snapshot.counter("mesh.op.interconnect"), 3);
        assert_eq!(snapshot.readings["mesh.temperature_c"], vec![41.5]);
        assert_eq!(snapshot.labels["component"], "mesh-mock");
    }

    #[test]
    fn detects_counter_overflow() {
        let handle = handle();
        handle.record_counter("mesh.connect", u64::MAX).unwrap();
        let err = handle.record_counter("mesh.connect", 1).unwrap_err();
        assert_eq!(err, TelemetryError::CounterOverflow("mesh.connect".into()));
    }

    #[test]
    fn flush_clears_state() {
        let handle = handle();
        handle.record_counter("mesh.connect", 1).unwrap();
        handle.flush();
        let second = handle.flush();
        assert!(second.counters.is_empty());
        assert_eq!(second.counter("mesh.connect"), 0);
    }

    #[test]
    fn clones_share_state() {
        let handle = handle();
        let clone = handle.clone();
        clone.record_counter("mesh.reset", 1).unwrap();
        assert_eq!(handle.flush().counter("mesh.reset"), 1);
    }
}
