//! Scripted walkthrough session against the mesh mock.
//!
//! # Example
//! ```
//! use meshmock_console::config::Config;
//! use meshmock_console::service::MeshSession;
//! use meshmock_core::MeshControl;
//! use meshmock_telemetry::TelemetryHandle;
//!
//! let cfg = Config::sample();
//! let telemetry = TelemetryHandle::from_config(cfg.telemetry.clone());
//! let mut session = MeshSession::new(&cfg, telemetry);
//! let report = session.run().unwrap();
//! assert_eq!(report.output_power_dbm.len(), cfg.session.beamsplitter_outports.len());
//! assert!(!session.mesh().is_connected());
//! ```

use std::f64::consts::PI;

use meshmock_core::{
    CouplingElementState, MeshControl, MeshError, MeshFacade, PortPowerMap, PucStateMap, Scalar,
};
use meshmock_telemetry::{TelemetryError, TelemetryHandle};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, SessionSection};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("mesh rejected {step}: {source}")]
    Mesh {
        step: &'static str,
        #[source]
        source: MeshError,
    },
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T, SessionError>;
}

impl<T> StepContext<T> for Result<T, MeshError> {
    fn step(self, step: &'static str) -> Result<T, SessionError> {
        self.map_err(|source| SessionError::Mesh { step, source })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionReport {
    pub beamsplitter_pucs: usize,
    pub output_power_dbm: PortPowerMap,
    pub interconnect_pucs: usize,
    /// The interconnect overlapped the beamsplitter and was rolled back.
    pub rolled_back: bool,
    pub interrogated_channels: usize,
    pub temperature_c: f64,
}

pub struct MeshSession {
    config: SessionSection,
    mesh: MeshFacade,
    telemetry: TelemetryHandle,
}

impl MeshSession {
    pub fn new(config: &Config, telemetry: TelemetryHandle) -> Self {
        Self {
            config: config.session.clone(),
            mesh: MeshFacade::new(&config.mesh).with_telemetry(telemetry.clone()),
            telemetry,
        }
    }

    pub fn mesh(&self) -> &MeshFacade {
        &self.mesh
    }

    /// Connect, route, measure and disconnect. The mesh is left disconnected
    /// even when a step fails.
    pub fn run(&mut self) -> Result<SessionReport, SessionError> {
        self.mesh.connect();
        let report = self.walkthrough();
        self.mesh.disconnect();
        let report = report?;
        self.telemetry.record_counter("session.completed", 1)?;
        Ok(report)
    }

    fn walkthrough(&mut self) -> Result<SessionReport, SessionError> {
        let cfg = &self.config;
        let mesh = &mut self.mesh;

        let pi_phase = CouplingElementState::new(0.0, PI).step("pi phase state")?;
        mesh.set_puc_states(&[(2.into(), pi_phase), (5.into(), CouplingElementState::cross())])
            .step("set_puc_states")?;

        mesh.reset().step("reset")?;
        let all_bar: Vec<_> = mesh
            .get_puc_states()
            .step("get_puc_states")?
            .into_keys()
            .map(|id| (Scalar::from(id), CouplingElementState::bar()))
            .collect();
        mesh.set_puc_states(&all_bar).step("set_puc_states")?;

        let split = mesh
            .beamsplitter(
                cfg.beamsplitter_inport.clone(),
                &cfg.beamsplitter_outports,
                true,
            )
            .step("beamsplitter")?;
        let output_power_dbm = mesh
            .get_output_power(&cfg.beamsplitter_outports)
            .step("get_output_power")?;

        let added = mesh
            .interconnect(
                cfg.interconnect_inport.clone(),
                cfg.interconnect_outport.clone(),
                false,
            )
            .step("interconnect")?;
        let rolled_back = overlaps(&split, &added);
        if rolled_back {
            info!(pucs = added.len(), "interconnect collides with beamsplitter, rolling back");
            mesh.reset().step("reset")?;
            let restore: Vec<_> = split
                .iter()
                .map(|(id, state)| (Scalar::from(*id), *state))
                .collect();
            mesh.set_puc_states(&restore).step("set_puc_states")?;
            self.telemetry.record_counter("session.rollback", 1)?;
        }

        let interrogated_channels = mesh
            .interrogate_fiber(cfg.interrogate_inport.clone(), None)
            .step("interrogate_fiber")?
            .len();
        let temperature_c = mesh.get_temp().step("get_temp")?;

        Ok(SessionReport {
            beamsplitter_pucs: split.len(),
            output_power_dbm,
            interconnect_pucs: added.len(),
            rolled_back,
            interrogated_channels,
            temperature_c,
        })
    }
}

fn overlaps(a: &PucStateMap, b: &PucStateMap) -> bool {
    a.keys().any(|id| b.contains_key(id))
}

#[cfg(test)]
mod tests {
    use meshmock_core::{ErrorKind, MeshConfig, Scalar};
    use meshmock_telemetry::TelemetryConfig;

    use super::*;

    fn session(config: &Config) -> (MeshSession, TelemetryHandle) {
        let telemetry = TelemetryHandle::from_config(TelemetryConfig::sample("http://localhost"));
        (MeshSession::new(config, telemetry.clone()), telemetry)
    }

    #[test]
    fn run_records_operations_and_disconnects() {
        let (mut session, telemetry) = session(&Config::sample());
        let report = session.run().unwrap();
        assert_eq!(report.interrogated_channels, 33);
        assert!((35.0..=50.0).contains(&report.temperature_c));
        assert!(!session.mesh().is_connected());

        let snapshot = telemetry.flush();
        assert_eq!(snapshot.counter("session.completed"), 1);
        assert_eq!(snapshot.counter("mesh.connect"), 1);
        assert_eq!(snapshot.counter("mesh.disconnect"), 1);
        assert_eq!(snapshot.counter("mesh.op.beamsplitter"), 1);
        assert_eq!(
            snapshot.counter("session.rollback"),
            u64::from(report.rolled_back)
        );
    }

    #[test]
    fn conflicting_ports_surface_the_failed_step() {
        let mut config = Config::sample();
        config.mesh = MeshConfig::fixed(11);
        config.session.interconnect_outport = Scalar::Int(25);
        let (mut session, telemetry) = session(&config);
        let err = session.run().unwrap_err();
        match err {
            SessionError::Mesh { step, source } => {
                assert_eq!(step, "interconnect");
                assert_eq!(source.kind(), ErrorKind::Conflict);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!session.mesh().is_connected());
        assert_eq!(telemetry.flush().counter("session.completed"), 0);
    }

    #[test]
    fn overlap_detection() {
        let mut a = PucStateMap::new();
        let mut b = PucStateMap::new();
        a.insert(meshmock_core::PucId(3), CouplingElementState::bar());
        b.insert(meshmock_core::PucId(4), CouplingElementState::cross());
        assert!(!overlaps(&a, &b));
        b.insert(meshmock_core::PucId(3), CouplingElementState::cross());
        assert!(overlaps(&a, &b));
    }
}
