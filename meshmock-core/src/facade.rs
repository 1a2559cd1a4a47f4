//! Connection-gated mesh façade.
//!
//! Every operation other than `connect`/`disconnect` checks the connection
//! flag first, then validates each argument, then checks arguments against
//! each other. Results come from [`RandomMeshSource`].

use meshmock_telemetry::TelemetryHandle;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::config::{MeshConfig, Seeding};
use crate::error::{MeshError, MeshResult};
use crate::ids::{
    validate_channel, validate_port, validate_ports, validate_puc, Channel, Port, USABLE_CHANNELS,
};
use crate::scalar::Scalar;
use crate::source::{PucStateMap, RandomMeshSource};
use crate::state::CouplingElementState;

/// Port id -> optical power in dBm.
pub type PortPowerMap = BTreeMap<Port, f64>;
/// Interrogator channel -> optical power in dBm.
pub type ChannelPowerMap = BTreeMap<Channel, f64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortDirection {
    Input,
    Output,
}

/// Capability surface of a photonic mesh controller.
///
/// `reset` on the routing calls asks the device to clear active PUCs before
/// applying the new route.
pub trait MeshControl {
    fn connect(&mut self);
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;

    /// Accept the given PUC states. Nothing is returned on success; an id
    /// listed twice is a conflict.
    fn set_puc_states(&mut self, states: &[(Scalar, CouplingElementState)]) -> MeshResult<()>;
    fn get_puc_states(&mut self) -> MeshResult<PucStateMap>;
    /// Return every active PUC of the mesh to inactive.
    fn reset(&mut self) -> MeshResult<()>;

    fn interconnect(&mut self, inport: Scalar, outport: Scalar, reset: bool)
        -> MeshResult<PucStateMap>;
    /// Split `inport` equally across `outports`.
    fn beamsplitter(
        &mut self,
        inport: Scalar,
        outports: &[Scalar],
        reset: bool,
    ) -> MeshResult<PucStateMap>;
    /// Combine `inports` with equal ratio into `outport`.
    fn combiner(
        &mut self,
        inports: &[Scalar],
        outport: Scalar,
        reset: bool,
    ) -> MeshResult<PucStateMap>;
    fn switch(
        &mut self,
        inports: &[Scalar],
        outports: &[Scalar],
        reset: bool,
    ) -> MeshResult<PucStateMap>;

    /// Configure the lattice filter to compensate `gd_slope` around
    /// `central_wavelength` over `bandwidth`.
    fn compensate_dispersion(
        &mut self,
        inport: Scalar,
        outport: Scalar,
        central_wavelength: f64,
        bandwidth: f64,
        gd_slope: f64,
    ) -> MeshResult<()>;
    /// Read `inport` through the AWG. `None` interrogates every usable
    /// channel; the input port's own index is always dropped from the set.
    fn interrogate_fiber(
        &mut self,
        inport: Scalar,
        channels: Option<&[Scalar]>,
    ) -> MeshResult<ChannelPowerMap>;

    fn get_temp(&mut self) -> MeshResult<f64>;
    fn get_power(&mut self, direction: PortDirection, ports: &[Scalar])
        -> MeshResult<PortPowerMap>;

    fn get_input_power(&mut self, ports: &[Scalar]) -> MeshResult<PortPowerMap> {
        self.get_power(PortDirection::Input, ports)
    }

    fn get_output_power(&mut self, ports: &[Scalar]) -> MeshResult<PortPowerMap> {
        self.get_power(PortDirection::Output, ports)
    }
}

/// In-process mock of the mesh controller. No device is ever contacted.
pub struct MeshFacade {
    connected: bool,
    source: RandomMeshSource,
    telemetry: Option<TelemetryHandle>,
}

impl MeshFacade {
    pub fn new(config: &MeshConfig) -> Self {
        Self {
            connected: false,
            source: RandomMeshSource::new(config.seeding),
            telemetry: None,
        }
    }

    /// Record operation counters into `telemetry`.
    pub fn with_telemetry(mut self, telemetry: TelemetryHandle) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn seeding(&self) -> Seeding {
        self.source.seeding()
    }

    fn run<T>(
        &mut self,
        operation: &'static str,
        body: impl FnOnce(&mut RandomMeshSource) -> MeshResult<T>,
    ) -> MeshResult<T> {
        let result = if self.connected {
            body(&mut self.source)
        } else {
            Err(MeshError::NotConnected)
        };
        match &result {
            Ok(_) => {
                debug!(operation, "mesh operation accepted");
                self.count(&format!("mesh.op.{operation}"));
            }
            Err(err) => {
                let kind = err.kind().as_str();
                warn!(operation, kind, error = %err, "mesh operation rejected");
                self.count(&format!("mesh.rejected.{kind}"));
            }
        }
        result
    }

    fn count(&self, name: &str) {
        if let Some(telemetry) = &self.telemetry {
            if let Err(err) = telemetry.record_counter(name, 1) {
                warn!(error = %err, "telemetry counter dropped");
            }
        }
    }
}

impl Default for MeshFacade {
    fn default() -> Self {
        Self::new(&MeshConfig::default())
    }
}

fn ensure_disjoint(inports: &[Port], outports: &[Port], message: &str) -> MeshResult<()> {
    let inputs: BTreeSet<_> = inports.iter().collect();
    if outports.iter().any(|port| inputs.contains(port)) {
        return Err(MeshError::Conflict(message.to_owned()));
    }
    Ok(())
}

fn ensure_finite(field: &'static str, value: f64) -> MeshResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MeshError::validation(field, format!("{value} is not finite")))
    }
}

impl MeshControl for MeshFacade {
    fn connect(&mut self) {
        self.connected = true;
        debug!(seeding = ?self.seeding(), "mesh connected");
        self.count("mesh.connect");
    }

    fn disconnect(&mut self) {
        self.connected = false;
        debug!("mesh disconnected");
        self.count("mesh.disconnect");
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_puc_states(&mut self, states: &[(Scalar, CouplingElementState)]) -> MeshResult<()> {
        self.run("set_puc_states", |_| {
            let ids = states
                .iter()
                .map(|(id, _)| validate_puc(id))
                .collect::<MeshResult<Vec<_>>>()?;
            let mut seen = BTreeSet::new();
            for id in ids {
                if !seen.insert(id) {
                    return Err(MeshError::Conflict(format!("two states set for PUC {id}")));
                }
            }
            debug!(count = states.len(), "puc states accepted");
            Ok(())
        })
    }

    fn get_puc_states(&mut self) -> MeshResult<PucStateMap> {
        self.run("get_puc_states", |source| Ok(source.full_mesh()))
    }

    fn reset(&mut self) -> MeshResult<()> {
        self.run("reset", |_| Ok(()))
    }

    fn interconnect(
        &mut self,
        inport: Scalar,
        outport: Scalar,
        reset: bool,
    ) -> MeshResult<PucStateMap> {
        self.run("interconnect", |source| {
            let inport = validate_port(&inport)?;
            let outport = validate_port(&outport)?;
            if inport == outport {
                return Err(MeshError::Conflict(
                    "input port can't be the same as output port".into(),
                ));
            }
            debug!(%inport, %outport, reset, "interconnect");
            Ok(source.route())
        })
    }

    fn beamsplitter(
        &mut self,
        inport: Scalar,
        outports: &[Scalar],
        reset: bool,
    ) -> MeshResult<PucStateMap> {
        self.run("beamsplitter", |source| {
            let inport = validate_port(&inport)?;
            let outports = validate_ports(outports)?;
            ensure_disjoint(&[inport], &outports, "input port in output port list")?;
            debug!(%inport, ?outports, reset, "beamsplitter");
            Ok(source.route())
        })
    }

    fn combiner(
        &mut self,
        inports: &[Scalar],
        outport: Scalar,
        reset: bool,
    ) -> MeshResult<PucStateMap> {
        self.run("combiner", |source| {
            let outport = validate_port(&outport)?;
            let inports = validate_ports(inports)?;
            ensure_disjoint(&inports, &[outport], "output port in input port list")?;
            debug!(?inports, %outport, reset, "combiner");
            Ok(source.route())
        })
    }

    fn switch(
        &mut self,
        inports: &[Scalar],
        outports: &[Scalar],
        reset: bool,
    ) -> MeshResult<PucStateMap> {
        self.run("switch", |source| {
            let inports = validate_ports(inports)?;
            let outports = validate_ports(outports)?;
            ensure_disjoint(&inports, &outports, "two states set for the same port")?;
            debug!(?inports, ?outports, reset, "switch");
            Ok(source.route())
        })
    }

    fn compensate_dispersion(
        &mut self,
        inport: Scalar,
        outport: Scalar,
        central_wavelength: f64,
        bandwidth: f64,
        gd_slope: f64,
    ) -> MeshResult<()> {
        self.run("compensate_dispersion", |_| {
            let inport = validate_port(&inport)?;
            let outport = validate_port(&outport)?;
            ensure_finite("central wavelength", central_wavelength)?;
            ensure_finite("bandwidth", bandwidth)?;
            ensure_finite("group delay slope", gd_slope)?;
            debug!(
                %inport,
                %outport,
                central_wavelength,
                bandwidth,
                gd_slope,
                "dispersion compensation configured"
            );
            Ok(())
        })
    }

    fn interrogate_fiber(
        &mut self,
        inport: Scalar,
        channels: Option<&[Scalar]>,
    ) -> MeshResult<ChannelPowerMap> {
        self.run("interrogate_fiber", |source| {
            let inport = validate_port(&inport)?;
            let own_index = Scalar::from(inport);
            let selected = match channels {
                Some(channels) => channels
                    .iter()
                    .filter(|channel| **channel != own_index)
                    .map(validate_channel)
                    .collect::<MeshResult<Vec<_>>>()?,
                None => (0..USABLE_CHANNELS)
                    .filter(|channel| *channel != inport.0)
                    .map(Channel)
                    .collect(),
            };
            Ok(selected
                .into_iter()
                .map(|channel| (channel, source.power_dbm()))
                .collect())
        })
    }

    fn get_temp(&mut self) -> MeshResult<f64> {
        let temperature = self.run("get_temp", |source| Ok(source.temperature()))?;
        if let Some(telemetry) = &self.telemetry {
            telemetry.record_reading("mesh.temperature_c", temperature);
        }
        Ok(temperature)
    }

    fn get_power(&mut self, direction: PortDirection, ports: &[Scalar]) -> MeshResult<PortPowerMap> {
        self.run("get_power", |source| {
            let ports = validate_ports(ports)?;
            debug!(?direction, ?ports, "power read");
            Ok(ports
                .into_iter()
                .map(|port| (port, source.power_dbm()))
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use meshmock_telemetry::TelemetryConfig;

    fn connected() -> MeshFacade {
        let mut mesh = MeshFacade::new(&MeshConfig::fixed(5));
        mesh.connect();
        mesh
    }

    #[test]
    fn connection_is_idempotent() {
        let mut mesh = MeshFacade::default();
        assert!(!mesh.is_connected());
        mesh.disconnect();
        mesh.connect();
        mesh.connect();
        assert!(mesh.is_connected());
        mesh.disconnect();
        mesh.disconnect();
        assert!(!mesh.is_connected());
    }

    #[test]
    fn connection_check_precedes_argument_validation() {
        let mut mesh = MeshFacade::default();
        let err = mesh
            .interconnect("bad".into(), 999.into(), true)
            .unwrap_err();
        assert_eq!(err, MeshError::NotConnected);
        let err = mesh.set_puc_states(&[("bad".into(), CouplingElementState::bar())]);
        assert_eq!(err.unwrap_err().kind(), ErrorKind::Connection);
    }

    #[test]
    fn port_validation_precedes_conflict_check() {
        let mut mesh = connected();
        let err = mesh
            .beamsplitter(0.into(), &Scalar::list([0, 70]), true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = mesh
            .switch(&Scalar::list([1, 0]), &Scalar::list([2, 0]), true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn combiner_checks_outport_first() {
        let mut mesh = connected();
        let err = mesh
            .combiner(&Scalar::list([70]), "one".into(), true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn explicit_channels_drop_the_input_port() {
        let mut mesh = connected();
        let readings = mesh
            .interrogate_fiber(3.into(), Some(&Scalar::list([3, 3, 4])))
            .unwrap();
        assert_eq!(readings.keys().copied().collect::<Vec<_>>(), vec![Channel(4)]);
    }

    #[test]
    fn dispersion_requires_finite_targets() {
        let mut mesh = connected();
        assert!(mesh
            .compensate_dispersion(1.into(), 2.into(), 1550.0, 0.8, -17.0)
            .is_ok());
        let err = mesh
            .compensate_dispersion(1.into(), 2.into(), f64::NAN, 0.8, -17.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn telemetry_counts_accepted_and_rejected_calls() {
        let telemetry = TelemetryHandle::from_config(TelemetryConfig::sample("http://localhost"));
        let mut mesh = MeshFacade::new(&MeshConfig::fixed(9)).with_telemetry(telemetry.clone());
        assert!(mesh.get_temp().is_err());
        mesh.connect();
        mesh.get_temp().unwrap();
        mesh.interconnect(5.into(), 5.into(), true).unwrap_err();
        let snapshot = telemetry.flush();
        assert_eq!(snapshot.counter("mesh.connect"), 1);
        assert_eq!(snapshot.counter("mesh.rejected.connection"), 1);
        assert_eq!(snapshot.counter("mesh.op.get_temp"), 1);
        assert_eq!(snapshot.counter("mesh.rejected.conflict"), 1);
        assert_eq!(snapshot.readings["mesh.temperature_c"].len(), 1);
    }
}
