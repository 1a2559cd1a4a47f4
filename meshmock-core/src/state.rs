//! Coupling-element (PUC) state value object.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::{MeshError, MeshResult};
use crate::scalar::Scalar;

/// Token accepted in place of a coupling factor of 1.0.
pub const CROSS: &str = "x";
/// Token accepted in place of a coupling factor of 0.0.
pub const BAR: &str = "=";

/// Configuration of one programmable 2x2 coupler.
///
/// Construction validates and normalizes, so a value of this type always
/// holds `0 <= coupling_factor <= 1` and `0 <= phase < 2π`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawState")]
pub struct CouplingElementState {
    coupling_factor: f64,
    phase: f64,
}

impl CouplingElementState {
    /// Build a state from a raw coupling factor and phase (radians).
    ///
    /// ```
    /// use meshmock_core::CouplingElementState;
    ///
    /// let state = CouplingElementState::new("x", -1.0).unwrap();
    /// assert_eq!(state.coupling_factor(), 1.0);
    /// assert!((state.phase() - (std::f64::consts::TAU - 1.0)).abs() < 1e-12);
    /// assert!(CouplingElementState::new(2, 0.0).is_err());
    /// ```
    pub fn new(coupling_factor: impl Into<Scalar>, phase: impl Into<Scalar>) -> MeshResult<Self> {
        let coupling_factor = coerce_coupling(coupling_factor.into())?;
        let phase = phase.into().to_f64("phase")?;
        if !(0.0..=1.0).contains(&coupling_factor) {
            return Err(MeshError::range(
                "coupling factor",
                coupling_factor,
                "[0, 1]",
            ));
        }
        Ok(Self::from_parts(coupling_factor, phase))
    }

    /// State with the given coupling factor and zero phase.
    pub fn with_coupling(coupling_factor: impl Into<Scalar>) -> MeshResult<Self> {
        Self::new(coupling_factor, 0.0)
    }

    /// Fully crossed coupler.
    pub fn cross() -> Self {
        Self::from_parts(1.0, 0.0)
    }

    /// Straight-through coupler.
    pub fn bar() -> Self {
        Self::from_parts(0.0, 0.0)
    }

    // Callers guarantee `coupling_factor` is already in [0, 1].
    pub(crate) fn from_parts(coupling_factor: f64, phase: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&coupling_factor));
        Self {
            coupling_factor,
            phase: normalize_phase(phase),
        }
    }

    pub fn coupling_factor(&self) -> f64 {
        self.coupling_factor
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn is_cross(&self) -> bool {
        self.coupling_factor == 1.0
    }

    pub fn is_bar(&self) -> bool {
        self.coupling_factor == 0.0
    }
}

impl Default for CouplingElementState {
    fn default() -> Self {
        Self::cross()
    }
}

fn coerce_coupling(raw: Scalar) -> MeshResult<f64> {
    match raw {
        Scalar::Text(ref text) if text == CROSS => Ok(1.0),
        Scalar::Text(ref text) if text == BAR => Ok(0.0),
        other => other.to_f64("coupling factor"),
    }
}

/// Floor-modulo into `[0, 2π)`; negative phases wrap to positive values.
pub fn normalize_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid rounds up to TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawState {
    #[serde(default = "default_coupling", alias = "k")]
    coupling_factor: Scalar,
    #[serde(default = "default_phase")]
    phase: Scalar,
}

fn default_coupling() -> Scalar {
    Scalar::Float(1.0)
}

fn default_phase() -> Scalar {
    Scalar::Float(0.0)
}

impl TryFrom<RawState> for CouplingElementState {
    type Error = MeshError;

    fn try_from(raw: RawState) -> Result<Self, Self::Error> {
        Self::new(raw.coupling_factor, raw.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::f64::consts::PI;

    #[test]
    fn sentinels_map_to_cross_and_bar() {
        assert!(CouplingElementState::with_coupling("x").unwrap().is_cross());
        assert!(CouplingElementState::with_coupling("=").unwrap().is_bar());
    }

    #[test]
    fn in_range_coupling_is_stored_as_float() {
        for raw in [0.0, 0.1, 0.5, 1.0] {
            let state = CouplingElementState::new(raw, 0.0).unwrap();
            assert_eq!(state.coupling_factor(), raw);
        }
        assert_eq!(
            CouplingElementState::new("0.75", 0.0).unwrap().coupling_factor(),
            0.75
        );
        assert_eq!(CouplingElementState::new(1, 0.0).unwrap().coupling_factor(), 1.0);
    }

    #[test]
    fn out_of_range_coupling_is_a_range_error() {
        for raw in [-0.01, 1.0001, 2.0, 5.0] {
            let err = CouplingElementState::new(raw, 0.0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range);
        }
    }

    #[test]
    fn non_numeric_fields_are_validation_errors() {
        let err = CouplingElementState::new("one", 1.2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = CouplingElementState::new(0.2, "one").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn phase_wraps_into_one_turn() {
        let cases = [0.0, 3.0 * PI, -PI / 2.0, 10.0, -100.0, TAU, 1e6];
        for raw in cases {
            let phase = CouplingElementState::new(0.5, raw).unwrap().phase();
            assert!((0.0..TAU).contains(&phase), "{raw} -> {phase}");
            let turns = (raw - phase) / TAU;
            assert!((turns - turns.round()).abs() < 1e-9, "{raw} -> {phase}");
        }
        assert!((CouplingElementState::new(0.1, 3.0 * PI).unwrap().phase() - PI).abs() < 1e-12);
    }

    #[test]
    fn tiny_negative_phase_stays_below_tau() {
        assert!(normalize_phase(-1e-20) < TAU);
    }

    #[test]
    fn deserialization_runs_validation() {
        let state: CouplingElementState =
            serde_json::from_str(r#"{"coupling-factor": "=", "phase": -1.0}"#).unwrap();
        assert!(state.is_bar());
        assert!(state.phase() > 0.0);
        let state: CouplingElementState = serde_json::from_str(r#"{"k": 0.3}"#).unwrap();
        assert_eq!(state.phase(), 0.0);
        assert!(serde_json::from_str::<CouplingElementState>(r#"{"k": 3}"#).is_err());
    }
}
