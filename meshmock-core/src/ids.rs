//! Fixed identifier spaces of the mesh and their validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MeshError, MeshResult};
use crate::scalar::Scalar;

/// Programmable coupling elements in the mesh.
pub const NUM_PUCS: usize = 71;
/// External input/output ports.
pub const NUM_PORTS: usize = 60;
/// Wavelength channels of the interrogator; the last one is reserved.
pub const NUM_CHANNELS: usize = 35;
/// Channels addressable by `interrogate_fiber`: `[0, NUM_CHANNELS - 1)`.
pub const USABLE_CHANNELS: usize = NUM_CHANNELS - 1;

macro_rules! mesh_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for Scalar {
            fn from(value: $name) -> Self {
                Scalar::from(value.0)
            }
        }
    };
}

mesh_id!(
    /// Coupling element identifier in `[0, NUM_PUCS)`.
    PucId
);
mesh_id!(
    /// Port identifier in `[0, NUM_PORTS)`.
    Port
);
mesh_id!(
    /// Interrogator channel in `[0, USABLE_CHANNELS)`.
    Channel
);

fn validate_index(
    value: &Scalar,
    field: &'static str,
    bound: usize,
    bounds: &'static str,
) -> MeshResult<usize> {
    let raw = value
        .as_int()
        .ok_or_else(|| MeshError::validation(field, format!("{value} is not an integer")))?;
    usize::try_from(raw)
        .ok()
        .filter(|index| *index < bound)
        .ok_or_else(|| MeshError::range(field, raw, bounds))
}

pub fn validate_port(value: &Scalar) -> MeshResult<Port> {
    validate_index(value, "port", NUM_PORTS, "[0, 60)").map(Port)
}

/// Validate every port, stopping at the first failure.
pub fn validate_ports(values: &[Scalar]) -> MeshResult<Vec<Port>> {
    values.iter().map(validate_port).collect()
}

pub fn validate_puc(value: &Scalar) -> MeshResult<PucId> {
    validate_index(value, "puc", NUM_PUCS, "[0, 71)").map(PucId)
}

pub fn validate_channel(value: &Scalar) -> MeshResult<Channel> {
    validate_index(value, "channel", USABLE_CHANNELS, "[0, 34)").map(Channel)
}
