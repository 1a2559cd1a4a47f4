//! Software stand-in for a programmable photonic mesh controller.
//!
//! The mock models a mesh of 71 coupling elements (PUCs) behind 60 ports and a
//! 34-channel fiber interrogator. Calls are validated exactly as the hardware
//! API would validate them, but every measurement and state returned is drawn
//! from a seeded random source. No device is ever contacted and no mesh state
//! is kept between calls.
//!
//! # Quickstart
//! ```
//! use std::f64::consts::PI;
//!
//! use meshmock_core::{CouplingElementState, MeshConfig, MeshControl, MeshFacade, Scalar};
//!
//! let mut mesh = MeshFacade::new(&MeshConfig::fixed(123));
//! mesh.connect();
//! mesh.set_puc_states(&[(2.into(), CouplingElementState::new(0.0, PI).unwrap())])
//!     .unwrap();
//! let route = mesh.beamsplitter(2.into(), &Scalar::list([17, 19]), true).unwrap();
//! assert!((5..=15).contains(&route.len()));
//! mesh.disconnect();
//! assert!(mesh.get_puc_states().is_err());
//! ```

pub mod config;
pub mod error;
pub mod facade;
pub mod ids;
pub mod scalar;
pub mod source;
pub mod state;

pub use config::{MeshConfig, Seeding, DEFAULT_SEED};
pub use error::{ErrorKind, MeshError, MeshResult};
pub use facade::{ChannelPowerMap, MeshControl, MeshFacade, PortDirection, PortPowerMap};
pub use ids::{
    validate_channel, validate_port, validate_ports, validate_puc, Channel, Port, PucId,
    NUM_CHANNELS, NUM_PORTS, NUM_PUCS, USABLE_CHANNELS,
};
pub use scalar::Scalar;
pub use source::{PucStateMap, RandomMeshSource};
pub use state::{normalize_phase, CouplingElementState, BAR, CROSS};
