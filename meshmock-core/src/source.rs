//! Random result synthesis.
//!
//! The mock keeps no mesh state between calls. Every read or routing
//! operation asks this source for a fresh, shape-correct and range-correct
//! answer instead, so nothing here relates to earlier `set_puc_states` calls.

use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;

use crate::config::Seeding;
use crate::ids::{PucId, NUM_PUCS};
use crate::state::CouplingElementState;

/// Coupling element id -> state, as returned by mesh reads and routing calls.
pub type PucStateMap = BTreeMap<PucId, CouplingElementState>;

/// Number of PUCs touched by a synthesized routing result, inclusive.
pub const ROUTE_SIZE: (usize, usize) = (5, 15);
/// Device temperature range in °C, inclusive.
pub const TEMPERATURE_C: (f64, f64) = (35.0, 50.0);
/// Optical power range in dBm, inclusive.
pub const POWER_DBM: (f64, f64) = (-50.0, 0.0);

pub struct RandomMeshSource {
    rng: ChaCha20Rng,
    seeding: Seeding,
}

impl RandomMeshSource {
    pub fn new(seeding: Seeding) -> Self {
        let rng = match seeding {
            Seeding::Fixed(seed) => ChaCha20Rng::seed_from_u64(seed),
            Seeding::Entropy => ChaCha20Rng::from_entropy(),
        };
        Self { rng, seeding }
    }

    pub fn seeding(&self) -> Seeding {
        self.seeding
    }

    /// A state for every PUC, coupling factor and phase rounded to 3 decimals.
    pub fn full_mesh(&mut self) -> PucStateMap {
        (0..NUM_PUCS)
            .map(|id| {
                let coupling = round_to(self.rng.gen::<f64>(), 3);
                let phase = round_to(self.rng.gen_range(0.0..TAU), 3);
                (PucId(id), CouplingElementState::from_parts(coupling, phase))
            })
            .collect()
    }

    /// Distinct random PUCs, each set to bar or cross.
    pub fn route(&mut self) -> PucStateMap {
        let amount = self.rng.gen_range(ROUTE_SIZE.0..=ROUTE_SIZE.1);
        index::sample(&mut self.rng, NUM_PUCS, amount)
            .into_iter()
            .map(|id| {
                let state = if self.rng.gen_bool(0.5) {
                    CouplingElementState::cross()
                } else {
                    CouplingElementState::bar()
                };
                (PucId(id), state)
            })
            .collect()
    }

    /// Device temperature in °C, rounded to 2 decimals.
    pub fn temperature(&mut self) -> f64 {
        round_to(self.rng.gen_range(TEMPERATURE_C.0..=TEMPERATURE_C.1), 2)
    }

    /// Optical power reading in dBm.
    pub fn power_dbm(&mut self) -> f64 {
        self.rng.gen_range(POWER_DBM.0..=POWER_DBM.1)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mesh_covers_every_puc() {
        let mut source = RandomMeshSource::new(Seeding::Fixed(1));
        let states = source.full_mesh();
        assert_eq!(states.len(), NUM_PUCS);
        assert_eq!(states.keys().next(), Some(&PucId(0)));
        assert_eq!(states.keys().last(), Some(&PucId(NUM_PUCS - 1)));
        for state in states.values() {
            assert!((0.0..=1.0).contains(&state.coupling_factor()));
            assert!((0.0..TAU).contains(&state.phase()));
            assert_eq!(round_to(state.coupling_factor(), 3), state.coupling_factor());
        }
    }

    #[test]
    fn routes_are_binary_and_sized() {
        let mut source = RandomMeshSource::new(Seeding::Fixed(2));
        for _ in 0..50 {
            let route = source.route();
            assert!((ROUTE_SIZE.0..=ROUTE_SIZE.1).contains(&route.len()));
            assert!(route.keys().all(|id| id.0 < NUM_PUCS));
            assert!(route.values().all(|s| s.is_bar() || s.is_cross()));
        }
    }

    #[test]
    fn readings_stay_in_range() {
        let mut source = RandomMeshSource::new(Seeding::Fixed(3));
        for _ in 0..200 {
            let temp = source.temperature();
            assert!((TEMPERATURE_C.0..=TEMPERATURE_C.1).contains(&temp));
            let power = source.power_dbm();
            assert!((POWER_DBM.0..=POWER_DBM.1).contains(&power));
        }
    }

    #[test]
    fn fixed_seed_replays() {
        let mut a = RandomMeshSource::new(Seeding::Fixed(123));
        let mut b = RandomMeshSource::new(Seeding::Fixed(123));
        assert_eq!(a.full_mesh(), b.full_mesh());
        assert_eq!(a.route(), b.route());
        assert_eq!(a.temperature(), b.temperature());
    }
}
