use super::vector::{Species, Vec2};
use serde::{Deserialize, Serialize};

/// Frozen copy of one species' living members taken at a given tick.
///
/// Owned exclusively by whoever holds it, so analysis can run on another
/// thread while the simulation keeps ticking.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpeciesSnapshot {
    pub tick: u64,
    pub species: Species,
    pub canvas_size: f64,
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

impl SpeciesSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
