//! Plain data shared between the flocksim engine and its consumers.

pub mod data;

pub use data::outcome::{KillReport, RunState, TickResult};
pub use data::snapshot::SpeciesSnapshot;
pub use data::vector::{Species, Vec2};
