//! Core data structures for the flocksim simulation.

pub mod outcome;
pub mod snapshot;
pub mod vector;
