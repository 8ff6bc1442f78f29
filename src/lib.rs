//! Headless runner for the predator-prey flocking simulation.
//!
//! The engine and analysis live in `flocksim_core`; this crate schedules
//! observables, correlation sampling and prey removal around the tick loop.

pub mod app;

pub use app::{App, AppEvent, RunSummary};
