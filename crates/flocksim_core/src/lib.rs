//! # Flocksim Core
//!
//! The simulation engine for flocksim - a predator-prey flocking model on a
//! toroidal (wrap-around) square domain.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Minimum-image geometry on the torus
//! - A k-nearest-neighbor attraction/repulsion kernel
//! - A turning-rate limiter that preserves constant speed
//! - Irreversible predation and manual kill operations
//! - A spatial velocity-correlation analyzer that runs off the tick thread
//!
//! ## Architecture
//!
//! The simulation follows a data-oriented design with:
//! - **Structure-of-arrays populations**: positions, velocities and alive flags
//!   in contiguous buffers, agents identified by index
//! - **Batched kernels**: whole-population force computation, Rayon-powered
//! - **Deterministic simulation**: seeded `ChaCha8Rng` for reproducible runs
//!
//! ## Example
//!
//! ```
//! use flocksim_core::config::SimulationConfig;
//! use flocksim_core::engine::SimulationEngine;
//!
//! let config = SimulationConfig {
//!     seed: Some(42),
//!     ..SimulationConfig::default()
//! };
//! let mut engine = SimulationEngine::new(config).unwrap();
//! let result = engine.tick();
//! assert!(result.eaten <= engine.preys().len());
//! ```

/// Spatial velocity-correlation function over species snapshots
pub mod correlation;
/// Configuration management for simulation parameters
pub mod config;
/// The tick orchestrator and kill operations
pub mod engine;
/// Error types for configuration and analysis failures
pub mod error;
/// k-nearest-neighbor attraction and repulsion kernel
pub mod force;
/// Toroidal displacement and distance primitives
pub mod geometry;
/// Performance metrics collection and logging
pub mod metrics;
/// Scalar observables (polarization, mean spacing)
pub mod observables;
/// Structure-of-arrays state for one species
pub mod population;
/// Scheduling and averaging of correlation samples
pub mod sampler;
/// Per-tick heading change limiter
pub mod steering;

pub use config::{AppConfig, CorrelationConfig, ObservablesConfig, SimulationConfig};
pub use engine::SimulationEngine;
pub use error::{Result, SimError};
pub use flocksim_data::{KillReport, RunState, Species, SpeciesSnapshot, TickResult, Vec2};
pub use metrics::{init_logging, Metrics};
