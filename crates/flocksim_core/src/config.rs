//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. All simulation parameters can be customized through
//! this configuration system.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing keys fall back)
//! 3. Command-line overrides applied by the runner
//!
//! ## Example `config.toml`
//!
//! ```toml
//! max_ticks = 5000
//!
//! [simulation]
//! canvas_size = 500000.0
//! num_preys = 200
//! num_predators = 20
//! max_turning_angle = 0.5235987755982988
//! seed = 42
//!
//! [correlation]
//! target = "prey"
//! resolution = 100
//! crop = 0.1
//! ```

use crate::error::{ensure_config, Result};
use flocksim_data::Species;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Parameters of one simulation instance.
///
/// Validated once at engine construction; the engine never clamps them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side length of the square torus.
    pub canvas_size: f64,
    /// Half-width of the spawn square around the canvas center, as a
    /// fraction of `canvas_size`.
    pub gen_bound: f64,
    pub num_preys: usize,
    pub num_predators: usize,
    pub speed_preys: f64,
    pub speed_predators: f64,
    pub repulse_factor_preys: f64,
    pub repulse_factor_predators: f64,
    /// Radians, in `[0, π]`.
    pub max_turning_angle: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            canvas_size: 500_000.0,
            gen_bound: 0.5,
            num_preys: 200,
            num_predators: 20,
            speed_preys: 20.0,
            speed_predators: 20.0,
            repulse_factor_preys: 0.1,
            repulse_factor_predators: 0.1,
            max_turning_angle: PI / 6.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Checks every parameter against its domain.
    pub fn validate(&self) -> Result<()> {
        ensure_config!(
            self.canvas_size.is_finite() && self.canvas_size > 0.0,
            "canvas size must be positive, got {}",
            self.canvas_size
        );
        ensure_config!(
            self.gen_bound.is_finite() && self.gen_bound > 0.0,
            "generation bound must be positive, got {}",
            self.gen_bound
        );
        ensure_config!(self.num_preys > 0, "number of preys must be positive");
        ensure_config!(
            self.num_predators > 0,
            "number of predators must be positive"
        );
        ensure_config!(
            self.speed_preys.is_finite() && self.speed_preys > 0.0,
            "prey speed must be positive, got {}",
            self.speed_preys
        );
        ensure_config!(
            self.speed_predators.is_finite() && self.speed_predators > 0.0,
            "predator speed must be positive, got {}",
            self.speed_predators
        );
        ensure_config!(
            self.repulse_factor_preys.is_finite() && self.repulse_factor_preys >= 0.0,
            "prey repulsion factor must be non-negative, got {}",
            self.repulse_factor_preys
        );
        ensure_config!(
            self.repulse_factor_predators.is_finite() && self.repulse_factor_predators >= 0.0,
            "predator repulsion factor must be non-negative, got {}",
            self.repulse_factor_predators
        );
        ensure_config!(
            (0.0..=PI).contains(&self.max_turning_angle),
            "max turning angle must be in [0, π], got {}",
            self.max_turning_angle
        );
        Ok(())
    }

    /// Sets `max_turning_angle` from degrees.
    #[must_use]
    pub fn with_turning_angle_degrees(mut self, degrees: f64) -> Self {
        self.max_turning_angle = degrees.to_radians();
        self
    }
}

/// How correlation samples are scheduled and binned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CorrelationConfig {
    pub enabled: bool,
    pub target: Species,
    /// Period, in ticks, of one sampling window.
    pub interval: u64,
    /// Samples averaged into one profile; taken on the last ticks of each
    /// window.
    pub sample_size: usize,
    /// Number of radius bins.
    pub resolution: usize,
    /// Largest sampled radius as a fraction of the canvas size.
    pub crop: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: Species::Prey,
            interval: 100,
            sample_size: 20,
            resolution: 100,
            crop: 0.1,
        }
    }
}

impl CorrelationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_config!(self.interval > 0, "correlation interval must be positive");
        ensure_config!(
            self.sample_size > 0,
            "correlation sample size must be positive"
        );
        ensure_config!(
            self.sample_size as u64 <= self.interval,
            "correlation sample size ({}) cannot exceed the interval ({})",
            self.sample_size,
            self.interval
        );
        ensure_config!(
            self.resolution > 0,
            "correlation resolution must be positive"
        );
        ensure_config!(
            self.crop > 0.0 && self.crop <= 1.0,
            "correlation crop must be in (0, 1], got {}",
            self.crop
        );
        Ok(())
    }
}

/// Cadence of the scalar observables.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ObservablesConfig {
    pub target: Species,
    pub polarization_interval: u64,
    pub spacing_interval: u64,
}

impl Default for ObservablesConfig {
    fn default() -> Self {
        Self {
            target: Species::Prey,
            polarization_interval: 10,
            spacing_interval: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub correlation: CorrelationConfig,
    pub observables: ObservablesConfig,
    /// Upper bound on ticks for headless runs.
    pub max_ticks: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            correlation: CorrelationConfig::default(),
            observables: ObservablesConfig::default(),
            max_ticks: 10_000,
        }
    }
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.correlation.validate()?;
        ensure_config!(
            self.observables.polarization_interval > 0,
            "polarization interval must be positive"
        );
        ensure_config!(
            self.observables.spacing_interval > 0,
            "spacing interval must be positive"
        );
        ensure_config!(self.max_ticks > 0, "max ticks must be positive");
        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Stable hash of everything that changes a run's trajectory.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.simulation).as_bytes());
        hasher.update(format!("{:?}", self.correlation).as_bytes());
        hex::encode(hasher.finalize())
    }
}
