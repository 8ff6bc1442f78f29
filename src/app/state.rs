use anyhow::{Context, Result};
use serde::Serialize;

use flocksim_core::sampler::{CorrelationProfile, CorrelationSampler};
use flocksim_core::{AppConfig, Metrics, SimulationEngine};
use flocksim_data::RunState;

pub struct App {
    pub running: bool,
    pub config: AppConfig,
    pub engine: SimulationEngine,
    pub sampler: CorrelationSampler,
    pub metrics: Metrics,
    /// Remove a quarter of the living prey every this many ticks.
    pub kill_every: Option<u64>,
    // History
    pub profiles: Vec<CorrelationProfile>,
    pub polarization_history: Vec<(u64, f64)>,
    pub spacing_history: Vec<(u64, f64)>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let engine =
            SimulationEngine::new(config.simulation.clone()).context("failed to build engine")?;
        let sampler =
            CorrelationSampler::new(config.correlation.clone(), config.simulation.canvas_size);

        tracing::info!(
            fingerprint = %config.fingerprint(),
            preys = config.simulation.num_preys,
            predators = config.simulation.num_predators,
            "Simulation ready"
        );

        Ok(Self {
            running: true,
            config,
            engine,
            sampler,
            metrics: Metrics::new(),
            kill_every: None,
            profiles: Vec::new(),
            polarization_history: Vec::new(),
            spacing_history: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_kill_every(mut self, every: Option<u64>) -> Self {
        self.kill_every = every.filter(|&n| n > 0);
        self
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            fingerprint: self.config.fingerprint(),
            ticks: self.engine.tick_count(),
            state: self.engine.state(),
            living_preys: self.engine.living_preys(),
            caught: self.metrics.caught(),
            killed: self.metrics.killed(),
            mean_tick_us: self.metrics.mean_tick_duration().as_micros() as u64,
            correlation_profiles: self.metrics.correlation_profiles(),
            pending_samples: self.sampler.pending(),
            dropped_samples: self.sampler.dropped(),
            final_polarization: self.polarization_history.last().map(|&(_, p)| p),
            final_spacing: self.spacing_history.last().map(|&(_, d)| d),
            profiles: self.profiles.clone(),
        }
    }
}

/// End-of-run report printed by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub fingerprint: String,
    pub ticks: u64,
    pub state: RunState,
    pub living_preys: usize,
    pub caught: u64,
    pub killed: u64,
    pub mean_tick_us: u64,
    pub correlation_profiles: u64,
    /// Samples still being evaluated when the summary was taken.
    pub pending_samples: usize,
    pub dropped_samples: usize,
    pub final_polarization: Option<f64>,
    pub final_spacing: Option<f64>,
    pub profiles: Vec<CorrelationProfile>,
}
