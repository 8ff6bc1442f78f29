//! Scheduling and averaging of correlation samples.
//!
//! Samples are taken on the last `sample_size` ticks of every `interval`-tick
//! window, evaluated in the background, and averaged element-wise once
//! `sample_size` results have come back. Results from different snapshots
//! are never checked for staleness.

use crate::config::CorrelationConfig;
use crate::correlation::{CorrelationHandle, CorrelationRequest, CorrelationTask};
use flocksim_data::{Species, SpeciesSnapshot};
use serde::{Deserialize, Serialize};

/// Averaged correlation function over one sampling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationProfile {
    /// Tick at which the averaged profile was completed.
    pub tick: u64,
    pub species: Species,
    pub radii: Vec<f64>,
    pub values: Vec<f64>,
    pub samples: usize,
}

pub struct CorrelationSampler {
    config: CorrelationConfig,
    canvas_size: f64,
    pending: Vec<CorrelationHandle>,
    accumulated: Vec<Vec<f64>>,
    dropped: usize,
}

impl CorrelationSampler {
    #[must_use]
    pub fn new(config: CorrelationConfig, canvas_size: f64) -> Self {
        Self {
            config,
            canvas_size,
            pending: Vec::new(),
            accumulated: Vec::new(),
            dropped: 0,
        }
    }

    #[must_use]
    pub fn request(&self) -> CorrelationRequest {
        CorrelationRequest {
            resolution: self.config.resolution,
            crop: self.config.crop,
        }
    }

    #[must_use]
    pub fn target(&self) -> Species {
        self.config.target
    }

    /// Whether `tick` falls in the sampling tail of its window.
    #[must_use]
    pub fn should_sample(&self, tick: u64) -> bool {
        self.config.enabled
            && tick % self.config.interval >= self.config.interval - self.config.sample_size as u64
    }

    /// Starts a background evaluation of `snapshot`.
    pub fn submit(&mut self, snapshot: SpeciesSnapshot) {
        self.pending
            .push(CorrelationTask::spawn(snapshot, self.request()));
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn accumulated(&self) -> usize {
        self.accumulated.len()
    }

    /// Samples discarded because their snapshot was degenerate.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Fraction of the current buffer that is filled, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.accumulated.len() as f64 / self.config.sample_size as f64).min(1.0)
    }

    /// Collects finished tasks without blocking and returns a profile when the
    /// buffer is full.
    pub fn poll(&mut self, tick: u64) -> Option<CorrelationProfile> {
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for handle in self.pending.drain(..) {
            match handle.try_result() {
                None => still_pending.push(handle),
                Some(Ok(values)) => self.accumulated.push(values),
                Some(Err(e)) => {
                    self.dropped += 1;
                    tracing::warn!(sample_tick = handle.tick(), error = %e, "Correlation sample dropped");
                }
            }
        }
        self.pending = still_pending;
        self.try_complete(tick)
    }

    /// Blocks on every pending task, then behaves like [`CorrelationSampler::poll`].
    pub fn drain(&mut self, tick: u64) -> Option<CorrelationProfile> {
        for handle in std::mem::take(&mut self.pending) {
            let sample_tick = handle.tick();
            match handle.wait() {
                Ok(values) => self.accumulated.push(values),
                Err(e) => {
                    self.dropped += 1;
                    tracing::warn!(sample_tick, error = %e, "Correlation sample dropped");
                }
            }
        }
        self.try_complete(tick)
    }

    fn try_complete(&mut self, tick: u64) -> Option<CorrelationProfile> {
        if self.accumulated.len() < self.config.sample_size {
            return None;
        }
        let samples = std::mem::take(&mut self.accumulated);
        let values = average(&samples);
        let profile = CorrelationProfile {
            tick,
            species: self.config.target,
            radii: self.request().radii(self.canvas_size),
            values,
            samples: samples.len(),
        };
        tracing::info!(
            tick,
            species = %profile.species,
            samples = profile.samples,
            "Correlation profile averaged"
        );
        Some(profile)
    }
}

/// Element-wise mean of equally long sample vectors.
#[must_use]
pub fn average(samples: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0; first.len()];
    for sample in samples {
        for (acc, v) in sum.iter_mut().zip(sample) {
            *acc += v;
        }
    }
    let n = samples.len() as f64;
    sum.into_iter().map(|s| s / n).collect()
}
