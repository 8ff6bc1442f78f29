//! Spatial velocity-correlation function.
//!
//! For a snapshot of N agents, each agent's velocity fluctuation (deviation
//! from the population mean) is scaled by the population RMS fluctuation to a
//! dimensionless phase. `C(r)` is the mean phase dot-product over pairs at
//! toroidal distance about `r`, where "about" is a tanh soft step rather than
//! a hard bin edge.
//!
//! The computation is a pure function of its inputs. [`CorrelationTask`] runs
//! it on the Rayon pool against a snapshot it owns, so callers can keep
//! ticking while it works.

use crate::error::{Result, SimError};
use crate::geometry;
use flocksim_data::{Species, SpeciesSnapshot, Vec2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Width of the soft step in `w(r, d)`.
pub const SMOOTHING_EPSILON: f64 = 1e-6;

/// Radius binning for one correlation evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRequest {
    /// Number of radius bins.
    pub resolution: usize,
    /// Largest radius as a fraction of the canvas size.
    pub crop: f64,
}

impl CorrelationRequest {
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(SimError::invalid_request("resolution must be positive"));
        }
        if !(self.crop > 0.0 && self.crop <= 1.0) {
            return Err(SimError::invalid_request(format!(
                "crop must be in (0, 1], got {}",
                self.crop
            )));
        }
        Ok(())
    }

    /// Evenly spaced radii `j · crop · size / resolution` for
    /// `j in 0..resolution`.
    #[must_use]
    pub fn radii(&self, canvas_size: f64) -> Vec<f64> {
        let step = canvas_size * self.crop / self.resolution as f64;
        (0..self.resolution).map(|j| j as f64 * step).collect()
    }
}

/// `0.5 + 0.5·tanh((r - d)/ε)`: about 1 when `d < r`, about 0 when `d > r`.
#[inline]
#[must_use]
pub fn smoothed_step(r: f64, d: f64) -> f64 {
    0.5 + 0.5 * ((r - d) / SMOOTHING_EPSILON).tanh()
}

/// Mean-subtracted velocities divided by their RMS magnitude.
///
/// Fails when fewer than two agents are given or every agent moves with the
/// same velocity (no fluctuation to normalize).
pub fn phases(velocities: &[Vec2]) -> Result<Vec<Vec2>> {
    let n = velocities.len();
    if n < 2 {
        return Err(SimError::degenerate(format!(
            "need at least 2 agents, got {n}"
        )));
    }
    let inv_n = 1.0 / n as f64;
    let mean = velocities
        .iter()
        .fold(Vec2::ZERO, |acc, &v| acc + v)
        * inv_n;
    let fluctuations: Vec<Vec2> = velocities.iter().map(|&v| v - mean).collect();
    let rms = (fluctuations.iter().map(|d| d.norm_squared()).sum::<f64>() * inv_n).sqrt();
    if !(rms > 0.0 && rms.is_finite()) {
        return Err(SimError::degenerate("velocity fluctuation is zero"));
    }
    Ok(fluctuations.into_iter().map(|d| d * (1.0 / rms)).collect())
}

/// One unordered pair: toroidal distance and phase dot-product.
#[derive(Debug, Clone, Copy)]
struct PairSample {
    distance: f64,
    phase_dot: f64,
}

fn pair_samples(positions: &[Vec2], phases: &[Vec2], canvas_size: f64) -> Vec<PairSample> {
    (0..positions.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            (i + 1..positions.len()).map(move |j| PairSample {
                distance: geometry::distance(positions[i], positions[j], canvas_size),
                phase_dot: phases[i].dot(phases[j]),
            })
        })
        .collect()
}

/// Evaluates `C(r)` on `request.resolution` radii.
///
/// Self pairs never contribute. A bin whose total weight is zero (no pair
/// close to that radius) reports `0.0`.
pub fn correlation_function(
    snapshot: &SpeciesSnapshot,
    request: CorrelationRequest,
) -> Result<Vec<f64>> {
    request.validate()?;
    if snapshot.positions.len() != snapshot.velocities.len() {
        return Err(SimError::invalid_request(
            "snapshot positions and velocities differ in length",
        ));
    }

    let phases = phases(&snapshot.velocities)?;
    let pairs = pair_samples(&snapshot.positions, &phases, snapshot.canvas_size);

    let values = request
        .radii(snapshot.canvas_size)
        .into_par_iter()
        .map(|r| {
            let mut weighted = 0.0;
            let mut total = 0.0;
            for pair in &pairs {
                let w = smoothed_step(r, pair.distance);
                weighted += pair.phase_dot * w;
                total += w;
            }
            if total > 0.0 {
                weighted / total
            } else {
                0.0
            }
        })
        .collect();
    Ok(values)
}

/// Pending result of a background correlation evaluation.
pub struct CorrelationHandle {
    tick: u64,
    species: Species,
    receiver: Receiver<Result<Vec<f64>>>,
}

impl CorrelationHandle {
    /// Tick the snapshot was taken at.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn species(&self) -> Species {
        self.species
    }

    /// Non-blocking poll: `None` while the task is still running.
    ///
    /// The result is handed out once; polling again afterwards reports
    /// [`SimError::TaskDisconnected`].
    pub fn try_result(&self) -> Option<Result<Vec<f64>>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SimError::TaskDisconnected)),
        }
    }

    /// Blocks until the task finishes.
    pub fn wait(self) -> Result<Vec<f64>> {
        self.receiver
            .recv()
            .map_err(|_| SimError::TaskDisconnected)?
    }
}

/// Launcher for background correlation evaluations.
pub struct CorrelationTask;

impl CorrelationTask {
    /// Moves `snapshot` onto the Rayon pool and returns a handle to poll.
    ///
    /// There is no cancellation; dropping the handle just discards the
    /// result when it arrives.
    #[must_use]
    pub fn spawn(snapshot: SpeciesSnapshot, request: CorrelationRequest) -> CorrelationHandle {
        let (tx, rx) = mpsc::channel();
        let tick = snapshot.tick;
        let species = snapshot.species;
        rayon::spawn(move || {
            let result = correlation_function(&snapshot, request);
            if let Err(e) = &result {
                tracing::debug!(tick = snapshot.tick, error = %e, "Correlation sample failed");
            }
            let _ = tx.send(result);
        });
        CorrelationHandle {
            tick,
            species,
            receiver: rx,
        }
    }
}
