//! Scalar observables computed from a population's state.

use crate::geometry;
use flocksim_data::Vec2;
use rayon::prelude::*;

/// Group polarization `‖Σ v_i / speed‖ / N`.
///
/// 1 when every agent heads the same way, near 0 for random headings.
#[must_use]
pub fn polarization(velocities: &[Vec2], speed: f64) -> Option<f64> {
    if velocities.is_empty() || speed <= 0.0 {
        return None;
    }
    let sum = velocities
        .iter()
        .fold(Vec2::ZERO, |acc, &v| acc + v * (1.0 / speed));
    Some(sum.norm() / velocities.len() as f64)
}

/// Mean toroidal distance over unordered pairs.
#[must_use]
pub fn mean_pairwise_distance(positions: &[Vec2], canvas_size: f64) -> Option<f64> {
    let n = positions.len();
    if n < 2 {
        return None;
    }
    let total: f64 = (0..n)
        .into_par_iter()
        .map(|i| {
            positions[i + 1..]
                .iter()
                .map(|&q| geometry::distance(positions[i], q, canvas_size))
                .sum::<f64>()
        })
        .sum();
    let pairs = (n * (n - 1) / 2) as f64;
    Some(total / pairs)
}
