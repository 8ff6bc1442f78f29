//! k-nearest-neighbor attraction/repulsion kernel.
//!
//! For every agent of a set A the kernel picks the `k` nearest agents of a set
//! B on the torus and returns a unit vector pointing along their
//! inverse-cube-weighted displacement, so nearer targets dominate. Repulsion
//! is the exact negation.
//!
//! Rows with no selectable neighbor, or whose weighted sum has no usable
//! norm, come back as [`Vec2::ZERO`]; callers treat that as "no contribution".

use crate::geometry::PairwiseField;
use flocksim_data::Vec2;
use rayon::prelude::*;

/// Distances are floored to this before cubing.
pub const MIN_DISTANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy)]
pub struct ForceKernel {
    pub canvas_size: f64,
}

impl ForceKernel {
    #[must_use]
    pub fn new(canvas_size: f64) -> Self {
        Self { canvas_size }
    }

    /// Unit vectors from each `a[i]` toward its `k` nearest selectable `b`.
    ///
    /// `alive`, when given, must be as long as `b`; entries flagged `false`
    /// are never selected. With `exclude_self` the sets are the same
    /// population and `b[i]` is skipped for row `i`.
    #[must_use]
    pub fn attract(
        &self,
        a: &[Vec2],
        b: &[Vec2],
        k: usize,
        exclude_self: bool,
        alive: Option<&[bool]>,
    ) -> Vec<Vec2> {
        if let Some(mask) = alive {
            debug_assert_eq!(mask.len(), b.len(), "alive mask must cover every target");
        }
        if a.is_empty() {
            return Vec::new();
        }
        if b.is_empty() || k == 0 {
            return vec![Vec2::ZERO; a.len()];
        }

        let field = PairwiseField::compute(a, b, self.canvas_size);

        (0..a.len())
            .into_par_iter()
            .map_init(Vec::new, |candidates: &mut Vec<(f64, usize)>, i| {
                candidates.clear();
                let row = field.row_d2(i);
                // dead or self entries never become candidates
                candidates.extend(
                    row.iter()
                        .enumerate()
                        .filter(|&(j, _)| {
                            alive.map_or(true, |m| m[j]) && !(exclude_self && i == j)
                        })
                        .map(|(j, &d2)| (d2, j)),
                );
                nearest_weighted_direction(&field, i, candidates, k)
            })
            .collect()
    }

    /// Negation of [`ForceKernel::attract`] for identical inputs.
    #[must_use]
    pub fn repulse(
        &self,
        a: &[Vec2],
        b: &[Vec2],
        k: usize,
        exclude_self: bool,
        alive: Option<&[bool]>,
    ) -> Vec<Vec2> {
        self.attract(a, b, k, exclude_self, alive)
            .into_iter()
            .map(|v| -v)
            .collect()
    }
}

fn nearest_weighted_direction(
    field: &PairwiseField,
    row: usize,
    candidates: &mut [(f64, usize)],
    k: usize,
) -> Vec2 {
    let k_eff = k.min(candidates.len());
    if k_eff == 0 {
        return Vec2::ZERO;
    }
    if k_eff < candidates.len() {
        candidates.select_nth_unstable_by(k_eff - 1, |l, r| l.0.total_cmp(&r.0));
    }

    let mut weighted = Vec2::ZERO;
    let mut cube_sum = 0.0;
    for &(d2, j) in &candidates[..k_eff] {
        let d3 = d2.sqrt().max(MIN_DISTANCE).powi(3);
        weighted += field.displacement(row, j) * (1.0 / d3);
        cube_sum += d3;
    }

    (weighted * (1.0 / cube_sum))
        .normalized()
        .unwrap_or(Vec2::ZERO)
}
