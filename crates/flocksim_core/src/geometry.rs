//! Minimum-image geometry on a square torus of side `canvas_size`.
//!
//! Every pairwise quantity in the crate goes through [`displacement`]; plain
//! Euclidean differences are never used between agents.

use flocksim_data::Vec2;
use rayon::prelude::*;

#[inline]
fn wrap_component(d: f64, canvas_size: f64) -> f64 {
    let half = canvas_size / 2.0;
    if d > half {
        d - canvas_size
    } else if d < -half {
        d + canvas_size
    } else {
        d
    }
}

/// Minimum-image vector pointing from `a` to `b`.
#[inline]
#[must_use]
pub fn displacement(a: Vec2, b: Vec2, canvas_size: f64) -> Vec2 {
    Vec2::new(
        wrap_component(b.x - a.x, canvas_size),
        wrap_component(b.y - a.y, canvas_size),
    )
}

#[inline]
#[must_use]
pub fn squared_distance(a: Vec2, b: Vec2, canvas_size: f64) -> f64 {
    displacement(a, b, canvas_size).norm_squared()
}

#[inline]
#[must_use]
pub fn distance(a: Vec2, b: Vec2, canvas_size: f64) -> f64 {
    squared_distance(a, b, canvas_size).sqrt()
}

/// Maps a position back into `[0, canvas_size)` on both axes.
#[inline]
#[must_use]
pub fn wrap(p: Vec2, canvas_size: f64) -> Vec2 {
    Vec2::new(
        wrap_coordinate(p.x, canvas_size),
        wrap_coordinate(p.y, canvas_size),
    )
}

#[inline]
fn wrap_coordinate(v: f64, canvas_size: f64) -> f64 {
    let r = v.rem_euclid(canvas_size);
    // rem_euclid rounds tiny negatives up to exactly canvas_size
    if r >= canvas_size {
        0.0
    } else {
        r
    }
}

/// Dense `rows × cols` displacement field between two point sets.
///
/// Row `i` holds the minimum-image displacements from `a[i]` to every point
/// of `b`, laid out row-major in three parallel buffers.
#[derive(Clone, Debug, Default)]
pub struct PairwiseField {
    pub rows: usize,
    pub cols: usize,
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
    pub d2: Vec<f64>,
}

impl PairwiseField {
    /// Computes the field with one Rayon task per row.
    #[must_use]
    pub fn compute(a: &[Vec2], b: &[Vec2], canvas_size: f64) -> Self {
        let rows = a.len();
        let cols = b.len();
        let mut dx = vec![0.0; rows * cols];
        let mut dy = vec![0.0; rows * cols];
        let mut d2 = vec![0.0; rows * cols];

        if cols > 0 {
            dx.par_chunks_mut(cols)
                .zip(dy.par_chunks_mut(cols))
                .zip(d2.par_chunks_mut(cols))
                .zip(a.par_iter())
                .for_each(|(((row_dx, row_dy), row_d2), &origin)| {
                    for (j, &target) in b.iter().enumerate() {
                        let d = displacement(origin, target, canvas_size);
                        row_dx[j] = d.x;
                        row_dy[j] = d.y;
                        row_d2[j] = d.norm_squared();
                    }
                });
        }

        Self {
            rows,
            cols,
            dx,
            dy,
            d2,
        }
    }

    #[inline]
    #[must_use]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    #[inline]
    #[must_use]
    pub fn displacement(&self, i: usize, j: usize) -> Vec2 {
        let idx = self.index(i, j);
        Vec2::new(self.dx[idx], self.dy[idx])
    }

    #[inline]
    #[must_use]
    pub fn row_d2(&self, i: usize) -> &[f64] {
        &self.d2[i * self.cols..(i + 1) * self.cols]
    }
}
