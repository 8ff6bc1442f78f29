//! Per-tick heading change limiter.
//!
//! Blends the unit desired heading into the old velocity with fraction
//! `alpha = min(theta, max_angle) / theta` and rescales the result to the
//! species speed. The old velocity enters at full magnitude, so at speeds
//! above 1 it dominates the blend and the actual turn stays well under
//! `alpha * theta`. This is a discrete steering-rate cap, not an angular
//! velocity integrator; speed is always preserved.

use flocksim_data::Vec2;
use rayon::prelude::*;

/// Stand-in for a NaN or exactly zero turn angle.
pub const MIN_ANGLE: f64 = 1e-5;

/// Limits the turn from `old` toward `desired` and returns a velocity of
/// magnitude `speed`.
///
/// The new heading is `alpha · desired_dir + (1 - alpha) · old`, renormalized.
/// A zero `desired` keeps the old heading, as does a blend that cancels out.
#[must_use]
pub fn limit(old: Vec2, desired: Vec2, speed: f64, max_angle: f64) -> Vec2 {
    let Some(old_dir) = old.normalized() else {
        // no previous heading to turn from
        return desired.normalized().map_or(old, |d| d * speed);
    };
    let Some(desired_dir) = desired.normalized() else {
        return old_dir * speed;
    };

    let cos_theta = old_dir.dot(desired_dir).clamp(-1.0, 1.0);
    let mut theta = cos_theta.acos();
    if theta.is_nan() || theta == 0.0 {
        theta = MIN_ANGLE;
    }
    let theta_max = theta.clamp(0.0, max_angle);
    let alpha = theta_max / theta;

    let blended = desired_dir * alpha + old * (1.0 - alpha);
    blended.normalized().unwrap_or(old_dir) * speed
}

/// Applies [`limit`] element-wise.
#[must_use]
pub fn limit_all(old: &[Vec2], desired: &[Vec2], speed: f64, max_angle: f64) -> Vec<Vec2> {
    debug_assert_eq!(old.len(), desired.len());
    old.par_iter()
        .zip(desired.par_iter())
        .map(|(&o, &d)| limit(o, d, speed, max_angle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};

    fn heading(angle: f64) -> Vec2 {
        Vec2::new(angle.cos(), angle.sin())
    }

    fn angle_between(a: Vec2, b: Vec2) -> f64 {
        (a.dot(b) / (a.norm() * b.norm())).clamp(-1.0, 1.0).acos()
    }

    #[test]
    fn test_small_turn_reaches_desired() {
        let old = heading(0.0) * 20.0;
        let desired = heading(0.2);
        let new = limit(old, desired, 20.0, FRAC_PI_6);
        assert!((new.norm() - 20.0).abs() < 1e-9);
        assert!((new * (1.0 / 20.0) - desired).norm() < 1e-9);
    }

    #[test]
    fn test_wide_turn_is_capped() {
        let old = heading(0.0) * 5.0;
        let desired = heading(FRAC_PI_2);
        let new = limit(old, desired, 5.0, FRAC_PI_6);
        assert!((new.norm() - 5.0).abs() < 1e-9);
        assert!(angle_between(old, new) <= FRAC_PI_6 + 1e-9);
        assert!(new.y > 0.0, "must turn toward the desired side");
    }

    #[test]
    fn test_blend_weights_old_velocity_by_magnitude() {
        let old = Vec2::new(20.0, 0.0);
        let desired = Vec2::new(0.0, 1.0);
        let new = limit(old, desired, 20.0, FRAC_PI_6);

        let alpha = FRAC_PI_6 / FRAC_PI_2;
        let expected = (desired * alpha + old * (1.0 - alpha))
            .normalized()
            .unwrap()
            * 20.0;
        assert!((new - expected).norm() < 1e-9, "{new:?} vs {expected:?}");
        // a fast agent turns far less than the cap
        assert!(angle_between(old, new) < 2f64.to_radians());
        assert!((new.norm() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_speed_turns_by_cap() {
        let old = heading(0.0);
        // alpha = 0.5 splits the unit chord in half
        let new = limit(old, heading(FRAC_PI_6 * 2.0), 1.0, FRAC_PI_6);
        assert!((angle_between(old, new) - FRAC_PI_6).abs() < 1e-9);
    }

    #[test]
    fn test_identical_headings_keep_speed() {
        let old = heading(1.0) * 3.0;
        let new = limit(old, heading(1.0), 3.0, FRAC_PI_4);
        assert!((new.norm() - 3.0).abs() < 1e-9);
        assert!(angle_between(old, new) < 1e-6);
    }

    #[test]
    fn test_zero_desired_keeps_heading() {
        let old = heading(0.7) * 2.0;
        let new = limit(old, Vec2::ZERO, 2.0, FRAC_PI_4);
        assert!((new - old).norm() < 1e-12);
    }

    #[test]
    fn test_opposite_half_blend_keeps_heading() {
        // alpha = (pi/2) / pi = 0.5 cancels the blend exactly
        let old = heading(0.0);
        let new = limit(old, -old, 1.0, FRAC_PI_2);
        assert!(new.is_finite());
        assert!((new - old).norm() < 1e-12);
    }

    #[test]
    fn test_max_angle_pi_allows_reversal() {
        let old = heading(0.0) * 4.0;
        let new = limit(old, heading(PI), 4.0, PI);
        assert!((new.norm() - 4.0).abs() < 1e-9);
        assert!(new.x < -3.99);
    }

    #[test]
    fn test_limit_all_matches_scalar() {
        let old = vec![heading(0.0), heading(1.0), heading(2.0)];
        let desired = vec![heading(0.5), heading(-1.0), Vec2::ZERO];
        let batch = limit_all(&old, &desired, 1.5, 0.3);
        for i in 0..3 {
            assert_eq!(batch[i], limit(old[i], desired[i], 1.5, 0.3));
        }
    }
}
