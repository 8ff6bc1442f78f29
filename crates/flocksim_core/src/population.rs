//! Structure-of-arrays state for one species.
//!
//! Agents have no identity beyond their index. Positions, velocities and
//! alive flags live in parallel buffers of equal length; predators simply
//! never clear their alive flag.

use crate::error::{Result, SimError};
use crate::geometry;
use flocksim_data::{Species, SpeciesSnapshot, Vec2};
use rand::Rng;
use rand_distr::StandardNormal;

/// Relative tolerance for the constant-speed invariant.
pub const SPEED_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct Population {
    species: Species,
    speed: f64,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    alive: Vec<bool>,
}

impl Population {
    /// Places `count` agents uniformly in the square
    /// `[(0.5 - gen_bound)·size, (0.5 + gen_bound)·size)` (wrapped back onto
    /// the torus) with standard-normal headings scaled to `speed`.
    pub fn spawn<R: Rng + ?Sized>(
        species: Species,
        count: usize,
        canvas_size: f64,
        gen_bound: f64,
        speed: f64,
        rng: &mut R,
    ) -> Self {
        let lo = (0.5 - gen_bound) * canvas_size;
        let hi = (0.5 + gen_bound) * canvas_size;

        let positions = (0..count)
            .map(|_| {
                let p = Vec2::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi));
                geometry::wrap(p, canvas_size)
            })
            .collect();
        let velocities = (0..count)
            .map(|_| random_heading(rng) * speed)
            .collect();

        Self {
            species,
            speed,
            positions,
            velocities,
            alive: vec![true; count],
        }
    }

    /// Builds a population from explicit buffers.
    ///
    /// Velocities are rescaled to `speed` and positions wrapped, so the
    /// invariants hold from the start. Buffers of different length are a
    /// configuration error.
    pub fn from_parts(
        species: Species,
        speed: f64,
        canvas_size: f64,
        positions: Vec<Vec2>,
        velocities: Vec<Vec2>,
    ) -> Result<Self> {
        if positions.len() != velocities.len() {
            return Err(SimError::invalid_config(format!(
                "{species} positions ({}) and velocities ({}) differ in length",
                positions.len(),
                velocities.len()
            )));
        }
        let count = positions.len();
        Ok(Self {
            species,
            speed,
            positions: positions
                .into_iter()
                .map(|p| geometry::wrap(p, canvas_size))
                .collect(),
            velocities: velocities
                .into_iter()
                .map(|v| v.normalized().unwrap_or(Vec2::new(1.0, 0.0)) * speed)
                .collect(),
            alive: vec![true; count],
        })
    }

    #[must_use]
    pub fn species(&self) -> Species {
        self.species
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    #[must_use]
    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    #[must_use]
    pub fn alive(&self) -> &[bool] {
        &self.alive
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn living_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    #[must_use]
    pub fn all_dead(&self) -> bool {
        !self.alive.iter().any(|&a| a)
    }

    pub fn living_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| a.then_some(i))
    }

    /// Moves every living agent by its velocity and wraps onto the torus.
    pub fn advance(&mut self, canvas_size: f64) {
        for ((p, v), &alive) in self
            .positions
            .iter_mut()
            .zip(&self.velocities)
            .zip(&self.alive)
        {
            if alive {
                *p = geometry::wrap(*p + *v, canvas_size);
            }
        }
    }

    /// Replaces velocities of living agents; entries for dead agents are
    /// ignored.
    pub fn set_velocities(&mut self, velocities: &[Vec2]) {
        debug_assert_eq!(velocities.len(), self.len());
        for ((v, &new), &alive) in self
            .velocities
            .iter_mut()
            .zip(velocities)
            .zip(&self.alive)
        {
            if alive {
                *v = new;
            }
        }
    }

    /// Flags agent `idx` as eaten. Returns `true` only on the alive → eaten
    /// transition; the flag never goes back.
    pub fn mark_eaten(&mut self, idx: usize) -> bool {
        match self.alive.get_mut(idx) {
            Some(flag) if *flag => {
                *flag = false;
                true
            }
            _ => false,
        }
    }

    /// Copies the living members out for off-thread analysis.
    #[must_use]
    pub fn snapshot(&self, tick: u64, canvas_size: f64) -> SpeciesSnapshot {
        let (positions, velocities) = self
            .living_indices()
            .map(|i| (self.positions[i], self.velocities[i]))
            .unzip();
        SpeciesSnapshot {
            tick,
            species: self.species,
            canvas_size,
            positions,
            velocities,
        }
    }

    /// Finite state, positions on the torus, constant speed for the living.
    #[must_use]
    pub fn invariants_hold(&self, canvas_size: f64) -> bool {
        self.positions.iter().all(|p| {
            p.is_finite() && (0.0..canvas_size).contains(&p.x) && (0.0..canvas_size).contains(&p.y)
        }) && self
            .velocities
            .iter()
            .zip(&self.alive)
            .filter(|(_, &alive)| alive)
            .all(|(v, _)| v.is_finite() && (v.norm() - self.speed).abs() <= SPEED_TOLERANCE * self.speed)
    }

    /// Debug-build check of [`Population::invariants_hold`]. Violations are
    /// kernel bugs, so they abort loudly.
    #[inline]
    pub fn debug_check_invariants(&self, canvas_size: f64) {
        debug_assert!(
            self.invariants_hold(canvas_size),
            "{} population invariants violated",
            self.species
        );
    }
}

/// Unit vector with a direction drawn from an isotropic normal.
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let v = Vec2::new(rng.sample(StandardNormal), rng.sample(StandardNormal));
        if let Some(unit) = v.normalized() {
            return unit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_spawn_inside_bound_with_speed() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pop = Population::spawn(Species::Prey, 50, 100.0, 0.1, 3.0, &mut rng);
        assert_eq!(pop.len(), 50);
        assert_eq!(pop.living_count(), 50);
        for p in pop.positions() {
            assert!(p.x >= 40.0 && p.x < 60.0);
            assert!(p.y >= 40.0 && p.y < 60.0);
        }
        assert!(pop.invariants_hold(100.0));
    }

    #[test]
    fn test_spawn_wide_bound_wraps() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let pop = Population::spawn(Species::Predator, 200, 100.0, 3.0, 1.0, &mut rng);
        assert!(pop.invariants_hold(100.0));
    }

    #[test]
    fn test_advance_wraps_and_skips_dead() {
        let mut pop = Population::from_parts(
            Species::Prey,
            5.0,
            100.0,
            vec![Vec2::new(98.0, 50.0), Vec2::new(10.0, 10.0)],
            vec![Vec2::new(1.0, 0.0), Vec2::new(0.0, -1.0)],
        )
        .unwrap();
        pop.mark_eaten(1);
        pop.advance(100.0);
        assert_eq!(pop.positions()[0], Vec2::new(3.0, 50.0));
        assert_eq!(pop.positions()[1], Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_mark_eaten_is_one_way() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut pop = Population::spawn(Species::Prey, 3, 100.0, 0.5, 1.0, &mut rng);
        assert!(pop.mark_eaten(1));
        assert!(!pop.mark_eaten(1));
        assert!(!pop.mark_eaten(7));
        assert_eq!(pop.living_count(), 2);
        assert_eq!(pop.living_indices().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_snapshot_filters_dead() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut pop = Population::spawn(Species::Prey, 4, 100.0, 0.5, 1.0, &mut rng);
        pop.mark_eaten(0);
        pop.mark_eaten(3);
        let snap = pop.snapshot(12, 100.0);
        assert_eq!(snap.tick, 12);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.positions[0], pop.positions()[1]);
        assert_eq!(snap.velocities[1], pop.velocities()[2]);
    }

    #[test]
    fn test_broken_speed_detected() {
        let mut pop = Population::from_parts(
            Species::Predator,
            2.0,
            100.0,
            vec![Vec2::new(1.0, 1.0)],
            vec![Vec2::new(0.0, 1.0)],
        )
        .unwrap();
        assert!(pop.invariants_hold(100.0));
        pop.set_velocities(&[Vec2::new(0.0, 3.0)]);
        assert!(!pop.invariants_hold(100.0));
    }

    #[test]
    fn test_mismatched_buffers_rejected() {
        let result = Population::from_parts(
            Species::Prey,
            1.0,
            100.0,
            vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)],
            vec![Vec2::new(0.0, 1.0)],
        );
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }
}
