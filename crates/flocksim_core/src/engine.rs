//! The tick orchestrator.
//!
//! One tick runs in a fixed order: prey move and re-steer, then predators
//! move, eat and re-steer. Changing the order changes short-term dynamics, so
//! seeded runs are only reproducible with it intact.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::force::ForceKernel;
use crate::geometry::PairwiseField;
use crate::population::Population;
use crate::steering;
use flocksim_data::{KillReport, RunState, Species, SpeciesSnapshot, TickResult, Vec2};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Standard deviation of the per-axis heading noise.
pub const NOISE_SIGMA: f64 = 1e-3;
/// Neighbors followed within the same species.
pub const SAME_SPECIES_NEIGHBORS: usize = 3;
/// Neighbors followed across species.
pub const CROSS_SPECIES_NEIGHBORS: usize = 1;

pub struct SimulationEngine {
    config: SimulationConfig,
    kernel: ForceKernel,
    preys: Population,
    predators: Population,
    rng: ChaCha8Rng,
    tick: u64,
    state: RunState,
}

impl SimulationEngine {
    /// Validates `config` and spawns both species, seeding from
    /// `config.seed` or from entropy.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Like [`SimulationEngine::new`] with an explicit random source, which
    /// drives placement, headings, noise and random kills.
    pub fn with_rng(config: SimulationConfig, mut rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        let (preys, predators) = Self::spawn_populations(&config, &mut rng);
        tracing::debug!(
            preys = config.num_preys,
            predators = config.num_predators,
            canvas_size = config.canvas_size,
            "Simulation initialized"
        );
        Ok(Self {
            kernel: ForceKernel::new(config.canvas_size),
            preys,
            predators,
            rng,
            tick: 0,
            state: RunState::Running,
            config,
        })
    }

    /// Builds an engine around hand-placed populations.
    ///
    /// Speeds are taken from `config`; population sizes override its counts.
    pub fn from_populations(
        config: SimulationConfig,
        prey_positions: Vec<Vec2>,
        prey_velocities: Vec<Vec2>,
        predator_positions: Vec<Vec2>,
        predator_velocities: Vec<Vec2>,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        let config = SimulationConfig {
            num_preys: prey_positions.len(),
            num_predators: predator_positions.len(),
            ..config
        };
        config.validate()?;
        let preys = Population::from_parts(
            Species::Prey,
            config.speed_preys,
            config.canvas_size,
            prey_positions,
            prey_velocities,
        )?;
        let predators = Population::from_parts(
            Species::Predator,
            config.speed_predators,
            config.canvas_size,
            predator_positions,
            predator_velocities,
        )?;
        Ok(Self {
            kernel: ForceKernel::new(config.canvas_size),
            preys,
            predators,
            rng,
            tick: 0,
            state: RunState::Running,
            config,
        })
    }

    /// Replaces parameters and respawns both species. The random source
    /// carries on unless the new config sets a seed.
    pub fn reset(&mut self, config: SimulationConfig) -> Result<()> {
        config.validate()?;
        if let Some(seed) = config.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        let (preys, predators) = Self::spawn_populations(&config, &mut self.rng);
        self.preys = preys;
        self.predators = predators;
        self.kernel = ForceKernel::new(config.canvas_size);
        self.tick = 0;
        self.state = RunState::Running;
        self.config = config;
        tracing::info!("Simulation reset");
        Ok(())
    }

    fn spawn_populations(
        config: &SimulationConfig,
        rng: &mut ChaCha8Rng,
    ) -> (Population, Population) {
        let preys = Population::spawn(
            Species::Prey,
            config.num_preys,
            config.canvas_size,
            config.gen_bound,
            config.speed_preys,
            rng,
        );
        let predators = Population::spawn(
            Species::Predator,
            config.num_predators,
            config.canvas_size,
            config.gen_bound,
            config.speed_predators,
            rng,
        );
        (preys, predators)
    }

    /// Advances the simulation by one tick.
    ///
    /// Once every prey is eaten the engine stays terminal: predators keep
    /// drifting on their last heading and no kernel runs against the empty
    /// prey set.
    pub fn tick(&mut self) -> TickResult {
        self.tick += 1;

        if self.state == RunState::Terminal {
            self.predators.advance(self.config.canvas_size);
            return TickResult {
                eaten: 0,
                all_eaten: true,
            };
        }

        self.update_preys();
        let eaten = self.update_predators();
        let all_eaten = self.refresh_state();

        self.preys.debug_check_invariants(self.config.canvas_size);
        self.predators
            .debug_check_invariants(self.config.canvas_size);

        tracing::debug!(
            tick = self.tick,
            eaten,
            living = self.preys.living_count(),
            "Tick complete"
        );

        TickResult { eaten, all_eaten }
    }

    fn update_preys(&mut self) {
        let size = self.config.canvas_size;
        self.preys.advance(size);

        let positions = self.preys.positions();
        let flee_predators = self.kernel.repulse(
            positions,
            self.predators.positions(),
            CROSS_SPECIES_NEIGHBORS,
            false,
            None,
        );
        let avoid_crowding = self.kernel.repulse(
            positions,
            positions,
            SAME_SPECIES_NEIGHBORS,
            true,
            Some(self.preys.alive()),
        );

        let desired: Vec<Vec2> = flee_predators
            .into_iter()
            .zip(avoid_crowding)
            .map(|(flee, crowd)| flee + crowd * self.config.repulse_factor_preys)
            .collect();

        let velocities = self.steer(&desired, Species::Prey);
        self.preys.set_velocities(&velocities);
    }

    /// Returns how many prey were caught.
    fn update_predators(&mut self) -> usize {
        let size = self.config.canvas_size;
        self.predators.advance(size);

        let eaten = self.eat_preys();
        if self.preys.all_dead() {
            return eaten;
        }

        let positions = self.predators.positions();
        let pursue = self.kernel.attract(
            positions,
            self.preys.positions(),
            CROSS_SPECIES_NEIGHBORS,
            false,
            Some(self.preys.alive()),
        );
        let keep_apart = self.kernel.repulse(
            positions,
            positions,
            SAME_SPECIES_NEIGHBORS,
            true,
            None,
        );

        let desired: Vec<Vec2> = pursue
            .into_iter()
            .zip(keep_apart)
            .map(|(chase, apart)| chase + apart * self.config.repulse_factor_predators)
            .collect();

        let velocities = self.steer(&desired, Species::Predator);
        self.predators.set_velocities(&velocities);
        eaten
    }

    /// Any living prey within one tick's travel of any predator is eaten.
    fn eat_preys(&mut self) -> usize {
        let catch_range_sq = self.config.speed_predators * self.config.speed_predators;
        let field = PairwiseField::compute(
            self.predators.positions(),
            self.preys.positions(),
            self.config.canvas_size,
        );

        let caught: Vec<usize> = self
            .preys
            .living_indices()
            .filter(|&j| (0..field.rows).any(|i| field.d2[field.index(i, j)] < catch_range_sq))
            .collect();

        let mut eaten = 0;
        for j in caught {
            if self.preys.mark_eaten(j) {
                eaten += 1;
            }
        }
        eaten
    }

    /// Normalize, add noise, normalize again, then limit the turn.
    ///
    /// A zero desired vector after either normalization keeps the current
    /// heading for that agent.
    fn steer(&mut self, desired: &[Vec2], species: Species) -> Vec<Vec2> {
        let population = match species {
            Species::Prey => &self.preys,
            Species::Predator => &self.predators,
        };
        let alive = population.alive();
        let old = population.velocities();

        let mut headings = Vec::with_capacity(desired.len());
        for (i, &d) in desired.iter().enumerate() {
            if !alive[i] {
                headings.push(Vec2::ZERO);
                continue;
            }
            let heading = match d.normalized() {
                Some(unit) => {
                    let nx: f64 = self.rng.sample(StandardNormal);
                    let ny: f64 = self.rng.sample(StandardNormal);
                    let noise = Vec2::new(nx, ny) * NOISE_SIGMA;
                    (unit + noise).normalized().unwrap_or(Vec2::ZERO)
                }
                None => Vec2::ZERO,
            };
            headings.push(heading);
        }

        steering::limit_all(
            old,
            &headings,
            population.speed(),
            self.config.max_turning_angle,
        )
    }

    fn refresh_state(&mut self) -> bool {
        if self.state == RunState::Running && self.preys.all_dead() {
            self.state = RunState::Terminal;
            tracing::info!(tick = self.tick, "All preys eaten");
        }
        self.state == RunState::Terminal
    }

    /// Marks the given prey eaten outside the normal tick.
    ///
    /// Indices that are out of range or already eaten are skipped and not
    /// counted.
    pub fn kill(&mut self, indices: &[usize]) -> KillReport {
        let mut killed = 0;
        for &idx in indices {
            if self.preys.mark_eaten(idx) {
                killed += 1;
            }
        }
        let all_eaten = self.refresh_state();
        self.preys.debug_check_invariants(self.config.canvas_size);

        let report = KillReport {
            killed,
            remaining: self.preys.living_count(),
            all_eaten,
        };
        tracing::info!(
            tick = self.tick,
            killed = report.killed,
            remaining = report.remaining,
            "Preys killed"
        );
        report
    }

    /// Kills `max(1, living / 4)` living prey chosen uniformly without
    /// replacement.
    pub fn random_kill(&mut self) -> KillReport {
        let living: Vec<usize> = self.preys.living_indices().collect();
        if living.is_empty() {
            return self.kill(&[]);
        }
        let amount = (living.len() / 4).max(1);
        let picks: Vec<usize> = index::sample(&mut self.rng, living.len(), amount)
            .into_iter()
            .map(|k| living[k])
            .collect();
        self.kill(&picks)
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn preys(&self) -> &Population {
        &self.preys
    }

    #[must_use]
    pub fn predators(&self) -> &Population {
        &self.predators
    }

    #[must_use]
    pub fn population(&self, species: Species) -> &Population {
        match species {
            Species::Prey => &self.preys,
            Species::Predator => &self.predators,
        }
    }

    #[must_use]
    pub fn living_preys(&self) -> usize {
        self.preys.living_count()
    }

    #[must_use]
    pub fn all_preys_eaten(&self) -> bool {
        self.preys.all_dead()
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Frozen copy of one species' living members at the current tick.
    #[must_use]
    pub fn snapshot(&self, species: Species) -> SpeciesSnapshot {
        self.population(species)
            .snapshot(self.tick, self.config.canvas_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            canvas_size: 1000.0,
            gen_bound: 0.2,
            num_preys: 30,
            num_predators: 4,
            speed_preys: 2.0,
            speed_predators: 3.0,
            repulse_factor_preys: 0.5,
            repulse_factor_predators: 0.5,
            max_turning_angle: 0.4,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimulationConfig {
            num_preys: 0,
            ..small_config(1)
        };
        assert!(SimulationEngine::new(config).is_err());
    }

    #[test]
    fn test_tick_counter_and_invariants() {
        let mut engine = SimulationEngine::new(small_config(5)).unwrap();
        for _ in 0..20 {
            engine.tick();
        }
        assert_eq!(engine.tick_count(), 20);
        assert!(engine.preys().invariants_hold(1000.0));
        assert!(engine.predators().invariants_hold(1000.0));
    }

    #[test]
    fn test_predator_catches_adjacent_prey() {
        let engine_config = small_config(9);
        let mut engine = SimulationEngine::from_populations(
            engine_config,
            vec![Vec2::new(500.0, 500.0), Vec2::new(100.0, 100.0)],
            vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)],
            vec![Vec2::new(500.0, 505.0)],
            vec![Vec2::new(0.0, -1.0)],
            ChaCha8Rng::seed_from_u64(9),
        )
        .unwrap();
        let result = engine.tick();
        assert_eq!(result.eaten, 1);
        assert!(!result.all_eaten);
        assert!(!engine.preys().alive()[0]);
        assert!(engine.preys().alive()[1]);
    }

    #[test]
    fn test_mismatched_placement_is_config_error() {
        let result = SimulationEngine::from_populations(
            small_config(10),
            vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)],
            vec![Vec2::new(1.0, 0.0)],
            vec![Vec2::new(50.0, 50.0)],
            vec![Vec2::new(0.0, 1.0)],
            ChaCha8Rng::seed_from_u64(10),
        );
        assert!(matches!(
            result,
            Err(crate::error::SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_random_kill_quarter_of_living() {
        let mut engine = SimulationEngine::new(SimulationConfig {
            num_preys: 8,
            ..small_config(3)
        })
        .unwrap();
        let report = engine.random_kill();
        assert_eq!(report.killed, 2);
        assert_eq!(report.remaining, 6);
        assert!(!report.all_eaten);
    }

    #[test]
    fn test_kill_skips_dead_and_out_of_range() {
        let mut engine = SimulationEngine::new(small_config(4)).unwrap();
        let first = engine.kill(&[0, 1]);
        assert_eq!(first.killed, 2);
        let second = engine.kill(&[1, 2, 999]);
        assert_eq!(second.killed, 1);
        assert_eq!(second.remaining, 27);
    }

    #[test]
    fn test_kill_everything_is_terminal() {
        let mut engine = SimulationEngine::new(small_config(6)).unwrap();
        let all: Vec<usize> = (0..30).collect();
        let report = engine.kill(&all);
        assert!(report.all_eaten);
        assert_eq!(engine.state(), RunState::Terminal);
        let result = engine.tick();
        assert_eq!(result, TickResult { eaten: 0, all_eaten: true });
    }

    #[test]
    fn test_reset_restores_running_state() {
        let mut engine = SimulationEngine::new(small_config(8)).unwrap();
        engine.kill(&(0..30).collect::<Vec<_>>());
        engine.reset(small_config(8)).unwrap();
        assert_eq!(engine.state(), RunState::Running);
        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.living_preys(), 30);
    }

    #[test]
    fn test_reset_rejects_invalid_config() {
        let mut engine = SimulationEngine::new(small_config(8)).unwrap();
        let bad = SimulationConfig {
            canvas_size: -1.0,
            ..small_config(8)
        };
        assert!(engine.reset(bad).is_err());
        assert_eq!(engine.config().canvas_size, 1000.0);
    }
}
