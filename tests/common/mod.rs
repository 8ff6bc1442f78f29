pub mod macros;

use flocksim_core::{SimulationConfig, SimulationEngine, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[allow(dead_code)]
pub struct EngineBuilder {
    config: SimulationConfig,
    seed: u64,
    preys: Vec<(Vec2, Vec2)>,
    predators: Vec<(Vec2, Vec2)>,
}

#[allow(dead_code)]
impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig {
                canvas_size: 1_000.0,
                num_preys: 40,
                num_predators: 4,
                speed_preys: 5.0,
                speed_predators: 5.0,
                ..SimulationConfig::default()
            },
            seed: 0,
            preys: Vec::new(),
            predators: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.config.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimulationConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Hand-places a prey. Once any agent is placed, spawning is skipped.
    pub fn with_prey(mut self, position: (f64, f64), heading: (f64, f64)) -> Self {
        self.preys
            .push((Vec2::new(position.0, position.1), Vec2::new(heading.0, heading.1)));
        self
    }

    pub fn with_predator(mut self, position: (f64, f64), heading: (f64, f64)) -> Self {
        self.predators
            .push((Vec2::new(position.0, position.1), Vec2::new(heading.0, heading.1)));
        self
    }

    pub fn build(self) -> SimulationEngine {
        if self.preys.is_empty() && self.predators.is_empty() {
            return SimulationEngine::new(self.config).expect("Failed to create engine in test builder");
        }
        let (prey_pos, prey_vel) = self.preys.into_iter().unzip();
        let (pred_pos, pred_vel) = self.predators.into_iter().unzip();
        SimulationEngine::from_populations(
            self.config,
            prey_pos,
            prey_vel,
            pred_pos,
            pred_vel,
            ChaCha8Rng::seed_from_u64(self.seed),
        )
        .expect("Failed to place populations in test builder")
    }
}
