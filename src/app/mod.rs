pub mod events;
pub mod state;

pub use events::AppEvent;
pub use state::{App, RunSummary};

use std::time::Instant;

use flocksim_core::observables;
use flocksim_core::sampler::CorrelationProfile;
use flocksim_data::{KillReport, RunState};

impl App {
    /// Runs until every prey is caught or `max_ticks` ticks have elapsed,
    /// then waits for outstanding correlation samples.
    pub fn run(&mut self, max_ticks: u64) -> RunSummary {
        let mut event_count = 0usize;
        while self.running && self.engine.tick_count() < max_ticks {
            let events = self.step();
            for event in &events {
                tracing::debug!(tick = event.tick(), "{}", event.describe());
            }
            event_count += events.len();
        }

        let tick = self.engine.tick_count();
        if let Some(profile) = self.sampler.drain(tick) {
            self.record_profile(profile);
        }

        tracing::info!(
            ticks = tick,
            events = event_count,
            living_preys = self.engine.living_preys(),
            elapsed_ms = self.metrics.elapsed().as_millis() as u64,
            "Run finished"
        );
        self.summary()
    }

    /// One simulation tick plus everything scheduled around it.
    ///
    /// Observables and correlation snapshots are taken from the state the
    /// tick starts from; catches, kills and finished profiles are reported
    /// against the tick count after it.
    pub fn step(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        let tick = self.engine.tick_count();

        self.observe(tick, &mut events);

        if self.sampler.should_sample(tick) {
            let snapshot = self.engine.snapshot(self.sampler.target());
            if snapshot.len() >= 2 {
                self.sampler.submit(snapshot);
            }
        }

        let was_running = self.engine.state() == RunState::Running;
        let started = Instant::now();
        let result = self.engine.tick();
        let living = self.engine.living_preys();
        self.metrics
            .record_tick(started.elapsed(), living, result.eaten);

        let now = self.engine.tick_count();
        if result.eaten > 0 {
            tracing::info!(tick = now, eaten = result.eaten, remaining = living, "Prey caught");
            events.push(AppEvent::Caught {
                tick: now,
                count: result.eaten,
                remaining: living,
            });
        }
        if was_running && result.all_eaten {
            events.push(AppEvent::AllCaught { tick: now });
            self.running = false;
        }

        if let Some(every) = self.kill_every {
            if self.running && now % every == 0 {
                let report = self.kill();
                events.push(AppEvent::Killed {
                    tick: now,
                    count: report.killed,
                    remaining: report.remaining,
                });
                if report.all_eaten {
                    events.push(AppEvent::AllCaught { tick: now });
                    self.running = false;
                }
            }
        }

        if let Some(profile) = self.sampler.poll(now) {
            self.record_profile(profile.clone());
            events.push(AppEvent::Correlation(profile));
        }

        events
    }

    /// Removes a quarter of the living prey (at least one).
    pub fn kill(&mut self) -> KillReport {
        let report = self.engine.random_kill();
        self.metrics.record_kill(report.killed, report.remaining);
        report
    }

    fn observe(&mut self, tick: u64, events: &mut Vec<AppEvent>) {
        let cfg = &self.config.observables;
        let species = cfg.target;
        let take_polarization = tick % cfg.polarization_interval == 0;
        let take_spacing = tick % cfg.spacing_interval == 0;
        if !take_polarization && !take_spacing {
            return;
        }

        let snapshot = self.engine.snapshot(species);
        let speed = self.engine.population(species).speed();

        if take_polarization {
            if let Some(value) = observables::polarization(&snapshot.velocities, speed) {
                self.polarization_history.push((tick, value));
                events.push(AppEvent::Polarization {
                    tick,
                    species,
                    value,
                });
            }
        }
        if take_spacing {
            if let Some(value) =
                observables::mean_pairwise_distance(&snapshot.positions, snapshot.canvas_size)
            {
                self.spacing_history.push((tick, value));
                events.push(AppEvent::Spacing {
                    tick,
                    species,
                    value,
                });
            }
        }
    }

    fn record_profile(&mut self, profile: CorrelationProfile) {
        self.metrics.record_profile();
        self.profiles.push(profile);
    }
}
