//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and metrics tracking for monitoring
//! simulation progress and health.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Ticks between periodic summary lines.
pub const SUMMARY_EVERY: u64 = 1000;

/// Metrics collector for simulation statistics.
pub struct Metrics {
    tick_count: AtomicU64,
    living_preys: AtomicU64,
    caught: AtomicU64,
    killed: AtomicU64,
    correlation_profiles: AtomicU64,
    busy_nanos: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            living_preys: AtomicU64::new(0),
            caught: AtomicU64::new(0),
            killed: AtomicU64::new(0),
            correlation_profiles: AtomicU64::new(0),
            busy_nanos: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, living_preys: usize, caught: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.living_preys
            .store(living_preys as u64, Ordering::Relaxed);
        self.caught.fetch_add(caught as u64, Ordering::Relaxed);
        self.busy_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % SUMMARY_EVERY == 0 {
            tracing::info!(
                tick = tick,
                living_preys = living_preys,
                caught_total = self.caught(),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_kill(&self, killed: usize, remaining: usize) {
        self.killed.fetch_add(killed as u64, Ordering::Relaxed);
        self.living_preys.store(remaining as u64, Ordering::Relaxed);
    }

    pub fn record_profile(&self) {
        self.correlation_profiles.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the current tick count.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn living_preys(&self) -> u64 {
        self.living_preys.load(Ordering::Relaxed)
    }

    /// Prey eaten by predators, not counting manual kills.
    #[must_use]
    pub fn caught(&self) -> u64 {
        self.caught.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn killed(&self) -> u64 {
        self.killed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn correlation_profiles(&self) -> u64 {
        self.correlation_profiles.load(Ordering::Relaxed)
    }

    /// Mean wall time spent inside `tick`.
    #[must_use]
    pub fn mean_tick_duration(&self) -> Duration {
        let ticks = self.tick_count();
        if ticks == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed) / ticks)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honors `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .ok();
}
