mod common;

use common::EngineBuilder;
use flocksim_core::correlation::{correlation_function, CorrelationRequest, CorrelationTask};
use flocksim_core::{SimError, Species, SpeciesSnapshot, Vec2};

fn request() -> CorrelationRequest {
    CorrelationRequest {
        resolution: 40,
        crop: 0.5,
    }
}

fn warmed_snapshot(seed: u64) -> SpeciesSnapshot {
    let mut engine = EngineBuilder::new().with_seed(seed).build();
    for _ in 0..30 {
        engine.tick();
    }
    engine.snapshot(Species::Prey)
}

#[test]
fn test_bins_finite_and_origin_in_range() {
    let snapshot = warmed_snapshot(31);
    let c = correlation_function(&snapshot, request()).unwrap();
    assert_eq!(c.len(), 40);
    for (j, value) in c.iter().enumerate() {
        assert!(value.is_finite(), "bin {j} is not finite");
    }
    // only near-coincident pairs reach the r = 0 bin
    assert!((-1.0..=1.0).contains(&c[0]), "C(0) = {}", c[0]);
}

#[test]
fn test_velocity_translation_invariance() {
    // a common drift cancels in the fluctuations
    let snapshot = warmed_snapshot(32);
    let mut shifted = snapshot.clone();
    for v in &mut shifted.velocities {
        *v = *v + Vec2::new(3.0, -2.0);
    }
    let a = correlation_function(&snapshot, request()).unwrap();
    let b = correlation_function(&shifted, request()).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-9, "{x} vs {y}");
    }
}

#[test]
fn test_snapshot_excludes_eaten_prey() {
    let mut engine = EngineBuilder::new().with_seed(33).build();
    engine.kill(&[0, 1, 2, 3]);
    let snapshot = engine.snapshot(Species::Prey);
    assert_eq!(snapshot.len(), 36);
    assert!(correlation_function(&snapshot, request()).is_ok());
}

#[test]
fn test_background_task_matches_direct_call() {
    let snapshot = warmed_snapshot(34);
    let direct = correlation_function(&snapshot, request()).unwrap();
    let handle = CorrelationTask::spawn(snapshot, request());
    assert_eq!(handle.species(), Species::Prey);
    assert_eq!(handle.tick(), 30);
    assert_eq!(handle.wait().unwrap(), direct);
}

#[test]
fn test_engine_keeps_ticking_while_task_runs() {
    let mut engine = EngineBuilder::new().with_seed(35).build();
    let handle = CorrelationTask::spawn(engine.snapshot(Species::Predator), request());
    let frozen = engine.snapshot(Species::Predator);
    for _ in 0..5 {
        engine.tick();
    }
    // the task owns its copy; later ticks do not leak into it
    assert_eq!(
        handle.wait().unwrap(),
        correlation_function(&frozen, request()).unwrap()
    );
}

#[test]
fn test_degenerate_snapshot_reports_error() {
    let snapshot = SpeciesSnapshot {
        tick: 0,
        species: Species::Predator,
        canvas_size: 100.0,
        positions: vec![Vec2::new(1.0, 1.0), Vec2::new(9.0, 9.0)],
        velocities: vec![Vec2::new(0.0, 2.0); 2],
    };
    let err = CorrelationTask::spawn(snapshot, request()).wait().unwrap_err();
    assert!(matches!(err, SimError::DegenerateSample(_)));
}
