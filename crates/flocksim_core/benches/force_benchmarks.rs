use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flocksim_core::config::SimulationConfig;
use flocksim_core::engine::SimulationEngine;
use flocksim_core::force::ForceKernel;
use flocksim_core::Vec2;

fn grid(count: usize, spacing: f64) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let x = (i % 50) as f64 * spacing;
            let y = (i / 50) as f64 * spacing;
            Vec2::new(x, y)
        })
        .collect()
}

fn bench_attract_cross_species(c: &mut Criterion) {
    let preys = grid(1000, 10.0);
    let predators = grid(50, 9.0);
    let kernel = ForceKernel::new(1000.0);

    c.bench_function("attract_50_to_1000_k1", |b| {
        b.iter(|| black_box(kernel.attract(&predators, &preys, 1, false, None)))
    });
}

fn bench_repulse_same_species(c: &mut Criterion) {
    let preys = grid(1000, 10.0);
    let alive = vec![true; preys.len()];
    let kernel = ForceKernel::new(1000.0);

    c.bench_function("repulse_1000_self_k3", |b| {
        b.iter(|| black_box(kernel.repulse(&preys, &preys, 3, true, Some(&alive))))
    });
}

fn bench_engine_tick(c: &mut Criterion) {
    let config = SimulationConfig {
        num_preys: 200,
        num_predators: 20,
        seed: Some(42),
        ..SimulationConfig::default()
    };
    let mut engine = SimulationEngine::new(config).unwrap();

    c.bench_function("engine_tick_200_20", |b| {
        b.iter(|| black_box(engine.tick()))
    });
}

criterion_group!(
    benches,
    bench_attract_cross_species,
    bench_repulse_same_species,
    bench_engine_tick
);
criterion_main!(benches);
