//! # A* Planning Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use nalgebra::Vector3;
use nav_lib::{
    map::GridParams,
    nav::{PathfindingEngine, PlanInput, PlannerParams, VisualisationParams},
    sim::{PerlinFieldParams, SimParams, SimWorld},
    visual::NullVisualiser,
};

fn astar_benchmark(c: &mut Criterion) {
    // ---- Build a cluttered world ----

    let sim_params = SimParams {
        agent_start_m: Vector3::new(-23.0, 0.0, -23.0),
        destination_m: Vector3::new(22.0, 0.0, 22.0),
        bounds_min_m: [-25.0, -25.0],
        bounds_max_m: [25.0, 25.0],
        perlin_field: Some(PerlinFieldParams {
            seed: 42,
            scale: 0.15,
            offset: [0.3, 0.7],
            threshold: 0.35,
            layer: 0,
        }),
        ..Default::default()
    };
    let world = SimWorld::new(&sim_params).unwrap();

    let input = PlanInput {
        agent_m: sim_params.agent_start_m,
        destination_m: sim_params.destination_m,
    };

    // 50 x 50 grid at full density
    let mut engine = PathfindingEngine::new(
        GridParams {
            width_m: 50.0,
            height_m: 50.0,
            scan_radius_m: 0.4,
            ..Default::default()
        },
        PlannerParams::default(),
        VisualisationParams::default(),
        NullVisualiser,
    );
    engine.initialise(&input).unwrap();

    c.bench_function("PathfindingEngine::refresh_and_plan", |b| {
        b.iter(|| engine.refresh_and_plan(&input, &world).unwrap())
    });

    // Quarter density for comparison
    engine.rebuild_if_density_changed(9, &input).unwrap();

    c.bench_function("PathfindingEngine::refresh_and_plan::density_9", |b| {
        b.iter(|| engine.refresh_and_plan(&input, &world).unwrap())
    });
}

criterion_group!(benches, astar_benchmark);
criterion_main!(benches);
