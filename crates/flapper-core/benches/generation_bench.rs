use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use flapper_core::{
    CollisionMask, ControllerBinding, GenerationRunner, GenerationSim, NoopObserver, Observation,
    SimConfig, SpriteSet,
};
use glam::IVec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Jumps whenever the agent is in the lower half of the target gap
fn hover(inputs: &Observation) -> Vec<f32> {
    let [_, to_center, to_bottom] = *inputs;
    if to_bottom < to_center { vec![1.0] } else { vec![0.0] }
}

fn bench_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_step");
    let config = SimConfig {
        seed: Some(0xF1A9),
        ..SimConfig::default()
    };
    let sprites = SpriteSet::procedural(&config.sprites);

    for agents in [10_usize, 50, 200] {
        group.bench_function(format!("100_ticks_{}_agents", agents), |b| {
            b.iter_batched(
                || vec![0.0_f32; agents],
                |mut fitness| {
                    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
                    let bindings = fitness
                        .iter_mut()
                        .map(|f| ControllerBinding::new(&hover, f))
                        .collect();
                    let mut sim = GenerationSim::new(&config, &sprites, 0, bindings, &mut rng);
                    for _ in 0..100 {
                        sim.step(&mut rng);
                    }
                    sim.score()
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    c.bench_function("full_generation_50_agents", |b| {
        b.iter_batched(
            || {
                let config = SimConfig {
                    seed: Some(7),
                    tick_limit: Some(2_000),
                    ..SimConfig::default()
                };
                (GenerationRunner::new(config).unwrap(), vec![0.0_f32; 50])
            },
            |(mut runner, mut fitness)| {
                let bindings = fitness
                    .iter_mut()
                    .map(|f| ControllerBinding::new(&hover, f))
                    .collect();
                runner.run_generation(bindings, &mut NoopObserver).ticks
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_mask_overlap(c: &mut Criterion) {
    let agent = CollisionMask::ellipse(68, 48);
    let barrier = CollisionMask::filled(104, 640);
    c.bench_function("mask_overlap_miss", |b| {
        // Barrier column overlaps the agent's right edge only where the ellipse is empty
        b.iter(|| agent.overlap(&barrier, IVec2::new(66, -620)))
    });
    c.bench_function("mask_overlap_hit", |b| {
        b.iter(|| agent.overlap(&barrier, IVec2::new(10, 10)))
    });
}

criterion_group!(benches, bench_ticks, bench_generation, bench_mask_overlap);
criterion_main!(benches);
