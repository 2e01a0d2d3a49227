//! End-to-end training runs through the public API

use flapper::headless::{TrainingConfig, TrainingEnv, TrainingStats};
use flapper::{GameConfig, Overrides};

fn seeded_run(dir: &std::path::Path, seed: u64) -> Vec<TrainingStats> {
    let mut config = GameConfig::default();
    config.apply(&Overrides {
        generations: Some(3),
        population: Some(12),
        seed: Some(seed),
        output_dir: Some(dir.join("out")),
        ..Overrides::default()
    });
    config.sim.tick_limit = Some(600);
    config.evolution.fitness_threshold = None;
    config.training = TrainingConfig {
        results_file: dir.join("results.txt"),
        ..config.training
    };

    let mut env = TrainingEnv::from_game_config(&config).unwrap();
    env.run().unwrap();
    env.stats_history
}

#[test]
fn test_seeded_training_repeats() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let first = seeded_run(a.path(), 17);
    let second = seeded_run(b.path(), 17);

    assert_eq!(first.len(), 3);
    for (x, y) in first.iter().zip(&second) {
        assert_eq!(x.generation, y.generation);
        assert_eq!(x.score, y.score);
        assert_eq!(x.ticks, y.ticks);
        assert_eq!(x.best_fitness, y.best_fitness);
        assert_eq!(x.mean_fitness, y.mean_fitness);
    }
}

#[test]
fn test_every_agent_is_accounted_for() {
    let dir = tempfile::tempdir().unwrap();
    for stats in seeded_run(dir.path(), 4) {
        // Eliminated agents plus those cut off by the tick limit
        assert!(stats.collisions + stats.out_of_bounds <= 12);
        assert!(stats.ticks <= 600);
        assert!(stats.best_fitness >= stats.mean_fitness);
        assert!(stats.mean_fitness >= stats.worst_fitness);
    }
}
