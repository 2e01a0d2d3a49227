//! Generation lifecycle
//!
//! [`GenerationRunner`] is what an optimizer calls once per generation. It
//! owns everything that outlives a single generation: the configuration,
//! the sprite masks, the shared obstacle RNG, the stop signal and the
//! run-wide counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::controller::ControllerBinding;
use crate::error::SimResult;
use crate::mask::SpriteSet;
use crate::observer::{ObserverFlow, TickObserver};
use crate::simulator::{EliminationCause, GenerationSim, TickOutcome};

/// Shared flag asking the runner to stop before the next tick
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationStatus {
    /// Every agent was eliminated
    Complete,
    /// The configured tick limit was reached with agents still alive
    TickLimit,
    /// A stop was requested or the presentation layer failed
    Interrupted,
}

/// Summary of one generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub status: GenerationStatus,
    pub score: u32,
    pub ticks: u64,
    pub collisions: usize,
    pub out_of_bounds: usize,
    /// Agents still alive when the generation was cut short
    pub abandoned: usize,
}

/// Counters kept across every generation of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Completed generations (also the index of the next generation)
    pub generations_run: usize,
    /// Best score of any generation so far
    pub max_score: u32,
    pub total_ticks: u64,
}

/// Runs generations against a fixed world configuration
pub struct GenerationRunner {
    config: SimConfig,
    sprites: SpriteSet,
    rng: Xoshiro256PlusPlus,
    stats: RunStats,
    stop: StopHandle,
}

impl GenerationRunner {
    /// Create a runner with procedural sprite masks
    pub fn new(config: SimConfig) -> SimResult<Self> {
        let sprites = SpriteSet::procedural(&config.sprites);
        Self::with_sprites(config, sprites)
    }

    /// Create a runner with custom sprite masks
    pub fn with_sprites(config: SimConfig, sprites: SpriteSet) -> SimResult<Self> {
        config.validate()?;
        config.check_obstacle_speed(sprites.barrier_width())?;
        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_os_rng(),
        };
        Ok(Self {
            config,
            sprites,
            rng,
            stats: RunStats::default(),
            stop: StopHandle::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn sprites(&self) -> &SpriteSet {
        &self.sprites
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Handle that can stop the run from elsewhere (e.g. a signal handler)
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run one generation to its end
    ///
    /// Every fitness accumulator is reset to zero, then mutated in place as
    /// the generation runs. Returns after all agents are eliminated, the tick
    /// limit is hit, or a stop is requested. A stop takes effect between
    /// ticks, so the fitness deltas of a tick are never partially applied.
    pub fn run_generation(
        &mut self,
        mut bindings: Vec<ControllerBinding<'_>>,
        observer: &mut dyn TickObserver,
    ) -> GenerationReport {
        for binding in &mut bindings {
            binding.reset();
        }

        let generation = self.stats.generations_run;
        log::info!(
            "Generation {} started with {} agents",
            generation,
            bindings.len()
        );

        let mut sim = GenerationSim::new(
            &self.config,
            &self.sprites,
            generation,
            bindings,
            &mut self.rng,
        );

        let status = loop {
            if self.stop.is_stop_requested() {
                break GenerationStatus::Interrupted;
            }
            if let Some(limit) = self.config.tick_limit
                && sim.tick() >= limit
            {
                break GenerationStatus::TickLimit;
            }

            if sim.step(&mut self.rng) == TickOutcome::Complete {
                break GenerationStatus::Complete;
            }
            self.stats.max_score = self.stats.max_score.max(sim.score());

            match observer.on_tick(&sim) {
                Ok(ObserverFlow::Continue) => {}
                Ok(ObserverFlow::Quit) => {
                    log::info!("Quit requested at tick {}", sim.tick());
                    self.stop.request_stop();
                    break GenerationStatus::Interrupted;
                }
                Err(e) => {
                    log::error!("Presentation layer failed, ending run: {}", e);
                    self.stop.request_stop();
                    break GenerationStatus::Interrupted;
                }
            }
        };

        let abandoned = if status == GenerationStatus::TickLimit {
            sim.abandon()
        } else {
            0
        };

        let count = |cause| {
            sim.eliminations()
                .iter()
                .filter(|e| e.cause == cause)
                .count()
        };
        let report = GenerationReport {
            generation,
            status,
            score: sim.score(),
            ticks: sim.tick(),
            collisions: count(EliminationCause::Collision),
            out_of_bounds: count(EliminationCause::OutOfBounds),
            abandoned,
        };

        self.stats.total_ticks += report.ticks;
        if status != GenerationStatus::Interrupted {
            self.stats.generations_run += 1;
        }

        log::info!(
            "Generation {} ended ({:?}) after {} ticks: score {}, max score {}",
            generation,
            status,
            report.ticks,
            report.score,
            self.stats.max_score
        );
        report
    }
}
