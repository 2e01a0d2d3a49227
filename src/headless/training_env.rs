//! Training environment for evolving flight controllers
//!
//! Main loop: fly the whole population through one generation, record its
//! stats, breed the next population. GIF capture and real-time pacing hook
//! into the per-tick observer and never change what is simulated.

use std::path::PathBuf;

use anyhow::{Context, Result};
use flapper_brain::{EvolutionConfig, Population};
use flapper_core::{
    ControllerBinding, GenerationRunner, GenerationSim, GenerationStatus, ObserverError,
    ObserverFlow, RunStats, SimConfig, SpriteSet, StopHandle, TickObserver,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::pacer::TickPacer;
use super::recording::GenerationRecording;
use super::report::{CapturedGif, ReportGenerator};
use crate::assets;
use crate::config::GameConfig;

/// Configuration for the training run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of generations to run
    pub generations: usize,
    /// Output directory for reports and GIFs
    pub output_dir: PathBuf,
    /// File the run summary is appended to
    pub results_file: PathBuf,
    /// Hold ticks to wall-clock time
    pub realtime: bool,
    pub ticks_per_second: u32,
    /// How often to capture GIFs (every N generations, 0 = never)
    pub gif_interval: usize,
    /// World pixels per GIF pixel
    pub gif_scale: u32,
    /// GIF frames per second
    pub gif_fps: u16,
    /// Capture every Nth tick
    pub gif_frame_skip: u64,
    /// Frames per GIF at most
    pub gif_max_frames: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            generations: 100,
            output_dir: PathBuf::from("training_output"),
            results_file: PathBuf::from("results.txt"),
            realtime: false,
            ticks_per_second: 60,
            gif_interval: 0,
            gif_scale: 2,
            gif_fps: 30,
            gif_frame_skip: 2,
            gif_max_frames: 600,
        }
    }
}

/// Statistics of one evaluated generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingStats {
    pub generation: usize,
    pub status: GenerationStatus,
    /// Obstacles passed
    pub score: u32,
    pub ticks: u64,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub worst_fitness: f32,
    pub collisions: usize,
    pub out_of_bounds: usize,
}

/// Per-tick hook used during training
struct TrainingObserver<'a> {
    sprites: &'a SpriteSet,
    recording: Option<GenerationRecording>,
    pacer: Option<TickPacer>,
}

impl TickObserver for TrainingObserver<'_> {
    fn on_tick(&mut self, sim: &GenerationSim<'_>) -> Result<ObserverFlow, ObserverError> {
        if let Some(recording) = &mut self.recording
            && recording.wants(sim.tick())
        {
            recording.record(&sim.snapshot(), self.sprites);
        }
        if let Some(pacer) = &mut self.pacer {
            pacer.wait();
        }
        Ok(ObserverFlow::Continue)
    }
}

/// Main training environment
pub struct TrainingEnv {
    /// Training configuration
    pub config: TrainingConfig,
    runner: GenerationRunner,
    population: Population,
    /// Masks for rendering (the runner owns its own copy)
    sprites: SpriteSet,
    /// Statistics history
    pub stats_history: Vec<TrainingStats>,
    gifs: Vec<CapturedGif>,
    report_gen: ReportGenerator,
}

impl TrainingEnv {
    /// Create a new training environment
    ///
    /// The population is seeded from the simulation seed, so a seeded run
    /// repeats exactly.
    pub fn new(
        config: TrainingConfig,
        sim: SimConfig,
        sprites: SpriteSet,
        evolution: EvolutionConfig,
    ) -> Result<Self> {
        let seed = sim.seed;
        let runner = GenerationRunner::with_sprites(sim, sprites.clone())
            .context("Invalid simulation settings")?;
        let population = Population::new(evolution, seed).context("Failed to create population")?;
        let report_gen = ReportGenerator::new(config.output_dir.clone());

        Ok(Self {
            config,
            runner,
            population,
            sprites,
            stats_history: Vec::new(),
            gifs: Vec::new(),
            report_gen,
        })
    }

    /// Build everything a run needs from the loaded configuration
    pub fn from_game_config(game: &GameConfig) -> Result<Self> {
        let sprites = assets::load_sprites(&game.assets, &game.sim.sprites)?;
        Self::new(
            game.training.clone(),
            game.sim.clone(),
            sprites,
            game.evolution.clone(),
        )
    }

    /// Handle that stops the run before the next tick
    pub fn stop_handle(&self) -> StopHandle {
        self.runner.stop_handle()
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn run_stats(&self) -> &RunStats {
        self.runner.stats()
    }

    /// Create a progress bar style
    fn progress_style() -> Result<ProgressStyle> {
        Ok(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .context("Invalid progress bar template")?
        .progress_chars("█▓░"))
    }

    /// Run the full training loop and write the reports
    ///
    /// Ends early when the fitness threshold is reached or the run is
    /// interrupted; the reports are written either way.
    pub fn run(&mut self) -> Result<RunStats> {
        let pb = ProgressBar::new(self.config.generations as u64);
        pb.set_style(Self::progress_style()?);

        pb.println(format!(
            "Starting training: {} generations, {} population",
            self.config.generations,
            self.population.len()
        ));

        for _ in 0..self.config.generations {
            let stats = self.run_generation()?;
            pb.inc(1);
            pb.set_message(format!(
                "score={} best={:.1} avg={:.1}",
                stats.score, stats.best_fitness, stats.mean_fitness
            ));
            let (generation, status) = (stats.generation, stats.status);
            self.stats_history.push(stats);

            if status == GenerationStatus::Interrupted {
                pb.println(format!("Training interrupted in generation {}", generation));
                break;
            }
            if self.population.threshold_reached() {
                pb.println(format!(
                    "Fitness threshold reached in generation {}",
                    generation
                ));
                break;
            }
            self.population.evolve();
        }

        pb.finish_with_message("Training complete!");
        self.write_reports()?;
        Ok(self.runner.stats().clone())
    }

    /// Fly the current population through one generation
    pub fn run_generation(&mut self) -> Result<TrainingStats> {
        let generation = self.runner.stats().generations_run;
        let recording = if self.config.gif_interval > 0 && generation % self.config.gif_interval == 0
        {
            Some(GenerationRecording::new(
                generation,
                &self.config,
                &self.runner.config().world,
            )?)
        } else {
            None
        };
        let mut observer = TrainingObserver {
            sprites: &self.sprites,
            recording,
            pacer: self
                .config
                .realtime
                .then(|| TickPacer::new(self.config.ticks_per_second)),
        };

        let networks = self
            .population
            .networks()
            .context("Failed to build networks")?;
        let bindings = networks
            .iter()
            .zip(self.population.fitness_mut())
            .map(|(net, fitness)| ControllerBinding::new(net, fitness))
            .collect();
        let report = self.runner.run_generation(bindings, &mut observer);

        let TrainingObserver { recording, .. } = observer;
        if let Some(recording) = recording {
            self.save_recording(&recording, report.score);
        }

        let fitness = self.population.stats();
        Ok(TrainingStats {
            generation,
            status: report.status,
            score: report.score,
            ticks: report.ticks,
            best_fitness: fitness.best_fitness,
            mean_fitness: fitness.mean_fitness,
            worst_fitness: fitness.worst_fitness,
            collisions: report.collisions,
            out_of_bounds: report.out_of_bounds,
        })
    }

    /// A failed GIF is logged and skipped; it never stops training
    fn save_recording(&mut self, recording: &GenerationRecording, score: u32) {
        if recording.is_empty() {
            return;
        }
        let generation = recording.generation();
        match recording.save(self.report_gen.output_dir()) {
            Ok(path) => {
                log::info!(
                    "Captured generation {} ({} frames) to {}",
                    generation,
                    recording.len(),
                    path.display()
                );
                self.gifs.push(CapturedGif {
                    generation,
                    file_name: recording.file_name(),
                    score,
                });
            }
            Err(e) => log::warn!("Failed to save GIF for generation {}: {:#}", generation, e),
        }
    }

    fn write_reports(&self) -> Result<()> {
        let stats = self.runner.stats();
        let now = chrono::Local::now().naive_local();
        self.report_gen
            .append_results(&self.config.results_file, stats, &now)?;
        self.report_gen
            .generate_final_report(stats, &self.stats_history, &self.gifs)?;

        log::info!(
            "Training finished: {} generations, max score {}, {} ticks simulated",
            stats.generations_run,
            stats.max_score,
            stats.total_ticks
        );
        Ok(())
    }
}
