//! Game configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `config.ron` file (if exists), or the file given with `--config`
//! 3. Environment variables prefixed with `FLAPPER_`
//! 4. Command line flags (applied by the binary through [`Overrides`])
//!
//! Example environment variable: `FLAPPER_SIM__PHYSICS__JUMP_IMPULSE=-9.5`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use flapper_brain::EvolutionConfig;
use flapper_core::SimConfig;
use serde::{Deserialize, Serialize};

use crate::headless::TrainingConfig;

/// Generations end after this many ticks when nothing else ends them
/// (ten minutes of game time)
pub const DEFAULT_TICK_LIMIT: u64 = 36_000;

/// Main game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub sim: SimConfig,

    #[serde(default)]
    pub evolution: EvolutionConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub assets: AssetConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig {
                tick_limit: Some(DEFAULT_TICK_LIMIT),
                ..SimConfig::default()
            },
            evolution: EvolutionConfig::default(),
            training: TrainingConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

/// Sprite image settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `bird1.png`..`bird3.png`, `pipe.png` and
    /// optionally `base.png`. Procedural masks are used when unset.
    pub dir: Option<PathBuf>,
    /// Integer upscale applied to every loaded image
    pub scale: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self { dir: None, scale: 2 }
    }
}

/// Command line overrides, applied after all other layers
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub generations: Option<usize>,
    pub population: Option<usize>,
    pub seed: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub realtime: bool,
    pub gif_interval: Option<usize>,
}

impl GameConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `path` if given (must exist), else `config.ron` (if exists)
    /// 3. Environment variables prefixed with `FLAPPER_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("config")
                .format(FileFormat::Ron)
                .required(false),
        };

        let defaults = GameConfig::default();
        let builder = Config::builder()
            // Layer 1: Compiled defaults for the settings people tune most;
            // everything else falls back to serde defaults
            .set_default("training.generations", defaults.training.generations as i64)?
            .set_default(
                "training.output_dir",
                defaults.training.output_dir.to_string_lossy().into_owned(),
            )?
            .set_default(
                "evolution.population_size",
                defaults.evolution.population_size as i64,
            )?
            .set_default("sim.tick_limit", DEFAULT_TICK_LIMIT as i64)?
            .set_default("assets.scale", defaults.assets.scale as i64)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (FLAPPER_TRAINING__GENERATIONS, etc.)
            .add_source(
                Environment::with_prefix("FLAPPER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        let game: GameConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        game.validate()?;
        Ok(game)
    }

    /// Reject settings the simulation or the genetic algorithm cannot run with
    pub fn validate(&self) -> Result<()> {
        self.sim.validate().context("Invalid simulation settings")?;
        self.evolution
            .validate()
            .context("Invalid evolution settings")?;
        if self.assets.scale == 0 {
            anyhow::bail!("assets.scale must be at least 1");
        }
        Ok(())
    }

    /// Apply command line flags on top of the loaded layers
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(generations) = overrides.generations {
            self.training.generations = generations;
        }
        if let Some(population) = overrides.population {
            self.evolution.population_size = population;
        }
        if let Some(seed) = overrides.seed {
            self.sim.seed = Some(seed);
        }
        if let Some(dir) = &overrides.output_dir {
            self.training.output_dir = dir.clone();
        }
        if overrides.realtime {
            self.training.realtime = true;
        }
        if let Some(interval) = overrides.gif_interval {
            self.training.gif_interval = interval;
        }
    }

    /// Pretty RON, loadable again as a config file
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize configuration")
    }
}
