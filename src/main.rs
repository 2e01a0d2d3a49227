use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use flapper::{GameConfig, Overrides, TrainingEnv};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON config file (default: ./config.ron if it exists)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to train
    #[arg(long)]
    generations: Option<usize>,

    /// Population size per generation
    #[arg(long)]
    population: Option<usize>,

    /// Seed for obstacles and evolution (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for training reports
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run ticks at wall-clock speed
    #[arg(long)]
    realtime: bool,

    /// Capture a GIF every N generations (0 = never)
    #[arg(long)]
    gif_interval: Option<usize>,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            generations: self.generations,
            population: self.population,
            seed: self.seed,
            output_dir: self.output.clone(),
            realtime: self.realtime,
            gif_interval: self.gif_interval,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config = GameConfig::load(args.config.as_deref())?;
    config.apply(&args.overrides());
    config.validate()?;

    if args.print_config {
        println!("{}", config.to_ron()?);
        return Ok(());
    }

    log::info!("Starting Flapper training");
    let mut env = TrainingEnv::from_game_config(&config).context("Failed to set up training")?;
    let stats = env.run()?;

    println!(
        "Generations: {}, max score: {}",
        stats.generations_run, stats.max_score
    );
    Ok(())
}
