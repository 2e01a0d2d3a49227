//! # Flapper
//!
//! A side-scrolling obstacle course flown by a population of neural
//! controllers that learn through a genetic algorithm.

pub mod assets;
pub mod config;
pub mod headless;

// Re-export the simulation and evolution crates for convenience
pub use flapper_brain;
pub use flapper_core;

pub use config::{GameConfig, Overrides};
pub use headless::TrainingEnv;
