//! Evolved controllers for Flapper
//!
//! This crate implements:
//! - Flat weight genomes with mutation and crossover
//! - Feed-forward tanh networks usable as simulation controllers
//! - A generational genetic algorithm with elitism and tournament selection

pub mod error;
pub mod evolution;
pub mod genome;
pub mod neural;

pub use error::{BrainError, BrainResult};
pub use evolution::{EvolutionConfig, GenerationStats, Population};
pub use genome::{MutationConfig, NetworkGenome};
pub use neural::FeedForwardNetwork;
