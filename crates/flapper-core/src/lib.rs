//! Obstacle-course simulation for Flapper
//!
//! This crate runs generations of agents through a scrolling course of
//! barrier pairs:
//! - World entities (Agent, Obstacle, Ground)
//! - Pixel-exact collision masks (CollisionMask, SpriteSet)
//! - The controller seam (Controller, ControllerBinding)
//! - The per-tick simulator (GenerationSim) and its lifecycle (GenerationRunner)
//!
//! It knows nothing about how controllers are represented or evolved.

pub mod agent;
pub mod config;
pub mod controller;
pub mod error;
pub mod ground;
pub mod lifecycle;
pub mod mask;
pub mod observer;
pub mod obstacle;
pub mod simulator;
pub mod snapshot;

pub use agent::{Agent, AgentId};
pub use config::{
    DifficultyRamp, FitnessConfig, GroundConfig, ObstacleConfig, PhysicsConfig, SimConfig,
    SpriteConfig, WorldConfig,
};
pub use controller::{Controller, ControllerBinding, INPUT_COUNT, Observation};
pub use error::{ObserverError, SimError, SimResult};
pub use ground::Ground;
pub use lifecycle::{GenerationReport, GenerationRunner, GenerationStatus, RunStats, StopHandle};
pub use mask::{CollisionMask, SpriteSet};
pub use observer::{NoopObserver, ObserverFlow, TickObserver};
pub use obstacle::Obstacle;
pub use simulator::{Elimination, EliminationCause, GenerationSim, TickOutcome};
pub use snapshot::{AgentView, FrameSnapshot, GroundView, ObstacleView};
