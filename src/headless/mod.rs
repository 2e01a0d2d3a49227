//! Headless training driver
//!
//! This module runs the evolution loop without a window:
//! - Training loop with progress reporting
//! - Pixel buffer rendering for GIF capture
//! - Optional real-time pacing
//! - Results file, stats JSON and HTML report generation

mod pacer;
mod pixel_renderer;
mod recording;
mod report;
mod training_env;

pub use pacer::TickPacer;
pub use pixel_renderer::PixelRenderer;
pub use recording::GenerationRecording;
pub use report::{CapturedGif, ReportGenerator, results_entry};
pub use training_env::{TrainingConfig, TrainingEnv, TrainingStats};
