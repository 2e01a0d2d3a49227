//! Animated replay of a single generation
//!
//! A recording renders every `gif_frame_skip`-th tick into its own pixel
//! buffer until `gif_max_frames` frames are held, then writes them out as
//! a looping GIF named after the generation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flapper_core::{FrameSnapshot, SpriteSet, WorldConfig};
use gif::{Encoder, Frame, Repeat};

use super::pixel_renderer::PixelRenderer;
use super::report::ReportGenerator;
use super::training_env::TrainingConfig;

/// NeuQuant speed: 1 is the best palette, 30 the fastest
const PALETTE_SPEED: i32 = 10;

/// Frames of one generation waiting to be encoded
pub struct GenerationRecording {
    generation: usize,
    renderer: PixelRenderer,
    /// RGB, one entry per recorded tick
    frames: Vec<Vec<u8>>,
    frame_skip: u64,
    max_frames: usize,
    /// Centiseconds each frame stays on screen
    delay: u16,
    width: u16,
    height: u16,
}

impl GenerationRecording {
    /// Recording of `generation` covering the whole world
    pub fn new(generation: usize, training: &TrainingConfig, world: &WorldConfig) -> Result<Self> {
        let (screen_width, screen_height) =
            PixelRenderer::viewport(world.width, world.height, training.gif_scale);
        let width = u16::try_from(screen_width)
            .with_context(|| format!("{} px is too wide for a GIF", screen_width))?;
        let height = u16::try_from(screen_height)
            .with_context(|| format!("{} px is too tall for a GIF", screen_height))?;

        Ok(Self {
            generation,
            renderer: PixelRenderer::for_world(world.width, world.height, training.gif_scale),
            frames: Vec::new(),
            frame_skip: training.gif_frame_skip.max(1),
            max_frames: training.gif_max_frames,
            delay: 100u16.checked_div(training.gif_fps).unwrap_or(10).max(1),
            width,
            height,
        })
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether the state after `tick` ticks should become a frame
    pub fn wants(&self, tick: u64) -> bool {
        tick % self.frame_skip == 0 && self.frames.len() < self.max_frames
    }

    /// Render a snapshot and keep it as the next frame
    pub fn record(&mut self, frame: &FrameSnapshot, sprites: &SpriteSet) {
        self.renderer.render(frame, sprites);
        self.frames.push(self.renderer.get_rgb_buffer());
    }

    pub fn file_name(&self) -> String {
        ReportGenerator::gif_file_name(self.generation)
    }

    /// Encode every frame as a looping GIF
    pub fn encode<W: Write>(&self, out: W) -> Result<()> {
        if self.frames.is_empty() {
            anyhow::bail!("generation {} has no frames", self.generation);
        }

        let mut encoder =
            Encoder::new(out, self.width, self.height, &[]).context("Failed to start GIF")?;
        encoder
            .set_repeat(Repeat::Infinite)
            .context("Failed to set GIF looping")?;

        for rgb in &self.frames {
            let mut frame = Frame::from_rgb_speed(self.width, self.height, rgb, PALETTE_SPEED);
            frame.delay = self.delay;
            encoder
                .write_frame(&frame)
                .with_context(|| format!("Failed to encode generation {}", self.generation))?;
        }
        Ok(())
    }

    /// Write the GIF into `dir` and return its path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.encode(&mut out)?;
        out.flush().context("Failed to flush GIF")?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flapper_core::{GroundView, ObstacleView};

    fn training(frame_skip: u64, max_frames: usize) -> TrainingConfig {
        TrainingConfig {
            gif_scale: 8,
            gif_fps: 25,
            gif_frame_skip: frame_skip,
            gif_max_frames: max_frames,
            ..TrainingConfig::default()
        }
    }

    fn empty_frame(tick: u64) -> FrameSnapshot {
        FrameSnapshot {
            generation: 3,
            tick,
            score: 0,
            alive: 0,
            agents: Vec::new(),
            obstacles: vec![ObstacleView {
                x: 200.0,
                width: 104.0,
                gap_center: 250.0,
                top: -390.0,
                bottom: 450.0,
                passed: false,
            }],
            ground: GroundView {
                x1: 0.0,
                x2: 672.0,
                y: 570.0,
                tile_width: 672.0,
            },
        }
    }

    #[test]
    fn test_sized_to_world() {
        let recording = GenerationRecording::new(3, &training(1, 10), &WorldConfig::default())
            .unwrap();
        assert_eq!((recording.width, recording.height), (60, 80));
        assert_eq!(recording.delay, 4);
        assert_eq!(recording.file_name(), "gen_0003.gif");
        assert!(recording.is_empty());

        let huge = WorldConfig {
            width: 1.0e6,
            ..WorldConfig::default()
        };
        let mut config = training(1, 10);
        config.gif_scale = 1;
        assert!(GenerationRecording::new(0, &config, &huge).is_err());
    }

    #[test]
    fn test_frame_skip_and_cap() {
        let sprites = SpriteSet::procedural(&Default::default());
        let mut recording =
            GenerationRecording::new(3, &training(3, 2), &WorldConfig::default()).unwrap();

        let recorded: Vec<u64> = (1..=20)
            .filter(|&tick| {
                let due = recording.wants(tick);
                if due {
                    recording.record(&empty_frame(tick), &sprites);
                }
                due
            })
            .collect();
        assert_eq!(recorded, vec![3, 6]);
        assert_eq!(recording.len(), 2);
        assert_eq!(recording.frames[0].len(), 60 * 80 * 3);
    }

    #[test]
    fn test_empty_recording_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let recording =
            GenerationRecording::new(3, &training(1, 10), &WorldConfig::default()).unwrap();
        assert!(recording.save(dir.path()).is_err());
        assert!(!dir.path().join("gen_0003.gif").exists());
    }

    #[test]
    fn test_save_writes_looping_gif() {
        let dir = tempfile::tempdir().unwrap();
        let sprites = SpriteSet::procedural(&Default::default());
        let mut recording =
            GenerationRecording::new(3, &training(1, 10), &WorldConfig::default()).unwrap();
        recording.record(&empty_frame(1), &sprites);
        recording.record(&empty_frame(2), &sprites);

        let path = recording.save(&dir.path().join("out")).unwrap();
        assert_eq!(path, dir.path().join("out").join("gen_0003.gif"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
        // NETSCAPE2.0 block marks the animation as looping
        assert!(bytes.windows(11).any(|w| w == b"NETSCAPE2.0"));
    }
}
