//! Pixel-accurate collision masks
//!
//! A mask is a bitmap of opaque pixels. Two masks collide when any opaque
//! pixel of one lands on an opaque pixel of the other at a given offset.

use glam::IVec2;

use crate::config::SpriteConfig;
use crate::error::{SimError, SimResult};

/// Alpha values above this count as opaque
pub const ALPHA_THRESHOLD: u8 = 127;

/// Bitmap of opaque sprite pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl CollisionMask {
    /// Fully opaque rectangle
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    /// Ellipse inscribed in a `width` x `height` box
    pub fn ellipse(width: u32, height: u32) -> Self {
        let rx = width as f32 / 2.0;
        let ry = height as f32 / 2.0;
        let mut bits = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                // Sample pixel centers
                let dx = (x as f32 + 0.5 - rx) / rx;
                let dy = (y as f32 + 0.5 - ry) / ry;
                bits.push(dx * dx + dy * dy <= 1.0);
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Build from row-major RGBA pixels, marking pixels with alpha above [`ALPHA_THRESHOLD`]
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> SimResult<Self> {
        let expected = (width * height * 4) as usize;
        if rgba.len() != expected {
            return Err(SimError::MaskBufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        let bits = rgba
            .chunks_exact(4)
            .map(|px| px[3] > ALPHA_THRESHOLD)
            .collect();
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Mirror top to bottom (barrier sprites hang upside down)
    pub fn flipped_vertical(&self) -> Self {
        let w = self.width as usize;
        let bits = self
            .bits
            .chunks_exact(w.max(1))
            .rev()
            .flat_map(|row| row.iter().copied())
            .collect();
        Self {
            width: self.width,
            height: self.height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) is opaque; out of range is transparent
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    /// Number of opaque pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// First overlapping pixel, in this mask's coordinates
    ///
    /// `offset` is the position of `other`'s top-left corner relative to
    /// this mask's top-left corner.
    pub fn overlap(&self, other: &CollisionMask, offset: IVec2) -> Option<IVec2> {
        let x_start = offset.x.max(0);
        let y_start = offset.y.max(0);
        let x_end = (offset.x + other.width as i32).min(self.width as i32);
        let y_end = (offset.y + other.height as i32).min(self.height as i32);

        if x_start >= x_end || y_start >= y_end {
            return None;
        }

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }
}

/// Collision masks for every sprite in the game
#[derive(Debug, Clone)]
pub struct SpriteSet {
    agent_frames: Vec<CollisionMask>,
    barrier_top: CollisionMask,
    barrier_bottom: CollisionMask,
    ground_width: u32,
}

impl SpriteSet {
    /// Procedural masks: an elliptical agent and solid barriers
    pub fn procedural(config: &SpriteConfig) -> Self {
        let agent = CollisionMask::ellipse(config.agent_width, config.agent_height);
        let barrier = CollisionMask::filled(config.barrier_width, config.barrier_height);
        Self {
            agent_frames: vec![agent.clone(), agent.clone(), agent],
            barrier_top: barrier.flipped_vertical(),
            barrier_bottom: barrier,
            ground_width: config.ground_width,
        }
    }

    /// Replace agent animation frames
    pub fn with_agent_frames(mut self, frames: Vec<CollisionMask>) -> SimResult<Self> {
        if frames.is_empty() {
            return Err(SimError::InvalidConfig(
                "agent needs at least one animation frame".to_string(),
            ));
        }
        self.agent_frames = frames;
        Ok(self)
    }

    /// Replace the barrier sprite; the top barrier is its vertical mirror
    pub fn with_barrier(mut self, bottom: CollisionMask) -> Self {
        self.barrier_top = bottom.flipped_vertical();
        self.barrier_bottom = bottom;
        self
    }

    /// Mask for an animation frame (wraps around)
    pub fn agent_frame(&self, index: usize) -> &CollisionMask {
        &self.agent_frames[index % self.agent_frames.len()]
    }

    pub fn agent_frame_count(&self) -> usize {
        self.agent_frames.len()
    }

    /// Agent sprite height (used for the ground check)
    pub fn agent_height(&self) -> u32 {
        self.agent_frames[0].height()
    }

    pub fn barrier_top(&self) -> &CollisionMask {
        &self.barrier_top
    }

    pub fn barrier_bottom(&self) -> &CollisionMask {
        &self.barrier_bottom
    }

    pub fn barrier_width(&self) -> u32 {
        self.barrier_bottom.width()
    }

    pub fn barrier_height(&self) -> u32 {
        self.barrier_bottom.height()
    }

    pub fn ground_width(&self) -> u32 {
        self.ground_width
    }
}
