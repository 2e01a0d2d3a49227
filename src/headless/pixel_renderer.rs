//! CPU-based pixel buffer renderer for headless GIF capture
//!
//! Renders a [`FrameSnapshot`] to a pixel buffer without GPU dependencies.
//! Sprites are drawn from their collision masks, so what you see is exactly
//! what collides (apart from the agent tilt, which is cosmetic).

use flapper_core::{AgentView, CollisionMask, FrameSnapshot, SpriteSet};
use glam::Vec2;

const SKY: [u8; 4] = [78, 192, 202, 255];
const BARRIER: [u8; 4] = [84, 173, 43, 255];
const GROUND: [u8; 4] = [222, 216, 149, 255];
const GROUND_STRIPE: [u8; 4] = [156, 200, 72, 255];
const SCORE_PIP: [u8; 4] = [255, 255, 255, 255];
/// One shade per animation frame so wing beats show up
const AGENT: [[u8; 4]; 3] = [
    [250, 200, 40, 255],
    [240, 180, 30, 255],
    [252, 218, 90, 255],
];

const STRIPE_SPACING: f32 = 24.0;
const STRIPE_SIZE: f32 = 12.0;

/// CPU-based renderer that outputs to a pixel buffer
pub struct PixelRenderer {
    /// Width of the viewport in pixels
    pub width: usize,
    /// Height of the viewport in pixels
    pub height: usize,
    /// World pixels per screen pixel
    scale: u32,
    /// RGBA pixel buffer (4 bytes per pixel)
    pub buffer: Vec<u8>,
}

impl PixelRenderer {
    /// Create a new pixel renderer with given viewport size (one world pixel per pixel)
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            scale: 1,
            buffer: vec![0u8; width * height * 4],
        }
    }

    /// Viewport covering the whole world, shrunk by an integer factor
    pub fn for_world(world_width: f32, world_height: f32, scale: u32) -> Self {
        let (width, height) = Self::viewport(world_width, world_height, scale);
        Self {
            scale: scale.max(1),
            ..Self::new(width, height)
        }
    }

    /// Screen size `for_world` would allocate
    pub fn viewport(world_width: f32, world_height: f32, scale: u32) -> (usize, usize) {
        let scale = scale.max(1) as usize;
        (
            (world_width.ceil() as usize).div_ceil(scale),
            (world_height.ceil() as usize).div_ceil(scale),
        )
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Draw one frame, back to front
    pub fn render(&mut self, frame: &FrameSnapshot, sprites: &SpriteSet) {
        for pixel in self.buffer.chunks_exact_mut(4) {
            pixel.copy_from_slice(&SKY);
        }

        for obstacle in &frame.obstacles {
            self.draw_mask(
                sprites.barrier_top(),
                Vec2::new(obstacle.x, obstacle.top),
                0.0,
                BARRIER,
            );
            self.draw_mask(
                sprites.barrier_bottom(),
                Vec2::new(obstacle.x, obstacle.bottom),
                0.0,
                BARRIER,
            );
        }

        let ground = &frame.ground;
        let depth = self.height as f32 * self.scale as f32 - ground.y;
        for tile_x in [ground.x1, ground.x2] {
            self.fill_rect(tile_x, ground.y, ground.tile_width, depth, GROUND);
            let mut stripe_x = tile_x;
            while stripe_x < tile_x + ground.tile_width {
                self.fill_rect(stripe_x, ground.y, STRIPE_SIZE, STRIPE_SIZE, GROUND_STRIPE);
                stripe_x += STRIPE_SPACING;
            }
        }

        for agent in &frame.agents {
            self.render_agent(agent, sprites);
        }

        self.render_score(frame.score);
    }

    fn render_agent(&mut self, agent: &AgentView, sprites: &SpriteSet) {
        let mask = sprites.agent_frame(agent.frame);
        let color = AGENT[agent.frame % AGENT.len()];
        self.draw_mask(mask, agent.position, agent.tilt, color);
    }

    /// One pip per point, along the top edge
    fn render_score(&mut self, score: u32) {
        let max_pips = (self.width as u32 * self.scale / 10).saturating_sub(1);
        for i in 0..score.min(max_pips) {
            self.fill_rect(6.0 + i as f32 * 10.0, 6.0, 6.0, 6.0, SCORE_PIP);
        }
    }

    /// Draw the opaque pixels of a mask whose unrotated top-left corner is
    /// `origin`, rotated about its center by `tilt` degrees (positive = nose up)
    fn draw_mask(&mut self, mask: &CollisionMask, origin: Vec2, tilt: f32, color: [u8; 4]) {
        let half = Vec2::new(mask.width() as f32, mask.height() as f32) / 2.0;
        let center = origin + half;
        // Screen y points down, so nose-up is a counter-clockwise turn on
        // screen; mapping screen back to the mask undoes it
        let rotation = Vec2::from_angle(tilt.to_radians());
        let reach = if tilt == 0.0 { half } else { Vec2::splat(half.length()) };

        let scale = self.scale as f32;
        let min = ((center - reach) / scale).floor().max(Vec2::ZERO);
        let max = ((center + reach) / scale).ceil();
        let x_end = (max.x as usize).min(self.width);
        let y_end = (max.y as usize).min(self.height);

        for sy in min.y as usize..y_end {
            for sx in min.x as usize..x_end {
                let world = (Vec2::new(sx as f32, sy as f32) + 0.5) * scale;
                let local = rotation.rotate(world - center) + half;
                if mask.get(local.x.floor() as i32, local.y.floor() as i32) {
                    self.set_pixel(sx, sy, color);
                }
            }
        }
    }

    /// Fill a rectangle given in world coordinates
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) {
        let scale = self.scale as f32;
        let x0 = (x / scale).floor().max(0.0) as usize;
        let y0 = (y / scale).floor().max(0.0) as usize;
        let x1 = ((x + w) / scale).ceil().max(0.0) as usize;
        let y1 = ((y + h) / scale).ceil().max(0.0) as usize;

        for sy in y0..y1.min(self.height) {
            for sx in x0..x1.min(self.width) {
                self.set_pixel(sx, sy, color);
            }
        }
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: [u8; 4]) {
        let idx = (y * self.width + x) * 4;
        self.buffer[idx..idx + 4].copy_from_slice(&color);
    }

    /// RGBA value at a screen pixel
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.buffer[idx],
            self.buffer[idx + 1],
            self.buffer[idx + 2],
            self.buffer[idx + 3],
        ]
    }

    /// Get the pixel buffer as RGB (without alpha) for GIF encoding
    pub fn get_rgb_buffer(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for chunk in self.buffer.chunks_exact(4) {
            rgb.extend_from_slice(&chunk[..3]);
        }
        rgb
    }
}
