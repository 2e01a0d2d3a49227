//! Agent kinematics
//!
//! Agents never move horizontally; the world scrolls past them. Vertical
//! motion is integrated from the tick count since the last jump.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;

/// Tilt at or below which the agent glides instead of flapping
const GLIDE_TILT: f32 = -80.0;

/// Animation frame order: up, mid, down, mid
const FRAME_CYCLE: [usize; 4] = [0, 1, 2, 1];

/// Stable handle of an agent within one generation (its spawn index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(usize);

impl AgentId {
    pub fn new(index: usize) -> Self {
        AgentId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Agent({})", self.0)
    }
}

/// A bird
#[derive(Debug, Clone)]
pub struct Agent {
    x: f32,
    pub y: f32,
    pub velocity: f32,
    /// Ticks since the last jump
    pub tick_count: u32,
    /// Orientation in degrees, positive = nose up
    pub tilt: f32,
    /// y at the moment of the last jump
    jump_height: f32,
    animation_tick: u32,
}

impl Agent {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            tick_count: 0,
            tilt: 0.0,
            jump_height: y,
            animation_tick: 0,
        }
    }

    /// Horizontal position, fixed for the agent's lifetime
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn jump_height(&self) -> f32 {
        self.jump_height
    }

    /// Apply the jump impulse; y changes on the next tick
    pub fn jump(&mut self, physics: &PhysicsConfig) {
        self.velocity = physics.jump_impulse;
        self.tick_count = 0;
        self.jump_height = self.y;
    }

    /// Advance one tick and return the vertical displacement applied
    pub fn tick(&mut self, physics: &PhysicsConfig) -> f32 {
        self.tick_count += 1;
        self.animation_tick = self.animation_tick.wrapping_add(1);

        let t = self.tick_count as f32;
        let mut displacement = self.velocity * t + 0.5 * physics.acceleration * t * t;

        let cap = physics.terminal_displacement;
        if displacement.abs() >= cap {
            displacement = cap.copysign(displacement);
        } else if displacement < 0.0 {
            displacement -= physics.rising_bias;
        }

        self.y += displacement;

        if displacement < 0.0 || self.y < self.jump_height + physics.tilt_margin {
            if self.tilt < physics.max_up_tilt {
                self.tilt = physics.max_up_tilt;
            }
        } else {
            self.tilt = (self.tilt - physics.tilt_rate).max(physics.max_down_tilt);
        }

        displacement
    }

    /// Current animation frame index (selects the collision mask)
    pub fn frame(&self, physics: &PhysicsConfig) -> usize {
        if self.tilt <= GLIDE_TILT {
            return FRAME_CYCLE[1];
        }
        let step = (self.animation_tick / physics.animation_ticks) as usize;
        FRAME_CYCLE[step % FRAME_CYCLE.len()]
    }
}
