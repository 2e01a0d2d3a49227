//! Read-only view of a generation for presentation layers
//!
//! Everything a renderer needs to draw one frame, detached from the
//! simulation's borrows so it can be stored or serialized.

use glam::Vec2;
use serde::Serialize;

use crate::agent::AgentId;

#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    /// Top-left corner of the agent sprite
    pub position: Vec2,
    /// Degrees, positive = nose up
    pub tilt: f32,
    /// Animation frame index
    pub frame: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub x: f32,
    pub width: f32,
    pub gap_center: f32,
    /// y of the top barrier sprite's upper edge
    pub top: f32,
    /// y of the bottom barrier sprite's upper edge
    pub bottom: f32,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroundView {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub tile_width: f32,
}

/// State of one generation after a tick
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub generation: usize,
    pub tick: u64,
    pub score: u32,
    pub alive: usize,
    pub agents: Vec<AgentView>,
    pub obstacles: Vec<ObstacleView>,
    pub ground: GroundView,
}
