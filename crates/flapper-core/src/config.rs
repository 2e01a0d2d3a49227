//! Simulation configuration
//!
//! Defaults describe the classic 480x640 world: sprite sizes are the
//! 2x-scaled sprite art, velocities are per tick at 60 ticks per second.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Complete configuration for one simulation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldConfig,

    #[serde(default)]
    pub physics: PhysicsConfig,

    #[serde(default)]
    pub obstacles: ObstacleConfig,

    #[serde(default)]
    pub ground: GroundConfig,

    #[serde(default)]
    pub sprites: SpriteConfig,

    #[serde(default)]
    pub fitness: FitnessConfig,

    /// Progressive obstacle speed-up (disabled unless set)
    #[serde(default)]
    pub difficulty: Option<DifficultyRamp>,

    /// End a generation after this many ticks even if agents survive
    #[serde(default)]
    pub tick_limit: Option<u64>,

    /// Seed for the obstacle RNG (None = seed from the OS)
    #[serde(default)]
    pub seed: Option<u64>,
}

/// World geometry and agent spawn point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Visible world width
    pub width: f32,
    /// Visible world height (y grows downward)
    pub height: f32,
    /// Fixed x of every agent
    pub spawn_x: f32,
    /// Initial y of every agent
    pub spawn_y: f32,
    /// Controller output above this value triggers a jump
    pub jump_threshold: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 640.0,
            spawn_x: 230.0,
            spawn_y: 350.0,
            jump_threshold: 0.5,
        }
    }
}

/// Agent kinematics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Velocity set by a jump (negative = upward)
    pub jump_impulse: f32,
    /// Downward acceleration in the displacement formula
    pub acceleration: f32,
    /// Maximum absolute displacement per tick
    pub terminal_displacement: f32,
    /// Extra upward displacement while rising below the cap
    pub rising_bias: f32,
    /// Nose-up tilt in degrees
    pub max_up_tilt: f32,
    /// Nose-down tilt floor in degrees
    pub max_down_tilt: f32,
    /// Tilt decrease per tick while falling
    pub tilt_rate: f32,
    /// Agent keeps its nose up while within this distance below its jump height
    pub tilt_margin: f32,
    /// Ticks each animation frame is held
    pub animation_ticks: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            jump_impulse: -10.0,
            acceleration: 3.0,
            terminal_displacement: 16.0,
            rising_bias: 2.0,
            max_up_tilt: 25.0,
            max_down_tilt: -90.0,
            tilt_rate: 20.0,
            tilt_margin: 50.0,
            animation_ticks: 10,
        }
    }
}

/// Obstacle generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Vertical opening between the barriers
    pub gap_size: f32,
    /// Lowest gap-center height (inclusive)
    pub gap_min: i32,
    /// Highest gap-center height (exclusive)
    pub gap_max: i32,
    /// x at which new obstacles appear
    pub spawn_x: f32,
    /// Horizontal speed per tick
    pub velocity: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            gap_size: 200.0,
            gap_min: 40,
            gap_max: 400,
            spawn_x: 600.0,
            velocity: 5.0,
        }
    }
}

/// Ground strip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Distance from the bottom of the world to the ground's top edge
    pub height: f32,
    /// Scroll speed per tick
    pub velocity: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            height: 70.0,
            velocity: 5.0,
        }
    }
}

/// Sprite dimensions used for procedural collision masks and bounds checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    pub agent_width: u32,
    pub agent_height: u32,
    pub barrier_width: u32,
    pub barrier_height: u32,
    pub ground_width: u32,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            agent_width: 68,
            agent_height: 48,
            barrier_width: 104,
            barrier_height: 640,
            ground_width: 672,
        }
    }
}

/// Fitness deltas applied to controller accumulators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Added every tick an agent survives
    pub survival_reward: f32,
    /// Added to every live agent when an obstacle is passed
    pub pass_reward: f32,
    /// Subtracted once when an agent hits an obstacle
    pub collision_penalty: f32,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            survival_reward: 0.1,
            pass_reward: 5.0,
            collision_penalty: 1.0,
        }
    }
}

/// Speeds up newly spawned obstacles every `every` spawns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyRamp {
    pub every: u32,
    pub step: f32,
    pub max_velocity: f32,
}

impl Default for DifficultyRamp {
    fn default() -> Self {
        Self {
            every: 3,
            step: 1.0,
            max_velocity: 8.0,
        }
    }
}

impl DifficultyRamp {
    /// Velocity for the next obstacle after `spawned` obstacles have been added
    pub fn velocity_after(&self, base: f32, spawned: u32) -> f32 {
        let steps = spawned / self.every;
        (base + steps as f32 * self.step).min(self.max_velocity)
    }
}

impl SimConfig {
    /// y of the ground's top edge
    pub fn ground_y(&self) -> f32 {
        self.world.height - self.ground.height
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return invalid(format!(
                "world size must be positive, got {}x{}",
                self.world.width, self.world.height
            ));
        }
        if self.obstacles.gap_min >= self.obstacles.gap_max {
            return invalid(format!(
                "gap range [{}, {}) is empty",
                self.obstacles.gap_min, self.obstacles.gap_max
            ));
        }
        if self.obstacles.velocity <= 0.0 {
            return invalid("obstacle velocity must be positive".to_string());
        }
        if self.obstacles.spawn_x <= self.world.spawn_x {
            return invalid("obstacles must spawn ahead of the agents".to_string());
        }
        let sprites = &self.sprites;
        if sprites.agent_width == 0
            || sprites.agent_height == 0
            || sprites.barrier_width == 0
            || sprites.barrier_height == 0
            || sprites.ground_width == 0
        {
            return invalid("sprite dimensions must be non-zero".to_string());
        }
        if 2.0 * sprites.ground_width as f32 <= self.world.width + self.ground.velocity {
            return invalid(format!(
                "two ground tiles of width {} cannot cover a world of width {}",
                sprites.ground_width, self.world.width
            ));
        }
        if self.ground.velocity < 0.0 {
            return invalid("ground velocity must not be negative".to_string());
        }
        if self.physics.animation_ticks == 0 {
            return invalid("animation_ticks must be at least 1".to_string());
        }
        if let Some(ramp) = &self.difficulty
            && ramp.every == 0
        {
            return invalid("difficulty ramp interval must be at least 1".to_string());
        }
        self.check_obstacle_speed(sprites.barrier_width)
    }

    /// Obstacles must move less than one barrier width per tick, otherwise
    /// one can skip past the agents between two pass checks
    pub fn check_obstacle_speed(&self, barrier_width: u32) -> SimResult<()> {
        let width = barrier_width as f32;
        if self.obstacles.velocity >= width {
            return Err(SimError::InvalidConfig(format!(
                "obstacle velocity {} must be below the barrier width {}",
                self.obstacles.velocity, barrier_width
            )));
        }
        if let Some(ramp) = &self.difficulty
            && ramp.max_velocity >= width
        {
            return Err(SimError::InvalidConfig(format!(
                "difficulty max_velocity {} must be below the barrier width {}",
                ramp.max_velocity, barrier_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ground_y(), 570.0);
        assert!(config.difficulty.is_none());
        assert!(config.tick_limit.is_none());
    }

    #[test]
    fn test_empty_gap_range_rejected() {
        let mut config = SimConfig::default();
        config.obstacles.gap_min = 400;
        config.obstacles.gap_max = 400;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_narrow_ground_rejected() {
        let mut config = SimConfig::default();
        config.sprites.ground_width = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_difficulty_ramp_velocity() {
        let ramp = DifficultyRamp::default();
        assert_eq!(ramp.velocity_after(5.0, 0), 5.0);
        assert_eq!(ramp.velocity_after(5.0, 2), 5.0);
        assert_eq!(ramp.velocity_after(5.0, 3), 6.0);
        assert_eq!(ramp.velocity_after(5.0, 9), 8.0);
        // Capped
        assert_eq!(ramp.velocity_after(5.0, 300), 8.0);
    }

    #[test]
    fn test_obstacle_faster_than_barrier_rejected() {
        let mut config = SimConfig::default();
        config.obstacles.velocity = 120.0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        config.obstacles.velocity = 103.5;
        assert!(config.validate().is_ok());
        // A narrower loaded barrier tightens the limit
        assert!(config.check_obstacle_speed(64).is_err());

        config.obstacles.velocity = 5.0;
        config.difficulty = Some(DifficultyRamp {
            max_velocity: 104.0,
            ..DifficultyRamp::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ramp_interval_rejected() {
        let config = SimConfig {
            difficulty: Some(DifficultyRamp {
                every: 0,
                ..DifficultyRamp::default()
            }),
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
