//! Generation simulator
//!
//! Runs one generation tick by tick: agent kinematics, controller queries,
//! collisions, obstacle spawning and retirement, bounds checks and fitness
//! bookkeeping.
//!
//! Agents live in a single arena of slots. A slot holds the agent together
//! with its controller binding, so an agent, its controller and its fitness
//! accumulator are always removed as one. Slots are kept in spawn order,
//! which is also the order controllers are queried in.

use rand::RngCore;
use serde::Serialize;

use crate::agent::{Agent, AgentId};
use crate::config::SimConfig;
use crate::controller::{ControllerBinding, Observation};
use crate::ground::Ground;
use crate::mask::SpriteSet;
use crate::obstacle::Obstacle;
use crate::snapshot::{AgentView, FrameSnapshot, GroundView, ObstacleView};

/// Why an agent left the generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EliminationCause {
    /// Hit a barrier (fitness penalty applies)
    Collision,
    /// Touched the ground or rose above the world
    OutOfBounds,
}

/// Record of one elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Elimination {
    pub id: AgentId,
    /// Index of the tick the agent was eliminated in (0-based)
    pub tick: u64,
    pub cause: EliminationCause,
}

/// Result of a call to [`GenerationSim::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A tick was processed
    Advanced,
    /// No live agents were left; nothing was processed
    Complete,
}

struct AgentSlot<'a> {
    id: AgentId,
    agent: Agent,
    binding: ControllerBinding<'a>,
    eliminated: Option<EliminationCause>,
}

impl AgentSlot<'_> {
    fn is_alive(&self) -> bool {
        self.eliminated.is_none()
    }

    fn eliminate(&mut self, cause: EliminationCause, collision_penalty: f32) {
        debug_assert!(self.is_alive(), "{} eliminated twice", self.id);
        if cause == EliminationCause::Collision {
            self.binding.penalize(collision_penalty);
        }
        self.eliminated = Some(cause);
    }
}

/// State of one running generation
pub struct GenerationSim<'a> {
    config: &'a SimConfig,
    sprites: &'a SpriteSet,
    slots: Vec<AgentSlot<'a>>,
    /// Oldest first
    obstacles: Vec<Obstacle>,
    ground: Ground,
    generation: usize,
    score: u32,
    tick: u64,
    obstacles_spawned: u32,
    eliminations: Vec<Elimination>,
}

impl<'a> GenerationSim<'a> {
    /// Spawn one agent per binding at the configured spawn point
    pub fn new(
        config: &'a SimConfig,
        sprites: &'a SpriteSet,
        generation: usize,
        bindings: Vec<ControllerBinding<'a>>,
        rng: &mut dyn RngCore,
    ) -> Self {
        let agents = bindings
            .into_iter()
            .map(|binding| {
                (
                    Agent::new(config.world.spawn_x, config.world.spawn_y),
                    binding,
                )
            })
            .collect();
        Self::with_agents(config, sprites, generation, agents, rng)
    }

    /// Start a generation from pre-built agents
    pub fn with_agents(
        config: &'a SimConfig,
        sprites: &'a SpriteSet,
        generation: usize,
        agents: Vec<(Agent, ControllerBinding<'a>)>,
        rng: &mut dyn RngCore,
    ) -> Self {
        let slots = agents
            .into_iter()
            .enumerate()
            .map(|(index, (agent, binding))| AgentSlot {
                id: AgentId::new(index),
                agent,
                binding,
                eliminated: None,
            })
            .collect();

        let first = Obstacle::create(
            config.obstacles.spawn_x,
            config.obstacles.velocity,
            &config.obstacles,
            sprites,
            rng,
        );

        Self {
            config,
            sprites,
            slots,
            obstacles: vec![first],
            ground: Ground::new(
                config.ground_y(),
                sprites.ground_width() as f32,
                config.ground.velocity,
            ),
            generation,
            score: 0,
            tick: 0,
            obstacles_spawned: 1,
            eliminations: Vec::new(),
        }
    }

    /// Replace the active obstacles (oldest first)
    ///
    /// # Panics
    /// If `obstacles` is empty.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        assert!(!obstacles.is_empty(), "obstacle list must not be empty");
        self.obstacles = obstacles;
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of ticks processed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn eliminations(&self) -> &[Elimination] {
        &self.eliminations
    }

    /// Live agent handles in controller order
    pub fn live_ids(&self) -> Vec<AgentId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.slot(id).map(|slot| &slot.agent)
    }

    /// Current value of a live agent's fitness accumulator
    pub fn fitness(&self, id: AgentId) -> Option<f32> {
        self.slot(id).map(|slot| slot.binding.fitness())
    }

    fn slot(&self, id: AgentId) -> Option<&AgentSlot<'a>> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    /// Index of the obstacle every agent observes this tick
    ///
    /// The first live agent decides for the whole population: once it is
    /// past the nearest obstacle's right edge, everyone targets the next one.
    /// Returns `None` when no agents are left.
    ///
    /// # Panics
    /// If the obstacle list cannot supply a target; spawning guarantees it can.
    pub fn target_index(&self) -> Option<usize> {
        let lead = self.slots.first()?;
        assert!(
            !self.obstacles.is_empty(),
            "no obstacles while {} agents are live",
            self.slots.len()
        );
        let index = usize::from(lead.agent.x() > self.obstacles[0].right_edge());
        assert!(
            index < self.obstacles.len(),
            "lead agent passed the last obstacle before a new one spawned"
        );
        Some(index)
    }

    /// Process one tick
    ///
    /// Obstacles that leave the screen are retired right after this tick's
    /// move, so a snapshot never shows them. Checking before the move instead
    /// would only keep them in the list one tick longer; no collision, pass or
    /// target changes.
    pub fn step(&mut self, rng: &mut dyn RngCore) -> TickOutcome {
        let Some(target) = self.target_index() else {
            return TickOutcome::Complete;
        };

        let config = self.config;
        let sprites = self.sprites;
        let physics = &config.physics;
        let fitness = &config.fitness;
        let tick = self.tick;

        let gap_center = self.obstacles[target].gap_center();
        let gap_bottom = self.obstacles[target].bottom();

        // Move, reward survival, ask the controller
        for slot in &mut self.slots {
            slot.agent.tick(physics);
            slot.binding.reward(fitness.survival_reward);

            let y = slot.agent.y;
            let inputs: Observation = [y, (y - gap_center).abs(), (y - gap_bottom).abs()];
            if slot.binding.decide(&inputs, config.world.jump_threshold) {
                slot.agent.jump(physics);
            }
        }

        // Collisions and passes, then move each obstacle
        let mut spawn_obstacle = false;
        for obstacle in &mut self.obstacles {
            for slot in self.slots.iter_mut().filter(|slot| slot.is_alive()) {
                if obstacle.collides_with(&slot.agent, sprites, physics) {
                    slot.eliminate(EliminationCause::Collision, fitness.collision_penalty);
                    self.eliminations.push(Elimination {
                        id: slot.id,
                        tick,
                        cause: EliminationCause::Collision,
                    });
                    log::debug!("{} hit an obstacle at tick {}", slot.id, tick);
                }
                if !obstacle.passed && obstacle.x < slot.agent.x() {
                    obstacle.passed = true;
                    spawn_obstacle = true;
                }
            }
            obstacle.tick();
        }
        self.slots.retain(AgentSlot::is_alive);

        if spawn_obstacle {
            self.score += 1;
            for slot in &mut self.slots {
                slot.binding.reward(fitness.pass_reward);
            }
            self.spawn_obstacle(rng);
        }

        let before = self.obstacles.len();
        self.obstacles.retain(|obstacle| !obstacle.is_offscreen());
        if self.obstacles.len() < before {
            log::debug!(
                "Retired {} obstacle(s) at tick {}",
                before - self.obstacles.len(),
                tick
            );
        }

        // Ground and ceiling
        let ground_y = self.ground.y;
        for slot in &mut self.slots {
            let height = sprites.agent_frame(slot.agent.frame(physics)).height() as f32;
            if slot.agent.y + height >= ground_y || slot.agent.y < 0.0 {
                slot.eliminate(EliminationCause::OutOfBounds, fitness.collision_penalty);
                self.eliminations.push(Elimination {
                    id: slot.id,
                    tick,
                    cause: EliminationCause::OutOfBounds,
                });
                log::debug!("{} left the world at tick {}", slot.id, tick);
            }
        }
        self.slots.retain(AgentSlot::is_alive);

        self.ground.tick();
        self.tick += 1;
        TickOutcome::Advanced
    }

    fn spawn_obstacle(&mut self, rng: &mut dyn RngCore) {
        let base = self.config.obstacles.velocity;
        let velocity = match &self.config.difficulty {
            Some(ramp) => ramp.velocity_after(base, self.obstacles_spawned - 1),
            None => base,
        };
        let obstacle = Obstacle::create(
            self.config.obstacles.spawn_x,
            velocity,
            &self.config.obstacles,
            self.sprites,
            rng,
        );
        log::debug!(
            "Spawned obstacle #{} (gap center {}, velocity {}), score {}",
            self.obstacles_spawned + 1,
            obstacle.gap_center(),
            velocity,
            self.score
        );
        self.obstacles.push(obstacle);
        self.obstacles_spawned += 1;
    }

    /// Drop every remaining agent without touching fitness; returns how many
    pub(crate) fn abandon(&mut self) -> usize {
        let remaining = self.slots.len();
        self.slots.clear();
        remaining
    }

    /// Detached copy of everything a renderer needs
    pub fn snapshot(&self) -> FrameSnapshot {
        let physics = &self.config.physics;
        FrameSnapshot {
            generation: self.generation,
            tick: self.tick,
            score: self.score,
            alive: self.slots.len(),
            agents: self
                .slots
                .iter()
                .map(|slot| AgentView {
                    id: slot.id,
                    position: slot.agent.position(),
                    tilt: slot.agent.tilt,
                    frame: slot.agent.frame(physics),
                })
                .collect(),
            obstacles: self
                .obstacles
                .iter()
                .map(|obstacle| ObstacleView {
                    x: obstacle.x,
                    width: obstacle.right_edge() - obstacle.x,
                    gap_center: obstacle.gap_center(),
                    top: obstacle.top(),
                    bottom: obstacle.bottom(),
                    passed: obstacle.passed,
                })
                .collect(),
            ground: GroundView {
                x1: self.ground.x1,
                x2: self.ground.x2,
                y: self.ground.y,
                tile_width: self.ground.tile_width(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyRamp;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn never(_: &Observation) -> Vec<f32> {
        vec![0.0]
    }

    #[test]
    fn test_first_obstacle_at_spawn_distance() {
        let config = SimConfig::default();
        let sprites = SpriteSet::procedural(&config.sprites);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut fitness = 0.0;
        let sim = GenerationSim::new(
            &config,
            &sprites,
            0,
            vec![ControllerBinding::new(&never, &mut fitness)],
            &mut rng,
        );
        assert_eq!(sim.obstacles().len(), 1);
        assert_eq!(sim.obstacles()[0].x, 600.0);
        assert_eq!(sim.live_count(), 1);
        assert_eq!(sim.target_index(), Some(0));
    }

    #[test]
    fn test_empty_population_completes_immediately() {
        let config = SimConfig::default();
        let sprites = SpriteSet::procedural(&config.sprites);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut sim = GenerationSim::new(&config, &sprites, 0, Vec::new(), &mut rng);

        assert_eq!(sim.step(&mut rng), TickOutcome::Complete);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.target_index(), None);
    }

    #[test]
    fn test_target_switches_after_lead_clears_obstacle() {
        let config = SimConfig::default();
        let sprites = SpriteSet::procedural(&config.sprites);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut fitness = 0.0;
        let mut sim = GenerationSim::new(
            &config,
            &sprites,
            0,
            vec![ControllerBinding::new(&never, &mut fitness)],
            &mut rng,
        );

        // Right edge 229 is left of x 230
        sim.set_obstacles(vec![
            Obstacle::with_gap_center(125.0, 5.0, 300.0, 200.0, &sprites),
            Obstacle::with_gap_center(600.0, 5.0, 300.0, 200.0, &sprites),
        ]);
        assert_eq!(sim.target_index(), Some(1));

        // Right edge exactly at x: still the nearest
        sim.set_obstacles(vec![
            Obstacle::with_gap_center(126.0, 5.0, 300.0, 200.0, &sprites),
            Obstacle::with_gap_center(600.0, 5.0, 300.0, 200.0, &sprites),
        ]);
        assert_eq!(sim.target_index(), Some(0));
    }

    #[test]
    fn test_difficulty_ramp_speeds_up_new_obstacles() {
        let config = SimConfig {
            difficulty: Some(DifficultyRamp {
                every: 1,
                step: 1.0,
                max_velocity: 7.0,
            }),
            ..SimConfig::default()
        };
        let sprites = SpriteSet::procedural(&config.sprites);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut sim = GenerationSim::new(&config, &sprites, 0, Vec::new(), &mut rng);

        for _ in 0..4 {
            sim.spawn_obstacle(&mut rng);
        }
        let velocities: Vec<f32> = sim.obstacles().iter().map(|o| o.velocity).collect();
        // The first spawned obstacle still uses the base velocity
        assert_eq!(velocities, vec![5.0, 5.0, 6.0, 7.0, 7.0]);
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let config = SimConfig::default();
        let sprites = SpriteSet::procedural(&config.sprites);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut f1 = 0.0;
        let mut f2 = 0.0;
        let mut sim = GenerationSim::new(
            &config,
            &sprites,
            4,
            vec![
                ControllerBinding::new(&never, &mut f1),
                ControllerBinding::new(&never, &mut f2),
            ],
            &mut rng,
        );
        sim.step(&mut rng);

        let frame = sim.snapshot();
        assert_eq!(frame.generation, 4);
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.alive, 2);
        assert_eq!(frame.agents.len(), 2);
        assert_eq!(frame.agents[0].position.x, 230.0);
        assert_eq!(frame.obstacles[0].x, 595.0);
        assert_eq!(frame.obstacles[0].width, 104.0);
        assert_eq!(frame.ground.x1, -5.0);
        assert_eq!(frame.ground.y, 570.0);
    }
}
