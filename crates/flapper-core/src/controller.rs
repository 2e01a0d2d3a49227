//! Controller bindings
//!
//! The simulation never sees how a controller is represented. It hands each
//! live agent's observation to a [`Controller`] and adds fitness deltas to an
//! accumulator owned by whoever supplied the controller.

/// Number of values in an observation
pub const INPUT_COUNT: usize = 3;

/// Observation fed to a controller each tick:
/// `[y, |y - gap_center|, |y - bottom|]` of the target obstacle
pub type Observation = [f32; INPUT_COUNT];

/// Decision function for one agent
///
/// Implementations must be pure with respect to the simulation: the same
/// observation with the same parameters gives the same outputs.
pub trait Controller {
    /// Map an observation to an output vector; `outputs[0]` drives the jump
    fn evaluate(&self, inputs: &Observation) -> Vec<f32>;
}

impl<F> Controller for F
where
    F: Fn(&Observation) -> Vec<f32>,
{
    fn evaluate(&self, inputs: &Observation) -> Vec<f32> {
        self(inputs)
    }
}

/// One controller and the fitness accumulator it reports into
///
/// Both are borrowed for the duration of a generation.
pub struct ControllerBinding<'a> {
    controller: &'a dyn Controller,
    fitness: &'a mut f32,
}

impl<'a> ControllerBinding<'a> {
    pub fn new(controller: &'a dyn Controller, fitness: &'a mut f32) -> Self {
        Self {
            controller,
            fitness,
        }
    }

    /// Whether the controller asks for a jump
    pub fn decide(&self, inputs: &Observation, threshold: f32) -> bool {
        self.controller
            .evaluate(inputs)
            .first()
            .is_some_and(|&out| out > threshold)
    }

    pub fn reward(&mut self, delta: f32) {
        *self.fitness += delta;
    }

    pub fn penalize(&mut self, delta: f32) {
        *self.fitness -= delta;
    }

    pub fn fitness(&self) -> f32 {
        *self.fitness
    }

    pub(crate) fn reset(&mut self) {
        *self.fitness = 0.0;
    }
}

impl std::fmt::Debug for ControllerBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerBinding")
            .field("fitness", &*self.fitness)
            .finish_non_exhaustive()
    }
}
