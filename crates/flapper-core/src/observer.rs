//! Per-tick hook for presentation layers

use crate::error::ObserverError;
use crate::simulator::GenerationSim;

/// What the simulation should do after an observer has seen a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverFlow {
    Continue,
    /// Stop the run (e.g. the user closed the window)
    Quit,
}

/// Consumer of the simulation state, called after every completed tick
///
/// Observers only read. Returning an error or [`ObserverFlow::Quit`] ends
/// the run after the current tick; no further tick is started.
pub trait TickObserver {
    fn on_tick(&mut self, sim: &GenerationSim<'_>) -> Result<ObserverFlow, ObserverError>;
}

/// Observer for headless training
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TickObserver for NoopObserver {
    fn on_tick(&mut self, _sim: &GenerationSim<'_>) -> Result<ObserverFlow, ObserverError> {
        Ok(ObserverFlow::Continue)
    }
}
