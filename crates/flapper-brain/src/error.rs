//! Error types for controllers and evolution

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrainError {
    /// The genome's weight vector does not fit its layer layout
    #[error("genome holds {actual} weights, layout {layers:?} needs {expected}")]
    GenomeShape {
        layers: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("network layout needs at least an input and an output layer, got {0:?}")]
    Layout(Vec<usize>),

    #[error("invalid evolution settings: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type BrainResult<T> = Result<T, BrainError>;
