//! Error types for the simulation core

use thiserror::Error;

/// Errors raised while configuring or assembling a simulation
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value is out of its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An RGBA buffer does not match the declared sprite dimensions
    #[error("mask buffer holds {actual} bytes, expected {expected} for a {width}x{height} RGBA image")]
    MaskBufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Failure reported by a presentation layer observing the simulation
///
/// Any observer error ends the current generation cleanly.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("presentation failed: {0}")]
    Presentation(String),

    #[error("presentation I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
