//! Error types for trisim.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Two bodies sit on the same point, the pairwise force is undefined
    #[error("bodies {i} and {j} coincide at t = {time:e}")]
    Singularity { i: usize, j: usize, time: f64 },

    #[error("body {index} has invalid mass {mass}")]
    InvalidMass { index: usize, mass: f64 },

    #[error("body {index} has a non-finite position or velocity")]
    NonFiniteState { index: usize },

    #[error("step size must be positive and finite, got {0}")]
    InvalidStep(f64),

    #[error("duration must be positive and finite, got {0}")]
    InvalidDuration(f64),

    #[error("recording cadence must be at least one step")]
    InvalidCadence,

    #[error("gravitational constant must be positive and finite, got {0}")]
    InvalidGravitationalConstant(f64),

    #[error("system has no bodies")]
    EmptySystem,

    #[error("invalid subsystem: {0}")]
    InvalidSubsystem(String),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
