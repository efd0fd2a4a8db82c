//! Configuration and setup errors.

use crate::builder::BuildError;
use crate::core::{HyperRectError, QuantizerError};
use crate::dynamics::DynamicsError;
use crate::machine::MachineError;
use crate::model::ModelError;
use thiserror::Error;

/// A single problem found while validating a [`LoopConfig`](crate::config::LoopConfig).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{section}: first_symbol, last_symbol and quantizers differ in length ({first}, {last}, {quantizers})")]
    DimensionMismatch {
        section: &'static str,
        first: usize,
        last: usize,
        quantizers: usize,
    },

    #[error("{section}: first_symbol {first} exceeds last_symbol {last} at index {dim}")]
    InvertedBounds {
        section: &'static str,
        dim: usize,
        first: f64,
        last: f64,
    },

    #[error("{section}: quantizer at index {dim} must be positive, got {value}")]
    NonPositiveQuantizer {
        section: &'static str,
        dim: usize,
        value: f64,
    },

    #[error("{section}: no dimensions configured")]
    EmptyGrid { section: &'static str },

    #[error("step_time must be positive and finite, got {0}")]
    NonPositiveStepTime(f64),

    #[error("ode_substeps must be at least 1")]
    ZeroSubsteps,

    #[error("initial_set is invalid: {0}")]
    InvalidInitialSet(#[source] HyperRectError),

    #[error("initial_state has {found} components but the state space has {expected}")]
    InitialStateDimension { expected: usize, found: usize },
}

/// Errors raised while turning a configuration into a running loop.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration has {} problem(s): {}", .0.len(), join(.0))]
    Invalid(Vec<ConfigError>),

    #[error(transparent)]
    Quantizer(#[from] QuantizerError),

    #[error(transparent)]
    Machine(#[from] MachineError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Dynamics(#[from] DynamicsError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
