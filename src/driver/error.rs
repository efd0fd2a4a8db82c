//! Closed-loop run errors.

use crate::core::{QuantizerError, Symbol};
use crate::machine::MachineError;
use crate::model::ModelError;
use thiserror::Error;

/// Errors that end a closed-loop run.
///
/// Consistency violations are not errors; they are repaired and reported
/// through [`ConsistencyReport`](crate::model::ConsistencyReport).
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("quantization failed: {0}")]
    Quantizer(#[from] QuantizerError),

    #[error("controller failed: {0}")]
    Machine(#[from] MachineError),

    #[error("symbolic model lookup failed: {0}")]
    Model(#[from] ModelError),

    #[error("transition taken from machine state {state} on x_{x_symbol} carries no control symbol")]
    EmptyControlAction { state: usize, x_symbol: Symbol },

    #[error("tick duration must be positive and finite, got {0}")]
    InvalidTickDuration(f64),
}
