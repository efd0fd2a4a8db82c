//! Controller file and controller query errors.

use crate::core::Symbol;
use thiserror::Error;

/// Errors raised while loading a machine or querying a controller.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("failed to read controller file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 'key: value', found '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("required key '{0}' is missing")]
    MissingKey(&'static str),

    #[error("line {line}: invalid value for '{key}': {reason}")]
    InvalidValue {
        line: usize,
        key: String,
        reason: String,
    },

    #[error("line {line}: unknown key '{key}'")]
    UnknownKey { line: usize, key: String },

    #[error("unknown machine semantic '{0}' (expected 'mealy' or 'moore')")]
    UnknownSemantic(String),

    #[error("state {state} is out of range (machine has {states} states)")]
    StateOutOfRange { state: usize, states: usize },

    #[error("transition {transition} of state {state} is out of range ({declared} declared)")]
    TransitionOutOfRange {
        state: usize,
        transition: usize,
        declared: usize,
    },

    #[error("transition trans_{state}_{transition} is declared but missing")]
    MissingTransition { state: usize, transition: usize },

    #[error("transition trans_{state}_{transition} appears more than once")]
    DuplicateTransition { state: usize, transition: usize },

    #[error("state_transitions lists {found} states, expected {expected}")]
    StateCountMismatch { expected: usize, found: usize },

    #[error("no control action for symbol {symbol} in machine state {state}")]
    ControlActionNotFound { state: usize, symbol: Symbol },
}
