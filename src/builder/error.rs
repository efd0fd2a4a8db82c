//! Build errors for the closed-loop builder.

use crate::core::Symbol;
use thiserror::Error;

/// Errors that can occur when assembling a [`ClosedLoop`](crate::driver::ClosedLoop).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("State quantizer not specified. Call .state_quantizer(q) before .build()")]
    MissingStateQuantizer,

    #[error("Control quantizer not specified. Call .control_quantizer(q) before .build()")]
    MissingControlQuantizer,

    #[error("Controller not specified. Call .controller(c) before .build()")]
    MissingController,

    #[error("Dynamics not specified. Call .dynamics(d) before .build()")]
    MissingDynamics,

    #[error("Initial state not specified. Call .initial_state(x) before .build()")]
    MissingInitialState,

    #[error("Control period must be positive and finite, got {0}")]
    InvalidPeriod(f64),

    #[error("Initial state has {found} components but the state quantizer has {expected}")]
    InitialStateDimension { expected: usize, found: usize },

    #[error(
        "Symbolic model covers {model_x} x {model_u} symbols but the quantizers give {grid_x} x {grid_u}"
    )]
    ModelSizeMismatch {
        model_x: u64,
        model_u: u64,
        grid_x: u64,
        grid_u: u64,
    },

    #[error("Symbolic model regions have {found} dimensions but the state quantizer has {expected}")]
    ModelDimension { expected: usize, found: usize },

    #[error(
        "Transition {transition} of machine state {state} outputs u_{symbol}, but the control quantizer has {num_symbols} symbols"
    )]
    ControlSymbolOutOfRange {
        state: usize,
        transition: usize,
        symbol: Symbol,
        num_symbols: u64,
    },
}
