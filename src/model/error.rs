//! Model-dump errors.

use crate::core::{HyperRectError, Symbol};
use thiserror::Error;

/// Errors raised while loading or querying a symbolic model dump.
///
/// Everything except [`ModelError::SymbolOutOfRange`] is a load-time
/// failure: a dump that loads is complete.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model dump: {0}")]
    Io(#[from] std::io::Error),

    #[error("inconsistent model dump at line {line}: {reason}")]
    ModelDumpInconsistent { line: usize, reason: String },

    #[error("inconsistent model dump at line {line}: {source}")]
    InvalidRegion {
        line: usize,
        #[source]
        source: HyperRectError,
    },

    #[error("inconsistent model dump: no entry for (x_{x_symbol}, u_{u_symbol})")]
    MissingEntry { x_symbol: Symbol, u_symbol: Symbol },

    #[error("inconsistent model dump at line {line}: (x_{x_symbol}, u_{u_symbol}) appears twice")]
    DuplicateEntry {
        line: usize,
        x_symbol: Symbol,
        u_symbol: Symbol,
    },

    #[error("model dump regions have {found} dimensions but the state space has {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("model dump covers {num_x} x {num_u} symbol pairs, which does not fit in memory")]
    TooLarge { num_x: u64, num_u: u64 },

    #[error("(x_{x_symbol}, u_{u_symbol}) is outside the symbolic model")]
    SymbolOutOfRange { x_symbol: Symbol, u_symbol: Symbol },
}
