//! Bidirectional mapping between continuous vectors and grid symbols.
//!
//! A quantizer covers the box `[lb, ub]` with a uniform grid of spacing
//! `eta`. Every grid point gets a flat symbol using mixed-radix encoding
//! with dimension 0 varying fastest.

use super::Symbol;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by [`Quantizer`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QuantizerError {
    #[error(
        "value {value} in dimension {dim} maps to cell {index}, outside [0, {width})"
    )]
    QuantizationOutOfRange {
        dim: usize,
        index: i64,
        width: u64,
        value: f64,
    },

    #[error("non-finite value {value} in dimension {dim}")]
    NonFinite { dim: usize, value: f64 },

    #[error("symbol {symbol} is outside [0, {num_symbols})")]
    SymbolOutOfRange { symbol: Symbol, num_symbols: u64 },

    #[error("expected a vector of dimension {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid grid in dimension {dim}: {reason}")]
    InvalidGrid { dim: usize, reason: String },
}

/// Floating-point width used for the cell-index arithmetic.
///
/// The same continuous value can land in different cells near a cell
/// boundary depending on this choice, so it is part of the configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Double,
    Single,
}

/// Uniform grid quantizer over `[lb, ub]` with spacing `eta`.
///
/// # Example
///
/// ```rust
/// use symloop::core::Quantizer;
///
/// let q = Quantizer::new(vec![0.0, 0.0], vec![1.0, 1.0], vec![3.0, 3.0]).unwrap();
/// assert_eq!(q.widths(), &[4, 4]);
/// assert_eq!(q.num_symbols(), 16);
/// assert_eq!(q.flat_to_conc(5).unwrap(), vec![1.0, 1.0]);
/// assert_eq!(q.conc_to_flat(&[1.0, 1.0]).unwrap(), 5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Quantizer {
    lb: Vec<f64>,
    eta: Vec<f64>,
    ub: Vec<f64>,
    widths: Vec<u64>,
    num_symbols: u64,
    precision: Precision,
}

impl Quantizer {
    /// Create a double-precision quantizer.
    pub fn new(lb: Vec<f64>, eta: Vec<f64>, ub: Vec<f64>) -> Result<Self, QuantizerError> {
        Self::with_precision(lb, eta, ub, Precision::Double)
    }

    /// Create a quantizer with an explicit arithmetic precision.
    pub fn with_precision(
        lb: Vec<f64>,
        eta: Vec<f64>,
        ub: Vec<f64>,
        precision: Precision,
    ) -> Result<Self, QuantizerError> {
        if eta.len() != lb.len() {
            return Err(QuantizerError::DimensionMismatch {
                expected: lb.len(),
                found: eta.len(),
            });
        }
        if ub.len() != lb.len() {
            return Err(QuantizerError::DimensionMismatch {
                expected: lb.len(),
                found: ub.len(),
            });
        }

        let mut widths = Vec::with_capacity(lb.len());
        let mut num_symbols: u64 = 1;
        for dim in 0..lb.len() {
            if !(eta[dim] > 0.0) || !eta[dim].is_finite() {
                return Err(QuantizerError::InvalidGrid {
                    dim,
                    reason: format!("spacing must be positive, got {}", eta[dim]),
                });
            }
            if !(lb[dim] <= ub[dim]) || !lb[dim].is_finite() || !ub[dim].is_finite() {
                return Err(QuantizerError::InvalidGrid {
                    dim,
                    reason: format!("bounds [{}, {}] are not ordered", lb[dim], ub[dim]),
                });
            }
            let width = ((ub[dim] - lb[dim]) / eta[dim]).floor() as u64 + 1;
            num_symbols = num_symbols
                .checked_mul(width)
                .ok_or_else(|| QuantizerError::InvalidGrid {
                    dim,
                    reason: "symbol count overflows 64 bits".to_string(),
                })?;
            widths.push(width);
        }

        Ok(Self {
            lb,
            eta,
            ub,
            widths,
            num_symbols,
            precision,
        })
    }

    pub fn dim(&self) -> usize {
        self.lb.len()
    }

    pub fn lb(&self) -> &[f64] {
        &self.lb
    }

    pub fn eta(&self) -> &[f64] {
        &self.eta
    }

    pub fn ub(&self) -> &[f64] {
        &self.ub
    }

    /// Number of grid points per dimension.
    pub fn widths(&self) -> &[u64] {
        &self.widths
    }

    pub fn num_symbols(&self) -> u64 {
        self.num_symbols
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Map a continuous vector to the symbol of its nearest grid point.
    ///
    /// Values outside `[lb - eta/2, ub + eta/2]` are reported as
    /// [`QuantizerError::QuantizationOutOfRange`], never wrapped.
    pub fn conc_to_flat(&self, x: &[f64]) -> Result<Symbol, QuantizerError> {
        self.encode(x, false)
    }

    /// Like [`conc_to_flat`](Self::conc_to_flat) but clamps each cell index
    /// into the grid instead of failing.
    pub fn conc_to_flat_clamped(&self, x: &[f64]) -> Result<Symbol, QuantizerError> {
        self.encode(x, true)
    }

    /// Map a symbol back to its grid point `lb + eta * k`.
    pub fn flat_to_conc(&self, flat: Symbol) -> Result<Vec<f64>, QuantizerError> {
        if flat >= self.num_symbols {
            return Err(QuantizerError::SymbolOutOfRange {
                symbol: flat,
                num_symbols: self.num_symbols,
            });
        }

        let mut remaining = flat;
        let mut point = Vec::with_capacity(self.dim());
        for dim in 0..self.dim() {
            let k = remaining % self.widths[dim];
            remaining /= self.widths[dim];
            point.push(self.grid_point(dim, k));
        }
        Ok(point)
    }

    fn encode(&self, x: &[f64], clamp: bool) -> Result<Symbol, QuantizerError> {
        if x.len() != self.dim() {
            return Err(QuantizerError::DimensionMismatch {
                expected: self.dim(),
                found: x.len(),
            });
        }

        let mut flat: Symbol = 0;
        let mut volume: u64 = 1;
        for (dim, &value) in x.iter().enumerate() {
            if !value.is_finite() {
                return Err(QuantizerError::NonFinite { dim, value });
            }
            let width = self.widths[dim];
            let mut index = self.cell_index(dim, value);
            if index < 0 || index >= width as i64 {
                if !clamp {
                    return Err(QuantizerError::QuantizationOutOfRange {
                        dim,
                        index,
                        width,
                        value,
                    });
                }
                index = index.clamp(0, width as i64 - 1);
            }
            flat += index as u64 * volume;
            volume *= width;
        }
        Ok(flat)
    }

    // Center-of-cell rounding: floor((v - lb + eta/2) / eta).
    fn cell_index(&self, dim: usize, value: f64) -> i64 {
        match self.precision {
            Precision::Double => {
                let lb = self.lb[dim];
                let eta = self.eta[dim];
                ((value - lb + eta / 2.0) / eta).floor() as i64
            }
            Precision::Single => {
                let lb = self.lb[dim] as f32;
                let eta = self.eta[dim] as f32;
                ((value as f32 - lb + eta / 2.0) / eta).floor() as i64
            }
        }
    }

    fn grid_point(&self, dim: usize, k: u64) -> f64 {
        match self.precision {
            Precision::Double => self.lb[dim] + self.eta[dim] * k as f64,
            Precision::Single => (self.lb[dim] as f32 + self.eta[dim] as f32 * k as f32) as f64,
        }
    }
}
