//! Core geometry shared by every other module.
//!
//! - [`HyperRect`]: axis-aligned regions and their text form
//! - [`Quantizer`]: the grid mapping between continuous vectors and symbols
//!
//! Everything here is immutable after construction.

mod hyperrect;
mod quantizer;

pub use hyperrect::{parse_union, HyperRect, HyperRectError};
pub use quantizer::{Precision, Quantizer, QuantizerError};

/// Flat index of one grid cell (state or control).
pub type Symbol = u64;
