//! Symbolic controllers as finite-state transducers.
//!
//! A [`Machine`] is the read-only transition table loaded from a
//! controller file. A [`Controller`] owns a machine and walks it, one
//! observed plant symbol at a time.

pub mod controller;
pub mod error;
#[allow(clippy::module_inception)]
pub mod machine;
pub mod transition;

pub use controller::Controller;
pub use error::MachineError;
pub use machine::{Machine, Semantic};
pub use transition::MachineTransition;
