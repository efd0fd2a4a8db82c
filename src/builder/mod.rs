//! Builder API for assembling a closed loop.
//!
//! Parts can be supplied one by one, or all at once from a validated
//! [`LoopConfig`](crate::config::LoopConfig) with
//! [`ClosedLoopBuilder::from_config`].

mod closed_loop;
pub mod error;

pub use closed_loop::ClosedLoopBuilder;
pub use error::BuildError;
