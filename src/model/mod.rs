//! Symbolic model dumps and the simulation consistency check.
//!
//! The synthesis tool can dump, for every `(state symbol, control symbol)`
//! pair, the region the plant provably reaches after one control period.
//! When a dump is available the closed loop compares each simulated
//! post-state against it and snaps drifting states back into the region.

mod consistency;
pub mod error;
mod symbolic_model;

pub use consistency::{
    check_and_repair, ConsistencyChecker, ConsistencyReport, ConsistencyViolation,
    RegionMembership, Repair,
};
pub use error::ModelError;
pub use symbolic_model::SymbolicModel;
