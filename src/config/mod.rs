//! Run configuration.
//!
//! A [`LoopConfig`] is read from JSON and checked with [`LoopConfig::validate`],
//! which reports every problem at once instead of stopping at the first.
//!
//! ```json
//! {
//!   "states":   { "first_symbol": [0, 0], "last_symbol": [3, 3], "quantizers": [1, 1] },
//!   "controls": { "first_symbol": [-1], "last_symbol": [1], "quantizers": [1] },
//!   "dynamics": { "step_time": 0.5, "use_ode": true, "ode_substeps": 5 },
//!   "simulation": {
//!     "initial_set": "[0,1]x[0,1]",
//!     "initial_state": "random",
//!     "seed": 7,
//!     "path_tail_length": 20,
//!     "warmup_ticks": 10,
//!     "region_membership": "first_box"
//!   },
//!   "precision": "double",
//!   "controller_file": "robot.mdf",
//!   "model_dump_file": "robot_model.txt"
//! }
//! ```

pub mod error;
mod loop_config;

pub use error::{ConfigError, SetupError};
pub use loop_config::{
    DynamicsConfig, GridConfig, InitialState, LoopConfig, NamedInitialState, SimulationConfig,
};
