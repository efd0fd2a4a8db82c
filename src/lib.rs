//! Symloop: closed-loop simulation of symbolic controllers
//!
//! A symbolic controller is a finite-state machine synthesized over a
//! quantized abstraction of a continuous plant. Symloop runs such a
//! controller against the plant it was synthesized for: the continuous
//! state is quantized into a symbol, the machine answers with a control
//! symbol, the symbol is turned back into a control vector and the plant
//! is integrated for one control period.
//!
//! # Core Concepts
//!
//! - **Quantizer**: bijection between grid points and symbols
//! - **Controller**: the loaded machine plus its current state
//! - **Dynamics**: ODE (integrated with RK4) or discrete update
//! - **Consistency check**: optional comparison of every simulated
//!   post-state with the region proven by the symbolic model
//! - **Closed loop**: tick-driven driver tying the above together
//!
//! # Example
//!
//! ```rust
//! use symloop::builder::ClosedLoopBuilder;
//! use symloop::core::Quantizer;
//! use symloop::dynamics::Dynamics;
//! use symloop::machine::{Controller, Machine};
//!
//! let machine: Machine = "\
//! semantic: mealy
//! states: 1
//! state_transitions: 2
//! trans_0_0: {0;0;[1]}
//! trans_0_1: {0;1;[0]}
//! ".parse().unwrap();
//!
//! let mut cl = ClosedLoopBuilder::new()
//!     .state_quantizer(Quantizer::new(vec![0.0], vec![1.0], vec![1.0]).unwrap())
//!     .control_quantizer(Quantizer::new(vec![0.0], vec![1.0], vec![1.0]).unwrap())
//!     .controller(Controller::new(machine))
//!     .dynamics(Dynamics::ode(|_x: &[f64], u: &[f64]| vec![u[0]], 5).unwrap())
//!     .period(1.0)
//!     .initial_state(vec![0.0])
//!     .build()
//!     .unwrap();
//!
//! let records = cl.run_periods(2, 0.25).unwrap();
//! assert_eq!(records[0].u_symbol, 1);
//! assert_eq!(records[1].u_symbol, 0);
//! assert!((cl.state()[0] - 1.0).abs() < 1e-9);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod driver;
pub mod dynamics;
pub mod machine;
pub mod model;
pub mod node;

// Re-export commonly used types
pub use builder::{BuildError, ClosedLoopBuilder};
pub use config::{ConfigError, LoopConfig, SetupError};
pub use core::{HyperRect, Precision, Quantizer, Symbol};
pub use driver::{ClosedLoop, LoopError, PeriodRecord, Phase, TickOutcome};
pub use dynamics::{DiscreteUpdate, Dynamics, Ode, RungeKutta4};
pub use machine::{Controller, Machine, MachineError};
pub use model::{ConsistencyChecker, ConsistencyReport, RegionMembership, SymbolicModel};
