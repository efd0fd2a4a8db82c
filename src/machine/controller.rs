//! Controller: a machine plus its single mutable current state.

use crate::core::Symbol;
use crate::machine::error::MachineError;
use crate::machine::machine::Machine;
use log::debug;
use std::path::Path;

/// Deterministic symbolic controller.
///
/// Starts in machine state 0 and only moves when a query matches one of
/// the current state's transitions. There is no reset: replaying a query
/// sequence on a freshly built controller reproduces the same outputs.
///
/// A controller is not synchronised; each control loop owns its own.
///
/// # Example
///
/// ```rust
/// use symloop::machine::{Controller, Machine, MachineError, MachineTransition, Semantic};
///
/// let machine = Machine::new(
///     Semantic::Mealy,
///     vec![vec![MachineTransition::new(1, 4, vec![40])], vec![]],
/// )
/// .unwrap();
/// let mut controller = Controller::new(machine);
///
/// assert_eq!(controller.get_control_actions(4).unwrap(), vec![40]);
/// assert_eq!(controller.current_state(), 1);
/// assert!(matches!(
///     controller.get_control_actions(4),
///     Err(MachineError::ControlActionNotFound { state: 1, symbol: 4 })
/// ));
/// ```
#[derive(Clone, Debug)]
pub struct Controller {
    machine: Machine,
    current_state: usize,
    queries: u64,
}

impl Controller {
    /// Create a controller in machine state 0.
    pub fn new(machine: Machine) -> Self {
        Self {
            machine,
            current_state: 0,
            queries: 0,
        }
    }

    /// Load the machine from a controller file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MachineError> {
        Ok(Self::new(Machine::from_file(path)?))
    }

    /// Feed one observed plant symbol and return the control symbols.
    ///
    /// The first transition (in file order) whose input equals
    /// `model_state` fires. On success the controller moves to that
    /// transition's target; on failure its state is left untouched and
    /// [`MachineError::ControlActionNotFound`] is returned.
    pub fn get_control_actions(&mut self, model_state: Symbol) -> Result<Vec<Symbol>, MachineError> {
        let trans = self
            .machine
            .state_transitions(self.current_state)
            .iter()
            .find(|t| t.matches(model_state))
            .ok_or(MachineError::ControlActionNotFound {
                state: self.current_state,
                symbol: model_state,
            })?;

        debug!(
            "controller: state {} --x_{}/{:?}--> {}",
            self.current_state, model_state, trans.outputs, trans.next_state
        );
        let outputs = trans.outputs.clone();
        self.current_state = trans.next_state;
        self.queries += 1;
        Ok(outputs)
    }

    pub fn current_state(&self) -> usize {
        self.current_state
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Number of successful queries so far.
    pub fn queries(&self) -> u64 {
        self.queries
    }
}
