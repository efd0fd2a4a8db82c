//! Plant dynamics and their numerical integration.
//!
//! A plant is either a continuous-time ODE `dx/dt = f(x, u)`, advanced
//! with [`RungeKutta4`], or a discrete update `x' = g(x, u)` applied once
//! per control period. The choice is made once, when the [`Dynamics`]
//! value is built.

mod integrator;

pub use integrator::RungeKutta4;

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DynamicsError {
    #[error("the integrator needs at least one sub-step")]
    InvalidSubsteps,
}

/// Continuous-time model: returns `dx/dt` at `(state, control)`.
pub trait Ode {
    fn derivative(&self, state: &[f64], control: &[f64]) -> Vec<f64>;
}

impl<F> Ode for F
where
    F: Fn(&[f64], &[f64]) -> Vec<f64>,
{
    fn derivative(&self, state: &[f64], control: &[f64]) -> Vec<f64> {
        self(state, control)
    }
}

/// Discrete-time model: returns the state one control period later.
pub trait DiscreteUpdate {
    fn next_state(&self, state: &[f64], control: &[f64]) -> Vec<f64>;
}

impl<F> DiscreteUpdate for F
where
    F: Fn(&[f64], &[f64]) -> Vec<f64>,
{
    fn next_state(&self, state: &[f64], control: &[f64]) -> Vec<f64> {
        self(state, control)
    }
}

/// The plant model driven by the closed loop.
pub enum Dynamics {
    UsesOde {
        model: Box<dyn Ode>,
        solver: RungeKutta4,
    },
    UsesDiscreteUpdate(Box<dyn DiscreteUpdate>),
}

impl Dynamics {
    /// ODE plant integrated with `n_int` RK4 sub-steps per advance.
    pub fn ode(model: impl Ode + 'static, n_int: usize) -> Result<Self, DynamicsError> {
        Ok(Self::UsesOde {
            model: Box::new(model),
            solver: RungeKutta4::new(n_int)?,
        })
    }

    /// Discrete plant applied once per control period.
    pub fn discrete(model: impl DiscreteUpdate + 'static) -> Self {
        Self::UsesDiscreteUpdate(Box::new(model))
    }

    pub fn is_ode(&self) -> bool {
        matches!(self, Self::UsesOde { .. })
    }
}

impl fmt::Debug for Dynamics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsesOde { solver, .. } => f
                .debug_struct("UsesOde")
                .field("n_int", &solver.n_int())
                .finish_non_exhaustive(),
            Self::UsesDiscreteUpdate(_) => f.write_str("UsesDiscreteUpdate"),
        }
    }
}
