//! Fixed-step classical Runge-Kutta integration.

use super::{DynamicsError, Ode};

/// Classical 4th-order Runge-Kutta with a fixed number of sub-steps.
///
/// `integrate` splits the interval into `n_int` equal steps; more steps
/// trade time for lower truncation error.
///
/// # Example
///
/// ```rust
/// use symloop::dynamics::RungeKutta4;
///
/// let rk4 = RungeKutta4::new(5).unwrap();
/// let decay = |x: &[f64], _u: &[f64]| vec![-x[0]];
/// let x = rk4.integrate(&decay, &[1.0], &[], 1.0);
/// assert!((x[0] - (-1.0f64).exp()).abs() < 1e-4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RungeKutta4 {
    n_int: usize,
}

impl Default for RungeKutta4 {
    fn default() -> Self {
        Self {
            n_int: Self::DEFAULT_SUBSTEPS,
        }
    }
}

impl RungeKutta4 {
    pub const DEFAULT_SUBSTEPS: usize = 5;

    pub fn new(n_int: usize) -> Result<Self, DynamicsError> {
        if n_int == 0 {
            return Err(DynamicsError::InvalidSubsteps);
        }
        Ok(Self { n_int })
    }

    pub fn n_int(&self) -> usize {
        self.n_int
    }

    /// Advance `x` by `tau` with the control `u` held constant.
    ///
    /// Pure numeric work: non-finite output from a malformed model is
    /// passed through unchanged.
    pub fn integrate<O: Ode + ?Sized>(&self, ode: &O, x: &[f64], u: &[f64], tau: f64) -> Vec<f64> {
        let h = tau / self.n_int as f64;
        let mut state = x.to_vec();
        let mut tmp = vec![0.0; state.len()];

        for _ in 0..self.n_int {
            let k1 = ode.derivative(&state, u);
            for i in 0..state.len() {
                tmp[i] = state[i] + h / 2.0 * k1[i];
            }
            let k2 = ode.derivative(&tmp, u);
            for i in 0..state.len() {
                tmp[i] = state[i] + h / 2.0 * k2[i];
            }
            let k3 = ode.derivative(&tmp, u);
            for i in 0..state.len() {
                tmp[i] = state[i] + h * k3[i];
            }
            let k4 = ode.derivative(&tmp, u);
            for i in 0..state.len() {
                state[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
            }
        }
        state
    }
}
