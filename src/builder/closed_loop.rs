//! Builder for assembling a closed loop.

use crate::builder::error::BuildError;
use crate::config::{LoopConfig, SetupError};
use crate::core::Quantizer;
use crate::driver::{ClosedLoop, PostHook};
use crate::dynamics::Dynamics;
use crate::machine::Controller;
use crate::model::{ConsistencyChecker, SymbolicModel};
use log::info;

/// Builder for [`ClosedLoop`] with a fluent API.
///
/// Quantizers, controller, dynamics and initial state are required. The
/// control period defaults to `1.0`.
pub struct ClosedLoopBuilder {
    state_quantizer: Option<Quantizer>,
    control_quantizer: Option<Quantizer>,
    controller: Option<Controller>,
    dynamics: Option<Dynamics>,
    checker: Option<ConsistencyChecker>,
    period: f64,
    initial_state: Option<Vec<f64>>,
    post_hook: Option<PostHook>,
    warmup_ticks: u32,
    tail_length: usize,
}

impl ClosedLoopBuilder {
    pub fn new() -> Self {
        Self {
            state_quantizer: None,
            control_quantizer: None,
            controller: None,
            dynamics: None,
            checker: None,
            period: 1.0,
            initial_state: None,
            post_hook: None,
            warmup_ticks: 0,
            tail_length: 0,
        }
    }

    /// Prepare a builder from a config, loading the controller file and,
    /// when configured, the model dump.
    ///
    /// `model` is used as an ODE right-hand side when `use_ode` is set and
    /// as a discrete update otherwise. The returned builder can still be
    /// adjusted (for example with a post hook) before [`build`](Self::build).
    pub fn from_config<F>(config: &LoopConfig, model: F) -> Result<Self, SetupError>
    where
        F: Fn(&[f64], &[f64]) -> Vec<f64> + 'static,
    {
        config.validated()?;

        let state_quantizer = config.state_quantizer()?;
        let control_quantizer = config.control_quantizer()?;
        let dynamics = if config.dynamics.use_ode {
            Dynamics::ode(model, config.dynamics.ode_substeps)?
        } else {
            Dynamics::discrete(model)
        };
        let controller = Controller::from_file(&config.controller_file)?;

        let mut builder = Self::new();
        if let Some(path) = &config.model_dump_file {
            let model = SymbolicModel::from_file(
                path,
                state_quantizer.num_symbols(),
                control_quantizer.num_symbols(),
            )?;
            model.check_dim(state_quantizer.dim())?;
            builder = builder.consistency_checker(ConsistencyChecker::new(
                model,
                config.simulation.region_membership,
            ));
        } else {
            info!("no model dump configured; consistency checking disabled");
        }

        Ok(builder
            .initial_state(config.initial_state().map_err(|e| SetupError::Invalid(vec![e]))?)
            .state_quantizer(state_quantizer)
            .control_quantizer(control_quantizer)
            .controller(controller)
            .dynamics(dynamics)
            .period(config.dynamics.step_time)
            .warmup_ticks(config.simulation.warmup_ticks)
            .tail_length(config.simulation.path_tail_length))
    }

    pub fn state_quantizer(mut self, quantizer: Quantizer) -> Self {
        self.state_quantizer = Some(quantizer);
        self
    }

    pub fn control_quantizer(mut self, quantizer: Quantizer) -> Self {
        self.control_quantizer = Some(quantizer);
        self
    }

    pub fn controller(mut self, controller: Controller) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn dynamics(mut self, dynamics: Dynamics) -> Self {
        self.dynamics = Some(dynamics);
        self
    }

    /// Check every post-state against a symbolic model (optional).
    pub fn consistency_checker(mut self, checker: ConsistencyChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Control period in seconds.
    pub fn period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn initial_state(mut self, state: Vec<f64>) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Applied to the state after every tick update.
    pub fn post_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(Vec<f64>) -> Vec<f64> + 'static,
    {
        self.post_hook = Some(Box::new(hook));
        self
    }

    /// Ticks to ignore before the first control query.
    pub fn warmup_ticks(mut self, ticks: u32) -> Self {
        self.warmup_ticks = ticks;
        self
    }

    /// Number of period segments to keep in the path tail.
    pub fn tail_length(mut self, length: usize) -> Self {
        self.tail_length = length;
        self
    }

    /// Build the closed loop.
    /// Returns an error if required parts are missing or disagree in size.
    pub fn build(self) -> Result<ClosedLoop, BuildError> {
        let state_quantizer = self
            .state_quantizer
            .ok_or(BuildError::MissingStateQuantizer)?;
        let control_quantizer = self
            .control_quantizer
            .ok_or(BuildError::MissingControlQuantizer)?;
        let controller = self.controller.ok_or(BuildError::MissingController)?;
        let dynamics = self.dynamics.ok_or(BuildError::MissingDynamics)?;
        let initial_state = self.initial_state.ok_or(BuildError::MissingInitialState)?;

        if !(self.period > 0.0 && self.period.is_finite()) {
            return Err(BuildError::InvalidPeriod(self.period));
        }
        if initial_state.len() != state_quantizer.dim() {
            return Err(BuildError::InitialStateDimension {
                expected: state_quantizer.dim(),
                found: initial_state.len(),
            });
        }
        let machine = controller.machine();
        for state in 0..machine.states() {
            for (transition, trans) in machine.state_transitions(state).iter().enumerate() {
                if let Some(&symbol) = trans
                    .outputs
                    .iter()
                    .find(|&&s| s >= control_quantizer.num_symbols())
                {
                    return Err(BuildError::ControlSymbolOutOfRange {
                        state,
                        transition,
                        symbol,
                        num_symbols: control_quantizer.num_symbols(),
                    });
                }
            }
        }
        if let Some(checker) = &self.checker {
            let model = checker.model();
            if model.dim() != state_quantizer.dim() {
                return Err(BuildError::ModelDimension {
                    expected: state_quantizer.dim(),
                    found: model.dim(),
                });
            }
            if model.num_x_symbols() != state_quantizer.num_symbols()
                || model.num_u_symbols() != control_quantizer.num_symbols()
            {
                return Err(BuildError::ModelSizeMismatch {
                    model_x: model.num_x_symbols(),
                    model_u: model.num_u_symbols(),
                    grid_x: state_quantizer.num_symbols(),
                    grid_u: control_quantizer.num_symbols(),
                });
            }
        }

        Ok(ClosedLoop::new(
            state_quantizer,
            control_quantizer,
            controller,
            dynamics,
            self.checker,
            self.period,
            initial_state,
            self.post_hook,
            self.warmup_ticks,
            self.tail_length,
        ))
    }
}

impl Default for ClosedLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
