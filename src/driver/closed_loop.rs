//! The tick-driven closed loop.

use crate::core::{Quantizer, Symbol};
use crate::driver::error::LoopError;
use crate::driver::schedule::{PeriodSchedule, TickEstimator};
use crate::driver::tail::{PathTail, Segment};
use crate::dynamics::Dynamics;
use crate::machine::Controller;
use crate::model::{ConsistencyChecker, ConsistencyReport};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hook applied to the continuous state after every tick update.
pub type PostHook = Box<dyn FnMut(Vec<f64>) -> Vec<f64>>;

/// Where the loop is within a control period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Next tick quantizes the state and queries the controller.
    AwaitingAction,
    /// A control action is held while the period is integrated.
    Integrating,
}

/// Summary of one completed control period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub index: u64,
    pub x_symbol: Symbol,
    pub u_symbol: Symbol,
    pub control: Vec<f64>,
    pub pre_state: Vec<f64>,
    pub post_state: Vec<f64>,
    pub substeps: u64,
    /// Simulated time covered by the period's sub-steps
    pub elapsed: f64,
    pub repaired: bool,
}

/// Result of a single tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    pub phase: Phase,
    pub completed: Option<PeriodRecord>,
}

#[derive(Clone, Debug)]
struct ActivePeriod {
    x_symbol: Symbol,
    u_symbol: Symbol,
    control: Vec<f64>,
    pre_state: Vec<f64>,
    schedule: PeriodSchedule,
}

#[derive(Clone, Debug)]
enum LoopState {
    AwaitingAction,
    Integrating(ActivePeriod),
}

/// Couples a symbolic controller with a continuous plant.
///
/// Each control period: quantize the state, query the controller, turn
/// the first returned control symbol into a control vector, then advance
/// the plant over exactly one period, one external tick at a time. At the
/// end of the period the post-state is checked against the symbolic model
/// when one is loaded.
///
/// Built with [`ClosedLoopBuilder`](crate::builder::ClosedLoopBuilder).
/// A run that fails with [`LoopError`] should be abandoned; nothing is
/// rolled back.
pub struct ClosedLoop {
    pub(crate) state_quantizer: Quantizer,
    pub(crate) control_quantizer: Quantizer,
    pub(crate) controller: Controller,
    pub(crate) dynamics: Dynamics,
    pub(crate) checker: Option<ConsistencyChecker>,
    pub(crate) period: f64,
    pub(crate) state: Vec<f64>,
    pub(crate) post_hook: Option<PostHook>,
    pub(crate) estimator: TickEstimator,
    pub(crate) tail: PathTail,
    loop_state: LoopState,
    sim_time: f64,
    wall_time: f64,
    periods_completed: u64,
    last_action: Option<(Symbol, Vec<f64>)>,
    run_id: Uuid,
}

impl ClosedLoop {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        state_quantizer: Quantizer,
        control_quantizer: Quantizer,
        controller: Controller,
        dynamics: Dynamics,
        checker: Option<ConsistencyChecker>,
        period: f64,
        initial_state: Vec<f64>,
        post_hook: Option<PostHook>,
        warmup_ticks: u32,
        tail_length: usize,
    ) -> Self {
        let run_id = Uuid::new_v4();
        info!(
            "run {}: period {}s, {:?}, consistency check {}",
            run_id,
            period,
            dynamics,
            if checker.is_some() { "on" } else { "off" }
        );
        Self {
            state_quantizer,
            control_quantizer,
            controller,
            dynamics,
            checker,
            period,
            state: initial_state,
            post_hook,
            estimator: TickEstimator::new(warmup_ticks),
            tail: PathTail::new(tail_length),
            loop_state: LoopState::AwaitingAction,
            sim_time: 0.0,
            wall_time: 0.0,
            periods_completed: 0,
            last_action: None,
            run_id,
        }
    }

    /// Advance the loop by one external clock tick of length `dt`.
    pub fn tick(&mut self, dt: f64) -> Result<TickOutcome, LoopError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(LoopError::InvalidTickDuration(dt));
        }
        self.wall_time += dt;

        let Some(tick_estimate) = self.estimator.observe(dt) else {
            return Ok(TickOutcome {
                phase: self.phase(),
                completed: None,
            });
        };

        if matches!(self.loop_state, LoopState::AwaitingAction) {
            self.begin_period(tick_estimate)?;
        }
        let completed = self.advance()?;

        Ok(TickOutcome {
            phase: self.phase(),
            completed,
        })
    }

    /// Tick with a fixed `dt` until `periods` more control periods complete.
    pub fn run_periods(&mut self, periods: u64, dt: f64) -> Result<Vec<PeriodRecord>, LoopError> {
        let mut records = Vec::with_capacity(periods as usize);
        while (records.len() as u64) < periods {
            if let Some(record) = self.tick(dt)?.completed {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn begin_period(&mut self, tick_estimate: f64) -> Result<(), LoopError> {
        let x_symbol = self.state_quantizer.conc_to_flat(&self.state)?;
        let machine_state = self.controller.current_state();
        let actions = self.controller.get_control_actions(x_symbol)?;
        let u_symbol = *actions.first().ok_or(LoopError::EmptyControlAction {
            state: machine_state,
            x_symbol,
        })?;
        let control = self.control_quantizer.flat_to_conc(u_symbol)?;
        let schedule = PeriodSchedule::new(self.period, tick_estimate);

        debug!(
            "period {}: x_{} -> u_{} {:?} over {} ticks",
            self.periods_completed,
            x_symbol,
            u_symbol,
            control,
            schedule.ticks()
        );
        self.last_action = Some((u_symbol, control.clone()));
        self.loop_state = LoopState::Integrating(ActivePeriod {
            x_symbol,
            u_symbol,
            control,
            pre_state: self.state.clone(),
            schedule,
        });
        Ok(())
    }

    fn advance(&mut self) -> Result<Option<PeriodRecord>, LoopError> {
        let LoopState::Integrating(active) = &mut self.loop_state else {
            return Ok(None);
        };

        let first = active.schedule.taken() == 0;
        if let Some(dt) = active.schedule.next_substep() {
            match &self.dynamics {
                Dynamics::UsesOde { model, solver } => {
                    self.state = solver.integrate(model.as_ref(), &self.state, &active.control, dt);
                }
                // Discrete plants jump once, at the start of the period.
                Dynamics::UsesDiscreteUpdate(model) if first => {
                    self.state = model.next_state(&self.state, &active.control);
                }
                Dynamics::UsesDiscreteUpdate(_) => {}
            }
            self.sim_time += dt;
            if let Some(hook) = self.post_hook.as_mut() {
                let state = std::mem::take(&mut self.state);
                self.state = hook(state);
            }
        }

        if !active.schedule.is_complete() {
            return Ok(None);
        }
        match std::mem::replace(&mut self.loop_state, LoopState::AwaitingAction) {
            LoopState::Integrating(active) => self.finish_period(active).map(Some),
            LoopState::AwaitingAction => Ok(None),
        }
    }

    fn finish_period(&mut self, active: ActivePeriod) -> Result<PeriodRecord, LoopError> {
        let simulated = std::mem::take(&mut self.state);
        let (post_state, repaired) = match self.checker.as_mut() {
            Some(checker) => {
                let before = checker.report().count();
                let post = checker.check_and_repair(active.x_symbol, active.u_symbol, simulated)?;
                (post, checker.report().count() > before)
            }
            None => (simulated, false),
        };
        self.state = post_state.clone();

        self.tail.record(Segment {
            from: active.pre_state.clone(),
            to: post_state.clone(),
        });

        let record = PeriodRecord {
            index: self.periods_completed,
            x_symbol: active.x_symbol,
            u_symbol: active.u_symbol,
            control: active.control,
            pre_state: active.pre_state,
            post_state,
            substeps: active.schedule.taken(),
            elapsed: active.schedule.elapsed(),
            repaired,
        };
        self.periods_completed += 1;
        debug!(
            "period {} done: {:?} -> {:?}{}",
            record.index,
            record.pre_state,
            record.post_state,
            if repaired { " (repaired)" } else { "" }
        );
        Ok(record)
    }

    pub fn phase(&self) -> Phase {
        match self.loop_state {
            LoopState::AwaitingAction => Phase::AwaitingAction,
            LoopState::Integrating(_) => Phase::Integrating,
        }
    }

    /// Current continuous state.
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Symbol of the current continuous state.
    pub fn current_symbol(&self) -> Result<Symbol, LoopError> {
        Ok(self.state_quantizer.conc_to_flat(&self.state)?)
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn state_quantizer(&self) -> &Quantizer {
        &self.state_quantizer
    }

    pub fn control_quantizer(&self) -> &Quantizer {
        &self.control_quantizer
    }

    /// Configured control period.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Simulated time across all sub-steps so far.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Sum of all tick durations fed to [`tick`](Self::tick).
    pub fn wall_time(&self) -> f64 {
        self.wall_time
    }

    pub fn periods_completed(&self) -> u64 {
        self.periods_completed
    }

    /// Last issued control symbol and its control vector.
    pub fn last_action(&self) -> Option<(Symbol, &[f64])> {
        self.last_action
            .as_ref()
            .map(|(symbol, control)| (*symbol, control.as_slice()))
    }

    /// Consistency report, when a symbolic model is loaded.
    pub fn report(&self) -> Option<&ConsistencyReport> {
        self.checker.as_ref().map(ConsistencyChecker::report)
    }

    pub fn tail(&self) -> &PathTail {
        &self.tail
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}
