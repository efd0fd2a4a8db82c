//! Splitting a control period into clock ticks.

/// Sub-step plan for one control period.
///
/// The period is cut into `ticks = max(1, floor(period / tick))` sub-steps
/// of nominal length `tick`. The leftover `period - ticks * tick` goes to
/// the first sub-step and the last sub-step closes the remaining gap, so
/// the durations always add up to `period`.
///
/// # Example
///
/// ```rust
/// use symloop::driver::PeriodSchedule;
///
/// let mut schedule = PeriodSchedule::new(1.0, 0.3);
/// let steps: Vec<f64> = std::iter::from_fn(|| schedule.next_substep()).collect();
/// assert_eq!(steps.len(), 3);
/// assert!((steps.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// assert!(schedule.is_complete());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodSchedule {
    period: f64,
    tick: f64,
    ticks: u64,
    taken: u64,
    elapsed: f64,
}

impl PeriodSchedule {
    /// Plan a period. Both arguments must be positive and finite.
    pub fn new(period: f64, tick: f64) -> Self {
        let ticks = ((period / tick).floor() as u64).max(1);
        Self {
            period,
            tick,
            ticks,
            taken: 0,
            elapsed: 0.0,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Number of sub-steps in the period.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Sub-steps handed out so far.
    pub fn taken(&self) -> u64 {
        self.taken
    }

    /// Simulated time handed out so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_complete(&self) -> bool {
        self.taken >= self.ticks
    }

    /// Duration of the next sub-step, or `None` once the period is covered.
    pub fn next_substep(&mut self) -> Option<f64> {
        if self.is_complete() {
            return None;
        }
        let dt = if self.taken + 1 == self.ticks {
            self.period - self.elapsed
        } else if self.taken == 0 {
            self.tick + (self.period - self.ticks as f64 * self.tick)
        } else {
            self.tick
        };
        self.taken += 1;
        self.elapsed += dt;
        Some(dt)
    }
}

/// Running estimate of the external clock's tick length.
///
/// Skips the first `warmup_ticks` ticks, then reports the running average
/// `avg = (avg + dt) / 2` as it stood before the current tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickEstimator {
    average: Option<f64>,
    warmup_remaining: u32,
}

impl TickEstimator {
    pub fn new(warmup_ticks: u32) -> Self {
        Self {
            average: None,
            warmup_remaining: warmup_ticks,
        }
    }

    /// Record one tick. Returns the estimate to plan with, or `None` while
    /// still warming up.
    pub fn observe(&mut self, dt: f64) -> Option<f64> {
        let average = *self.average.get_or_insert(dt);
        let estimate = if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            None
        } else {
            Some(average)
        };
        self.average = Some((average + dt) / 2.0);
        estimate
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }
}
