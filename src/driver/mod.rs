//! The closed-loop driver.
//!
//! A [`ClosedLoop`] is advanced by an external clock: every call to
//! [`ClosedLoop::tick`] covers one tick. Control periods are split into
//! tick-sized sub-steps by [`PeriodSchedule`], so one period spans several
//! ticks and the plant never runs past the end of a period.

mod closed_loop;
pub mod error;
mod schedule;
mod tail;

pub use closed_loop::{ClosedLoop, Phase, PeriodRecord, PostHook, TickOutcome};
pub use error::LoopError;
pub use schedule::{PeriodSchedule, TickEstimator};
pub use tail::{PathTail, Segment};
