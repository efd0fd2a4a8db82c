//! Bounded trailing history of traversed period segments.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Continuous-state segment covered by one control period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// State when the control action was chosen
    pub from: Vec<f64>,
    /// State at the end of the period (after any repair)
    pub to: Vec<f64>,
}

/// The last `capacity` segments of a run, oldest first.
///
/// A capacity of zero keeps nothing.
///
/// # Example
///
/// ```rust
/// use symloop::driver::{PathTail, Segment};
///
/// let mut tail = PathTail::new(2);
/// for i in 0..3 {
///     let x = i as f64;
///     tail.record(Segment { from: vec![x], to: vec![x + 1.0] });
/// }
///
/// let path = tail.get_path();
/// assert_eq!(path, vec![&[1.0][..], &[2.0][..], &[3.0][..]]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PathTail {
    capacity: usize,
    segments: VecDeque<Segment>,
}

impl PathTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            segments: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a segment, evicting the oldest when full.
    pub fn record(&mut self, segment: Segment) {
        if self.capacity == 0 {
            return;
        }
        if self.segments.len() == self.capacity {
            self.segments.pop_front();
        }
        self.segments.push_back(segment);
    }

    /// States along the tail: the start of the oldest segment, then the
    /// end of every segment.
    pub fn get_path(&self) -> Vec<&[f64]> {
        let mut path = Vec::with_capacity(self.segments.len() + 1);
        if let Some(first) = self.segments.front() {
            path.push(first.from.as_slice());
        }
        for segment in &self.segments {
            path.push(segment.to.as_slice());
        }
        path
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
