//! Axis-aligned hyperrectangles.
//!
//! Regions in the symbolic model dump and the initial set of a run are
//! written as intervals joined by `x`, for example `[0,1]x[-0.5,0.5]`.
//! Unions of boxes are joined by `U`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced while building or parsing a hyperrectangle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HyperRectError {
    #[error("lower and upper bounds differ in dimension ({lb} vs {ub})")]
    BoundsDimension { lb: usize, ub: usize },

    #[error("lower bound {lb} exceeds upper bound {ub} in dimension {dim}")]
    InvertedBounds { dim: usize, lb: f64, ub: f64 },

    #[error("expected {expected} intervals, found {found} in '{text}'")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        text: String,
    },

    #[error("interval '{0}' must contain exactly two comma-separated numbers")]
    MalformedInterval(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("empty hyperrectangle text")]
    Empty,
}

/// An axis-aligned box `[lb[0], ub[0]] x ... x [lb[d-1], ub[d-1]]`.
///
/// # Example
///
/// ```rust
/// use symloop::core::HyperRect;
///
/// let rect: HyperRect = "[0,1]x[0,1]".parse().unwrap();
/// assert_eq!(rect.center(), vec![0.5, 0.5]);
/// assert!(rect.contains(&[1.0, 0.25]));
/// assert!(!rect.contains(&[1.2, 0.5]));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HyperRect {
    lb: Vec<f64>,
    ub: Vec<f64>,
}

impl HyperRect {
    /// Build a box from its corners. Requires `lb[i] <= ub[i]` everywhere.
    pub fn new(lb: Vec<f64>, ub: Vec<f64>) -> Result<Self, HyperRectError> {
        if lb.len() != ub.len() {
            return Err(HyperRectError::BoundsDimension {
                lb: lb.len(),
                ub: ub.len(),
            });
        }
        for (dim, (&l, &u)) in lb.iter().zip(ub.iter()).enumerate() {
            // NaN bounds fail this comparison too
            if !(l <= u) {
                return Err(HyperRectError::InvertedBounds { dim, lb: l, ub: u });
            }
        }
        Ok(Self { lb, ub })
    }

    pub fn lb(&self) -> &[f64] {
        &self.lb
    }

    pub fn ub(&self) -> &[f64] {
        &self.ub
    }

    pub fn dim(&self) -> usize {
        self.lb.len()
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec<f64> {
        self.lb
            .iter()
            .zip(self.ub.iter())
            .map(|(l, u)| l + (u - l) / 2.0)
            .collect()
    }

    /// Component-wise closed membership test. Points of another dimension
    /// are never contained.
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.dim()
            && point
                .iter()
                .zip(self.lb.iter().zip(self.ub.iter()))
                .all(|(v, (l, u))| *l <= *v && *v <= *u)
    }

    /// Draw a point uniformly from the box.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.lb
            .iter()
            .zip(&self.ub)
            .map(|(&l, &u)| rng.gen_range(l..=u))
            .collect()
    }

    /// Parse a single box, checking its dimension when `dim` is given.
    pub fn parse_with_dim(text: &str, dim: Option<usize>) -> Result<Self, HyperRectError> {
        let intervals: Vec<&str> = text.split('x').collect();
        if text.trim().is_empty() {
            return Err(HyperRectError::Empty);
        }
        if let Some(expected) = dim {
            if intervals.len() != expected {
                return Err(HyperRectError::DimensionMismatch {
                    expected,
                    found: intervals.len(),
                    text: text.trim().to_string(),
                });
            }
        }

        let mut lb = Vec::with_capacity(intervals.len());
        let mut ub = Vec::with_capacity(intervals.len());
        for interval in intervals {
            let cleaned: String = interval
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '[' && *c != ']')
                .collect();
            let bounds: Vec<&str> = cleaned.split(',').collect();
            if bounds.len() != 2 {
                return Err(HyperRectError::MalformedInterval(interval.trim().to_string()));
            }
            lb.push(parse_number(bounds[0])?);
            ub.push(parse_number(bounds[1])?);
        }
        Self::new(lb, ub)
    }
}

fn parse_number(text: &str) -> Result<f64, HyperRectError> {
    text.parse::<f64>()
        .map_err(|_| HyperRectError::InvalidNumber(text.to_string()))
}

/// Parse a union of boxes `A U B U ...`, in the order written.
///
/// ```rust
/// use symloop::core::parse_union;
///
/// let boxes = parse_union("[0,1]x[0,1] U [2,3]x[2,3]", Some(2)).unwrap();
/// assert_eq!(boxes.len(), 2);
/// assert_eq!(boxes[1].lb(), &[2.0, 2.0]);
/// ```
pub fn parse_union(text: &str, dim: Option<usize>) -> Result<Vec<HyperRect>, HyperRectError> {
    text.split('U')
        .map(|part| HyperRect::parse_with_dim(part, dim))
        .collect()
}

impl std::str::FromStr for HyperRect {
    type Err = HyperRectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_dim(s, None)
    }
}

impl fmt::Display for HyperRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (l, u)) in self.lb.iter().zip(self.ub.iter()).enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "[{},{}]", l, u)?;
        }
        Ok(())
    }
}
