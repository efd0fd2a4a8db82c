//! Cross-checks simulated post-states against the symbolic model.

use crate::core::{HyperRect, Symbol};
use crate::model::error::ModelError;
use crate::model::symbolic_model::SymbolicModel;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// How a multi-box region is tested for membership.
///
/// `FirstBox` only consults the first box of `A U B U ...`, which is what
/// dumps written by single-box tools need. `Union` accepts a point inside
/// any of the boxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionMembership {
    #[default]
    FirstBox,
    Union,
}

/// Outcome of [`check_and_repair`].
#[derive(Clone, Debug, PartialEq)]
pub enum Repair {
    /// The simulated point lies inside the region.
    Unchanged,
    /// The simulated point left the region and must be replaced.
    Snapped(Vec<f64>),
}

impl Repair {
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Snapped(_))
    }

    /// The state to continue from.
    pub fn apply(self, simulated_post: Vec<f64>) -> Vec<f64> {
        match self {
            Self::Unchanged => simulated_post,
            Self::Snapped(point) => point,
        }
    }
}

/// Keep `simulated_post` if it lies in `region`, otherwise snap it to the
/// region's center.
///
/// ```rust
/// use symloop::core::HyperRect;
/// use symloop::model::{check_and_repair, Repair};
///
/// let region = HyperRect::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
/// assert_eq!(check_and_repair(&[0.5, 0.5], &region), Repair::Unchanged);
/// assert_eq!(
///     check_and_repair(&[1.2, 0.5], &region),
///     Repair::Snapped(vec![0.5, 0.5])
/// );
/// ```
pub fn check_and_repair(simulated_post: &[f64], region: &HyperRect) -> Repair {
    if region.contains(simulated_post) {
        Repair::Unchanged
    } else {
        Repair::Snapped(region.center())
    }
}

/// One detected disagreement between simulation and abstraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyViolation {
    pub x_symbol: Symbol,
    pub u_symbol: Symbol,
    /// Post-state produced by the simulation
    pub simulated: Vec<f64>,
    /// Post-state the run continued from
    pub repaired: Vec<f64>,
    pub region: HyperRect,
    pub detected_at: DateTime<Utc>,
}

/// Running tally of consistency checks for one run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConsistencyReport {
    checks: u64,
    violations: Vec<ConsistencyViolation>,
}

impl ConsistencyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checks performed.
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Number of violations detected (and repaired).
    pub fn count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[ConsistencyViolation] {
        &self.violations
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Symbolic model plus the membership policy and the violation report.
#[derive(Clone, Debug)]
pub struct ConsistencyChecker {
    model: SymbolicModel,
    membership: RegionMembership,
    report: ConsistencyReport,
}

impl ConsistencyChecker {
    pub fn new(model: SymbolicModel, membership: RegionMembership) -> Self {
        Self {
            model,
            membership,
            report: ConsistencyReport::new(),
        }
    }

    pub fn model(&self) -> &SymbolicModel {
        &self.model
    }

    pub fn membership(&self) -> RegionMembership {
        self.membership
    }

    pub fn report(&self) -> &ConsistencyReport {
        &self.report
    }

    /// The region the post-state is proven to reach.
    pub fn get_region(&self, x_symbol: Symbol, u_symbol: Symbol) -> Result<&HyperRect, ModelError> {
        self.model.get_region(x_symbol, u_symbol)
    }

    /// Check the post-state of `(x_symbol, u_symbol)` and return the state
    /// to continue from. Violations are logged and recorded, never fatal.
    pub fn check_and_repair(
        &mut self,
        x_symbol: Symbol,
        u_symbol: Symbol,
        simulated_post: Vec<f64>,
    ) -> Result<Vec<f64>, ModelError> {
        let boxes = self.model.get_regions(x_symbol, u_symbol)?;
        let region = boxes
            .first()
            .ok_or(ModelError::MissingEntry { x_symbol, u_symbol })?;

        let repair = match self.membership {
            RegionMembership::FirstBox => check_and_repair(&simulated_post, region),
            RegionMembership::Union if boxes.iter().any(|b| b.contains(&simulated_post)) => {
                Repair::Unchanged
            }
            RegionMembership::Union => Repair::Snapped(region.center()),
        };
        self.report.checks += 1;

        let Repair::Snapped(repaired) = repair else {
            return Ok(simulated_post);
        };

        warn!(
            "consistency violation for (x_{}, u_{}): simulated post {:?} is outside {}; continuing from {:?}",
            x_symbol, u_symbol, simulated_post, region, repaired
        );
        self.report.violations.push(ConsistencyViolation {
            x_symbol,
            u_symbol,
            simulated: simulated_post,
            repaired: repaired.clone(),
            region: region.clone(),
            detected_at: Utc::now(),
        });
        Ok(repaired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> HyperRect {
        HyperRect::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap()
    }

    fn checker(membership: RegionMembership) -> ConsistencyChecker {
        let model = SymbolicModel::parse("[x_0, u_0] => [0,1]x[0,1] U [2,3]x[2,3]\n", 1, 1).unwrap();
        ConsistencyChecker::new(model, membership)
    }

    #[test]
    fn point_inside_is_unchanged() {
        let repair = check_and_repair(&[0.5, 0.5], &unit_square());
        assert!(!repair.is_violation());
        assert_eq!(repair.apply(vec![0.5, 0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn point_outside_snaps_to_center() {
        let repair = check_and_repair(&[1.2, 0.5], &unit_square());
        assert!(repair.is_violation());
        assert_eq!(repair.apply(vec![1.2, 0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn boundary_counts_as_inside() {
        assert_eq!(check_and_repair(&[1.0, 0.0], &unit_square()), Repair::Unchanged);
    }

    #[test]
    fn checker_records_violations() {
        let mut checker = checker(RegionMembership::FirstBox);
        let kept = checker.check_and_repair(0, 0, vec![0.25, 0.75]).unwrap();
        assert_eq!(kept, vec![0.25, 0.75]);
        assert!(checker.report().is_clean());

        let repaired = checker.check_and_repair(0, 0, vec![1.2, 0.5]).unwrap();
        assert_eq!(repaired, vec![0.5, 0.5]);
        assert_eq!(checker.report().checks(), 2);
        assert_eq!(checker.report().count(), 1);

        let violation = &checker.report().violations()[0];
        assert_eq!(violation.simulated, vec![1.2, 0.5]);
        assert_eq!(violation.repaired, vec![0.5, 0.5]);
        assert_eq!(violation.region, unit_square());
    }

    #[test]
    fn first_box_ignores_later_boxes() {
        let mut checker = checker(RegionMembership::FirstBox);
        let post = checker.check_and_repair(0, 0, vec![2.5, 2.5]).unwrap();
        assert_eq!(post, vec![0.5, 0.5]);
        assert_eq!(checker.report().count(), 1);
    }

    #[test]
    fn union_accepts_any_box() {
        let mut checker = checker(RegionMembership::Union);
        let post = checker.check_and_repair(0, 0, vec![2.5, 2.5]).unwrap();
        assert_eq!(post, vec![2.5, 2.5]);
        assert!(checker.report().is_clean());

        let post = checker.check_and_repair(0, 0, vec![1.5, 1.5]).unwrap();
        assert_eq!(post, vec![0.5, 0.5]);
    }

    #[test]
    fn report_serializes() {
        let mut checker = checker(RegionMembership::FirstBox);
        checker.check_and_repair(0, 0, vec![9.0, 9.0]).unwrap();
        let json = serde_json::to_string(checker.report()).unwrap();
        let back: ConsistencyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.count(), 1);
        assert_eq!(back.violations()[0].x_symbol, 0);
    }
}
