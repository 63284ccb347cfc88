use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::temporal::point_algebra::QualitativeConstraint;
use crate::temporal::point_algebra::TimePointId;
use crate::temporal::point_algebra::TimePointVariant;
use crate::temporal::TemporalConstraintNetwork;

/// Compares timepoints through the consolidated constraints of a
/// consistent [`TemporalConstraintNetwork`].
///
/// All answers are *definite*: `less_than` only returns true when every
/// assignment admitted by the network puts the first point strictly before
/// the second.
pub struct TimePointComparator<'a> {
    tcn: &'a TemporalConstraintNetwork,
}

impl<'a> TimePointComparator<'a> {
    /// The network must have been propagated and found consistent;
    /// a comparator over an inconsistent network answers nothing useful.
    pub fn new(tcn: &'a TemporalConstraintNetwork) -> PlanningResult<TimePointComparator<'a>> {
        let mut probe = tcn.clone();
        if !probe.is_consistent() {
            return Err(PlanningError::InconsistentNetwork(
                "cannot construct a comparator over an inconsistent network".to_string(),
            ));
        }
        Ok(TimePointComparator { tcn })
    }

    pub fn equals(&self, t0: TimePointId, t1: TimePointId) -> bool {
        t0 == t1 || self.tcn.timepoint(t0).same_point(self.tcn.timepoint(t1))
    }

    pub fn greater_than(&self, t0: TimePointId, t1: TimePointId) -> PlanningResult<bool> {
        self.holds(t0, t1, QualitativeConstraint::GREATER)
    }

    pub fn less_than(&self, t0: TimePointId, t1: TimePointId) -> PlanningResult<bool> {
        self.holds(t0, t1, QualitativeConstraint::LESS)
    }

    pub fn greater_or_equal(&self, t0: TimePointId, t1: TimePointId) -> PlanningResult<bool> {
        if self.equals(t0, t1) {
            return Ok(true);
        }
        self.holds(t0, t1, QualitativeConstraint::GREATER_OR_EQUAL)
    }

    pub fn less_or_equal(&self, t0: TimePointId, t1: TimePointId) -> PlanningResult<bool> {
        if self.equals(t0, t1) {
            return Ok(true);
        }
        self.holds(t0, t1, QualitativeConstraint::LESS_OR_EQUAL)
    }

    /// Whether `t0` lies within the interval `[start, end]`.
    pub fn in_interval(
        &self,
        t0: TimePointId,
        start: TimePointId,
        end: TimePointId,
    ) -> PlanningResult<bool> {
        Ok(self.greater_or_equal(t0, start)? && self.less_or_equal(t0, end)?)
    }

    /// Whether the intervals `[a_start, a_end]` and `[b_start, b_end]`
    /// overlap: one of the four endpoints lies within the other interval.
    pub fn has_interval_overlap(
        &self,
        a_start: TimePointId,
        a_end: TimePointId,
        b_start: TimePointId,
        b_end: TimePointId,
    ) -> PlanningResult<bool> {
        Ok(self.in_interval(a_start, b_start, b_end)?
            || self.in_interval(a_end, b_start, b_end)?
            || self.in_interval(b_start, a_start, a_end)?
            || self.in_interval(b_end, a_start, a_end)?)
    }

    /// Checks whether the definite relation `t0 wanted t1` holds.
    ///
    /// For qualitative networks the consolidated relation must be a
    /// (nonempty) subset of `wanted`; for quantitative networks the answer
    /// is derived from the tightened interval hull of the edge, falling
    /// back to the static bounds of the two points.
    fn holds(
        &self,
        t0: TimePointId,
        t1: TimePointId,
        wanted: QualitativeConstraint,
    ) -> PlanningResult<bool> {
        let left = self.tcn.timepoint(t0);
        let right = self.tcn.timepoint(t1);
        if left.variant() != right.variant() {
            return Err(PlanningError::InvalidInput(format!(
                "cannot compare timepoints of different kinds: '{}' and '{}'",
                left.label(),
                right.label()
            )));
        }

        match left.variant() {
            TimePointVariant::Qualitative => {
                let relation = self.tcn.qualitative_constraint(t0, t1);
                if relation.is_empty() {
                    return Err(PlanningError::InconsistentNetwork(format!(
                        "no admissible relation between '{}' and '{}'",
                        left.label(),
                        right.label()
                    )));
                }
                Ok(relation.intersect(wanted) == relation)
            }
            TimePointVariant::Quantitative => {
                // The edge constrains t1 - t0.
                let (lower, upper) = match self.tcn.interval_constraint(t0, t1) {
                    Some(constraint) => {
                        let hull = constraint.hull();
                        (hull.lower, hull.upper)
                    }
                    None => {
                        let (l0, u0) = left.bounds().expect("quantitative timepoint");
                        let (l1, u1) = right.bounds().expect("quantitative timepoint");
                        (l1 - u0, u1 - l0)
                    }
                };
                let definite = if wanted == QualitativeConstraint::GREATER {
                    upper < 0.0
                } else if wanted == QualitativeConstraint::GREATER_OR_EQUAL {
                    upper <= 0.0
                } else if wanted == QualitativeConstraint::LESS {
                    lower > 0.0
                } else if wanted == QualitativeConstraint::LESS_OR_EQUAL {
                    lower >= 0.0
                } else {
                    lower == 0.0 && upper == 0.0
                };
                Ok(definite)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::point_algebra::TimePoint;

    #[test]
    fn strict_chain_is_fully_ordered() {
        let mut tcn = TemporalConstraintNetwork::new();
        let t0 = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        let t1 = tcn.add_timepoint(TimePoint::qualitative("t1")).unwrap();
        let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();
        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::LESS);
        tcn.add_qualitative_constraint(t1, t2, QualitativeConstraint::LESS);
        assert!(tcn.is_consistent());

        let comparator = TimePointComparator::new(&tcn).unwrap();
        assert!(comparator.less_than(t0, t2).unwrap());
        assert!(comparator.greater_than(t2, t0).unwrap());
        assert!(!comparator.less_than(t2, t0).unwrap());
        assert!(comparator.in_interval(t1, t0, t2).unwrap());
    }

    #[test]
    fn overlap_of_nested_intervals() {
        let mut tcn = TemporalConstraintNetwork::new();
        let t0 = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        let t1 = tcn.add_timepoint(TimePoint::qualitative("t1")).unwrap();
        let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();
        let t3 = tcn.add_timepoint(TimePoint::qualitative("t3")).unwrap();
        for (a, b) in [(t0, t1), (t1, t2), (t2, t3)] {
            tcn.add_qualitative_constraint(a, b, QualitativeConstraint::LESS);
        }
        assert!(tcn.is_consistent());

        let comparator = TimePointComparator::new(&tcn).unwrap();
        // [t0, t3] contains [t1, t2].
        assert!(comparator.has_interval_overlap(t0, t3, t1, t2).unwrap());
        // [t0, t1] and [t2, t3] are disjoint.
        assert!(!comparator.has_interval_overlap(t0, t1, t2, t3).unwrap());
        // [t0, t1] and [t1, t2] share an endpoint.
        assert!(comparator.has_interval_overlap(t0, t1, t1, t2).unwrap());
    }

    #[test]
    fn unrelated_points_are_not_ordered() {
        let mut tcn = TemporalConstraintNetwork::new();
        let t0 = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        let t1 = tcn.add_timepoint(TimePoint::qualitative("t1")).unwrap();
        assert!(tcn.is_consistent());

        let comparator = TimePointComparator::new(&tcn).unwrap();
        assert!(!comparator.less_than(t0, t1).unwrap());
        assert!(!comparator.greater_than(t0, t1).unwrap());
        assert!(!comparator.less_or_equal(t0, t1).unwrap());
    }

    #[test]
    fn quantitative_points_order_by_bounds() {
        let mut tcn = TemporalConstraintNetwork::new();
        let a = tcn
            .add_timepoint(TimePoint::quantitative("a", 0.0, 1.0))
            .unwrap();
        let b = tcn
            .add_timepoint(TimePoint::quantitative("b", 2.0, 3.0))
            .unwrap();

        let comparator = TimePointComparator::new(&tcn).unwrap();
        assert!(comparator.less_than(a, b).unwrap());
        assert!(!comparator.greater_than(a, b).unwrap());
    }
}
