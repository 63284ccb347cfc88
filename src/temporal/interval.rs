use crate::basic_types::PlanningResult;
use crate::temporal::point_algebra::TimePointComparator;
use crate::temporal::point_algebra::TimePointId;

/// A time interval `[from, to]` referencing two timepoints of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub from: TimePointId,
    pub to: TimePointId,
}

impl Interval {
    pub fn new(from: TimePointId, to: TimePointId) -> Interval {
        Interval { from, to }
    }

    /// Whether this interval and `other` overlap under the given
    /// comparator.
    pub fn overlaps(
        &self,
        other: &Interval,
        comparator: &TimePointComparator<'_>,
    ) -> PlanningResult<bool> {
        comparator.has_interval_overlap(self.from, self.to, other.from, other.to)
    }
}
