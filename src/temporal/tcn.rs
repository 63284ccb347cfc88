use std::collections::HashMap;

use log::debug;

use crate::basic_types::KeyedVec;
use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::temporal::point_algebra::QualitativeConstraint;
use crate::temporal::point_algebra::TimePoint;
use crate::temporal::point_algebra::TimePointId;
use crate::temporal::point_algebra::TimePointVariant;
use crate::temporal::Bounds;
use crate::temporal::IntervalConstraint;

/// A temporal constraint network over qualitative or quantitative
/// timepoints.
///
/// Edges between timepoints carry either a [`QualitativeConstraint`] (one
/// of the eight point-algebra relations) or an [`IntervalConstraint`]
/// (a union of closed intervals of admissible distances). Between any
/// ordered pair of timepoints at most one consolidated constraint is kept;
/// adding a constraint intersects it with what is already known.
///
/// Inconsistencies are never raised at add time. An empty intersection is
/// recorded and surfaces on the next [`is_consistent`](Self::is_consistent)
/// or [`upper_lower_tightening`](Self::upper_lower_tightening) call.
#[derive(Debug, Clone, Default)]
pub struct TemporalConstraintNetwork {
    timepoints: KeyedVec<TimePointId, TimePoint>,
    variant: Option<TimePointVariant>,
    qualitative: HashMap<(TimePointId, TimePointId), QualitativeConstraint>,
    quantitative: HashMap<(TimePointId, TimePointId), IntervalConstraint>,
    contradiction: Option<String>,
}

impl TemporalConstraintNetwork {
    pub fn new() -> TemporalConstraintNetwork {
        TemporalConstraintNetwork::default()
    }

    /// Inserts a timepoint, or returns the id of an already known timepoint
    /// that denotes the same point (alias-aware for qualitative points).
    ///
    /// Mixing qualitative and quantitative timepoints within one network is
    /// rejected.
    pub fn add_timepoint(&mut self, timepoint: TimePoint) -> PlanningResult<TimePointId> {
        match self.variant {
            None => self.variant = Some(timepoint.variant()),
            Some(variant) if variant != timepoint.variant() => {
                return Err(PlanningError::InvalidInput(format!(
                    "timepoint '{}' mixes qualitative and quantitative points in one network",
                    timepoint.label()
                )));
            }
            Some(_) => {}
        }

        for id in self.timepoints.keys() {
            if self.timepoints[id].same_point(&timepoint) {
                return Ok(id);
            }
        }
        Ok(self.timepoints.push(timepoint))
    }

    pub fn timepoint(&self, id: TimePointId) -> &TimePoint {
        &self.timepoints[id]
    }

    /// Resolves a label (or alias) to a timepoint id.
    pub fn timepoint_by_label(&self, label: &str) -> Option<TimePointId> {
        self.timepoints
            .keys()
            .find(|id| self.timepoints[*id].is_alias(label))
    }

    pub fn timepoint_ids(&self) -> impl Iterator<Item = TimePointId> {
        self.timepoints.keys()
    }

    pub fn len(&self) -> usize {
        self.timepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timepoints.is_empty()
    }

    pub fn variant(&self) -> Option<TimePointVariant> {
        self.variant
    }

    /// Number of directed edges carrying a constraint.
    pub fn edge_count(&self) -> usize {
        self.qualitative.len() + self.quantitative.len()
    }

    /// Intersects the relation between `src` and `tgt` with `constraint`,
    /// and the reverse edge with its converse. An empty intersection makes
    /// the network inconsistent immediately, but is only reported on the
    /// next consistency query.
    pub fn add_qualitative_constraint(
        &mut self,
        src: TimePointId,
        tgt: TimePointId,
        constraint: QualitativeConstraint,
    ) {
        let forward = self.qualitative_constraint(src, tgt).intersect(constraint);
        let _ = self.qualitative.insert((src, tgt), forward);
        let _ = self.qualitative.insert((tgt, src), forward.symmetric());

        if forward.is_empty() && self.contradiction.is_none() {
            self.contradiction = Some(format!(
                "relation between '{}' and '{}' is empty",
                self.timepoints[src].label(),
                self.timepoints[tgt].label()
            ));
        }
    }

    /// The consolidated relation between two timepoints; universal when
    /// nothing is known.
    pub fn qualitative_constraint(
        &self,
        src: TimePointId,
        tgt: TimePointId,
    ) -> QualitativeConstraint {
        if src == tgt {
            return QualitativeConstraint::EQUAL;
        }
        self.qualitative
            .get(&(src, tgt))
            .copied()
            .unwrap_or(QualitativeConstraint::UNIVERSAL)
    }

    /// Merges an interval constraint into the edge `src -> tgt`.
    pub fn add_interval_constraint(
        &mut self,
        src: TimePointId,
        tgt: TimePointId,
        intervals: IntervalConstraint,
    ) {
        let entry = self
            .quantitative
            .entry((src, tgt))
            .or_insert_with(|| IntervalConstraint::singleton(f64::NEG_INFINITY, f64::INFINITY));
        entry.merge(&intervals);
        if entry.is_empty() && self.contradiction.is_none() {
            self.contradiction = Some(format!(
                "interval constraint between '{}' and '{}' is empty",
                self.timepoints[src].label(),
                self.timepoints[tgt].label()
            ));
        }
    }

    pub fn interval_constraint(
        &self,
        src: TimePointId,
        tgt: TimePointId,
    ) -> Option<&IntervalConstraint> {
        self.quantitative.get(&(src, tgt))
    }

    /// Decides consistency. Qualitative networks run path consistency to
    /// fixpoint (consolidating every edge in place); quantitative networks
    /// run upper-lower tightening. Never fails; the answer is the boolean.
    pub fn is_consistent(&mut self) -> bool {
        if self.contradiction.is_some() {
            return false;
        }
        match self.variant {
            None => true,
            Some(TimePointVariant::Qualitative) => self.propagate_path_consistency().is_ok(),
            Some(TimePointVariant::Quantitative) => self.upper_lower_tightening().is_ok(),
        }
    }

    /// Path-consistency propagation: for every triple `(i, k, j)` the
    /// relation `R(i,j)` is intersected with `R(i,k) ∘ R(k,j)` until no
    /// edge changes. An edge collapsing to the empty relation is an
    /// inconsistency.
    fn propagate_path_consistency(&mut self) -> Result<(), ()> {
        let ids: Vec<TimePointId> = self.timepoints.keys().collect();
        let mut changed = true;
        while changed {
            changed = false;
            for &k in &ids {
                for &i in &ids {
                    if i == k {
                        continue;
                    }
                    for &j in &ids {
                        if j == i || j == k {
                            continue;
                        }
                        let through = self
                            .qualitative_constraint(i, k)
                            .compose(self.qualitative_constraint(k, j));
                        let direct = self.qualitative_constraint(i, j);
                        let tightened = direct.intersect(through);
                        if tightened != direct {
                            if tightened.is_empty() {
                                self.contradiction = Some(format!(
                                    "path consistency emptied the relation between '{}' and '{}'",
                                    self.timepoints[i].label(),
                                    self.timepoints[j].label()
                                ));
                                return Err(());
                            }
                            let _ = self.qualitative.insert((i, j), tightened);
                            let _ = self.qualitative.insert((j, i), tightened.symmetric());
                            changed = true;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Reduces the network to a simple temporal problem: every interval
    /// union is replaced by its convex hull and encoded in a distance
    /// matrix, `d[i][j]` = max admissible `t_j - t_i`.
    pub fn stp(&self) -> Vec<Vec<f64>> {
        let n = self.timepoints.len();
        let mut distance = vec![vec![f64::INFINITY; n]; n];
        for (i, row) in distance.iter_mut().enumerate() {
            row[i] = 0.0;
        }
        for (&(src, tgt), constraint) in &self.quantitative {
            let hull = constraint.hull();
            let (i, j) = (src.0 as usize, tgt.0 as usize);
            distance[i][j] = distance[i][j].min(hull.upper);
            distance[j][i] = distance[j][i].min(-hull.lower);
        }
        distance
    }

    /// Computes the minimal network of the STP relaxation with
    /// Floyd–Warshall. A negative diagonal entry is a negative cycle and
    /// makes the network inconsistent.
    pub fn min_network(&self, distance: &mut [Vec<f64>]) -> PlanningResult<()> {
        let n = distance.len();
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let through = distance[i][k] + distance[k][j];
                    if through < distance[i][j] {
                        distance[i][j] = through;
                    }
                }
            }
        }
        for (i, row) in distance.iter().enumerate() {
            if row[i] < 0.0 {
                return Err(PlanningError::InconsistentNetwork(format!(
                    "negative cycle through '{}'",
                    self.timepoints[TimePointId(i as u32)].label()
                )));
            }
        }
        Ok(())
    }

    /// The upper-lower tightening algorithm: iterate
    /// `stp -> min_network -> intersect` until a fixpoint is reached or the
    /// network turns out inconsistent. Idempotent.
    pub fn upper_lower_tightening(&mut self) -> PlanningResult<()> {
        if let Some(reason) = &self.contradiction {
            return Err(PlanningError::InconsistentNetwork(reason.clone()));
        }
        loop {
            let mut distance = self.stp();
            match self.min_network(&mut distance) {
                Ok(()) => {}
                Err(e) => {
                    self.contradiction = Some(e.to_string());
                    return Err(e);
                }
            }

            let mut changed = false;
            let mut emptied = None;
            for (&(src, tgt), constraint) in self.quantitative.iter_mut() {
                let (i, j) = (src.0 as usize, tgt.0 as usize);
                let tightened = Bounds::new(-distance[j][i], distance[i][j]);
                if constraint.tighten(tightened) {
                    changed = true;
                }
                if constraint.is_empty() {
                    emptied = Some((src, tgt));
                }
            }
            if let Some((src, tgt)) = emptied {
                let reason = format!(
                    "tightening emptied the interval between '{}' and '{}'",
                    self.timepoints[src].label(),
                    self.timepoints[tgt].label()
                );
                self.contradiction = Some(reason.clone());
                return Err(PlanningError::InconsistentNetwork(reason));
            }
            if !changed {
                debug!("upper-lower tightening reached its fixpoint");
                return Ok(());
            }
        }
    }

    /// Orders timepoints topologically by the `<=`-closure of the
    /// consolidated relations.
    ///
    /// Runs Kahn's algorithm over the edges whose relation is contained
    /// in `<=` (a pure `=` does not order a pair); timepoints that stay
    /// unordered keep their insertion order. Expects a consistent
    /// network: after path consistency a `<=`-cycle over distinct points
    /// has collapsed to `=` and yields no edges.
    pub fn sort(&self, timepoints: &mut Vec<TimePointId>) {
        let before = |a: TimePointId, b: TimePointId| {
            let relation = self.qualitative_constraint(a, b);
            !relation.is_empty()
                && relation.intersect(QualitativeConstraint::LESS_OR_EQUAL) == relation
                && relation != QualitativeConstraint::EQUAL
        };

        let mut remaining = timepoints.clone();
        let mut ordered = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            // The first element with no predecessor among the rest.
            let position = remaining
                .iter()
                .position(|&candidate| {
                    !remaining
                        .iter()
                        .any(|&other| other != candidate && before(other, candidate))
                })
                .unwrap_or(0);
            ordered.push(remaining.remove(position));
        }
        *timepoints = ordered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualitative_pair(
        tcn: &mut TemporalConstraintNetwork,
        a: &str,
        b: &str,
    ) -> (TimePointId, TimePointId) {
        let a = tcn.add_timepoint(TimePoint::qualitative(a)).unwrap();
        let b = tcn.add_timepoint(TimePoint::qualitative(b)).unwrap();
        (a, b)
    }

    #[test]
    fn chained_greater_or_equal_is_consistent() {
        let mut tcn = TemporalConstraintNetwork::new();
        let (t0, t1) = qualitative_pair(&mut tcn, "t0", "t1");
        let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::GREATER_OR_EQUAL);
        tcn.add_qualitative_constraint(t1, t2, QualitativeConstraint::GREATER_OR_EQUAL);
        assert!(tcn.is_consistent());
    }

    #[test]
    fn closing_the_chain_the_wrong_way_is_inconsistent() {
        let mut tcn = TemporalConstraintNetwork::new();
        let (t0, t1) = qualitative_pair(&mut tcn, "t0", "t1");
        let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::GREATER_OR_EQUAL);
        tcn.add_qualitative_constraint(t1, t2, QualitativeConstraint::GREATER_OR_EQUAL);
        tcn.add_qualitative_constraint(t0, t2, QualitativeConstraint::LESS);
        assert!(!tcn.is_consistent());
    }

    #[test]
    fn mutually_inverse_constraints_are_fine() {
        let mut tcn = TemporalConstraintNetwork::new();
        let (t0, t1) = qualitative_pair(&mut tcn, "t0", "t1");

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::LESS);
        tcn.add_qualitative_constraint(t1, t0, QualitativeConstraint::GREATER);
        assert!(tcn.is_consistent());
    }

    #[test]
    fn contradicting_constraints_on_one_edge_are_not() {
        let mut tcn = TemporalConstraintNetwork::new();
        let (t0, t1) = qualitative_pair(&mut tcn, "t0", "t1");

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::GREATER_OR_EQUAL);
        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::LESS);
        assert!(!tcn.is_consistent());
    }

    #[test]
    fn greater_in_both_directions_is_not() {
        let mut tcn = TemporalConstraintNetwork::new();
        let (t0, t1) = qualitative_pair(&mut tcn, "t0", "t1");

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::GREATER);
        tcn.add_qualitative_constraint(t1, t0, QualitativeConstraint::GREATER);
        assert!(!tcn.is_consistent());
    }

    #[test]
    fn consistency_consolidates_transitive_relations() {
        let mut tcn = TemporalConstraintNetwork::new();
        let (t0, t1) = qualitative_pair(&mut tcn, "t0", "t1");
        let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::LESS);
        tcn.add_qualitative_constraint(t1, t2, QualitativeConstraint::LESS);
        assert!(tcn.is_consistent());
        assert_eq!(
            tcn.qualitative_constraint(t0, t2),
            QualitativeConstraint::LESS
        );
    }

    #[test]
    fn adding_a_known_timepoint_is_idempotent() {
        let mut tcn = TemporalConstraintNetwork::new();
        let a = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        let b = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        assert_eq!(a, b);
        assert_eq!(tcn.len(), 1);
    }

    #[test]
    fn mixing_variants_is_rejected() {
        let mut tcn = TemporalConstraintNetwork::new();
        let _ = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        assert!(tcn
            .add_timepoint(TimePoint::quantitative("t1", 0.0, 1.0))
            .is_err());
    }

    #[test]
    fn tightening_detects_an_unreachable_long_edge() {
        let mut tcn = TemporalConstraintNetwork::new();
        let a = tcn
            .add_timepoint(TimePoint::quantitative("a", 0.0, f64::INFINITY))
            .unwrap();
        let b = tcn
            .add_timepoint(TimePoint::quantitative("b", 0.0, f64::INFINITY))
            .unwrap();
        let c = tcn
            .add_timepoint(TimePoint::quantitative("c", 0.0, f64::INFINITY))
            .unwrap();

        tcn.add_interval_constraint(a, b, IntervalConstraint::singleton(1.0, 3.0));
        tcn.add_interval_constraint(b, c, IntervalConstraint::singleton(1.0, 3.0));
        tcn.add_interval_constraint(a, c, IntervalConstraint::singleton(10.0, 20.0));

        // a -> c can be at most 6 via b, but is required to be at least 10.
        assert!(matches!(
            tcn.upper_lower_tightening(),
            Err(PlanningError::InconsistentNetwork(_))
        ));
        assert!(!tcn.is_consistent());
    }

    #[test]
    fn tightening_is_idempotent() {
        let mut tcn = TemporalConstraintNetwork::new();
        let a = tcn
            .add_timepoint(TimePoint::quantitative("a", 0.0, f64::INFINITY))
            .unwrap();
        let b = tcn
            .add_timepoint(TimePoint::quantitative("b", 0.0, f64::INFINITY))
            .unwrap();
        let c = tcn
            .add_timepoint(TimePoint::quantitative("c", 0.0, f64::INFINITY))
            .unwrap();

        tcn.add_interval_constraint(a, b, IntervalConstraint::singleton(1.0, 3.0));
        tcn.add_interval_constraint(b, c, IntervalConstraint::singleton(1.0, 3.0));
        tcn.add_interval_constraint(a, c, IntervalConstraint::singleton(0.0, 20.0));

        assert!(tcn.upper_lower_tightening().is_ok());
        let snapshot = tcn.clone();
        assert!(tcn.upper_lower_tightening().is_ok());
        assert_eq!(
            format!("{:?}", snapshot.quantitative),
            format!("{:?}", tcn.quantitative)
        );
    }

    #[test]
    fn sort_orders_a_less_or_equal_chain() {
        let mut tcn = TemporalConstraintNetwork::new();
        let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();
        let t0 = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        let t1 = tcn.add_timepoint(TimePoint::qualitative("t1")).unwrap();

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::LESS_OR_EQUAL);
        tcn.add_qualitative_constraint(t2, t1, QualitativeConstraint::GREATER_OR_EQUAL);
        assert!(tcn.is_consistent());

        let mut order = vec![t2, t0, t1];
        tcn.sort(&mut order);
        // t1 follows t0 and precedes t2; the <=-closure alone decides.
        assert_eq!(order, vec![t0, t1, t2]);
    }

    #[test]
    fn sort_orders_a_strict_chain() {
        let mut tcn = TemporalConstraintNetwork::new();
        let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();
        let t0 = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
        let t1 = tcn.add_timepoint(TimePoint::qualitative("t1")).unwrap();

        tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::LESS);
        tcn.add_qualitative_constraint(t1, t2, QualitativeConstraint::LESS);
        assert!(tcn.is_consistent());

        let mut order = vec![t2, t0, t1];
        tcn.sort(&mut order);
        assert_eq!(order, vec![t0, t1, t2]);
    }
}
