//! End-to-end checks of the temporal constraint network through the
//! public API.

use caravan_solver::temporal::point_algebra::QualitativeConstraint;
use caravan_solver::temporal::point_algebra::TimePoint;
use caravan_solver::temporal::IntervalConstraint;
use caravan_solver::temporal::TemporalConstraintNetwork;
use caravan_solver::PlanningError;

#[test]
fn three_point_ordering_consistency() {
    let mut tcn = TemporalConstraintNetwork::new();
    let t0 = tcn.add_timepoint(TimePoint::qualitative("t0")).unwrap();
    let t1 = tcn.add_timepoint(TimePoint::qualitative("t1")).unwrap();
    let t2 = tcn.add_timepoint(TimePoint::qualitative("t2")).unwrap();

    tcn.add_qualitative_constraint(t0, t1, QualitativeConstraint::GREATER_OR_EQUAL);
    tcn.add_qualitative_constraint(t1, t2, QualitativeConstraint::GREATER_OR_EQUAL);
    assert!(tcn.is_consistent());

    tcn.add_qualitative_constraint(t0, t2, QualitativeConstraint::LESS);
    assert!(!tcn.is_consistent());
}

#[test]
fn path_tightening_detects_the_unreachable_edge() {
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

    // a -> c is at most 6 through b, yet at least 10 directly.
    assert!(matches!(
        tcn.upper_lower_tightening(),
        Err(PlanningError::InconsistentNetwork(_))
    ));
}

#[test]
fn tightening_clips_a_reachable_edge_to_the_path_bound() {
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
    let constraint = tcn.interval_constraint(a, c).unwrap();
    assert_eq!(constraint.lower_bound(), 2.0);
    assert_eq!(constraint.upper_bound(), 6.0);
}
