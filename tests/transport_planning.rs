//! End-to-end planning scenarios: CSP, transshipment and analysis
//! through the planner facade.

use caravan_solver::io::MissionReader;
use caravan_solver::mission::CapabilityRegistry;
use caravan_solver::mission::Mission;
use caravan_solver::mission::ModelCapability;
use caravan_solver::mission::ModelIri;
use caravan_solver::mission::Role;
use caravan_solver::solvers::analysis::SolutionAnalysis;
use caravan_solver::solvers::PlanningOutcome;
use caravan_solver::solvers::Solution;
use caravan_solver::solvers::TransportNetworkPlanner;
use caravan_solver::symbols::Location;
use caravan_solver::temporal::point_algebra::QualitativeConstraint;
use caravan_solver::temporal::point_algebra::TimePointId;

fn registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
        .with(ModelCapability::new("Vehicle").mobile(1))
        .with(ModelCapability::new("Commodity"))
}

fn chain_timepoints(mission: &mut Mission, count: usize) -> Vec<TimePointId> {
    let timepoints: Vec<TimePointId> = (0..count)
        .map(|i| mission.get_or_create_timepoint(&format!("t{i}")).unwrap())
        .collect();
    for pair in timepoints.windows(2) {
        mission.add_temporal_constraint(pair[0], pair[1], QualitativeConstraint::LESS);
    }
    timepoints
}

fn solve(mission: &Mission, registry: &CapabilityRegistry) -> Option<Solution> {
    match TransportNetworkPlanner::new(registry).solve(mission).unwrap() {
        PlanningOutcome::Solved(solution) => Some(solution),
        PlanningOutcome::NoSolution => None,
    }
}

#[test]
fn single_agent_single_location_mission() {
    let registry = registry();
    let mut mission = Mission::new("single-agent");
    mission.add_resource("Vehicle", 1);
    let l0 = mission.add_location(Location::new("l0"));
    let t = chain_timepoints(&mut mission, 4);
    mission.add_resource_requirement(l0, t[0], t[3], "Vehicle", 1, Some(1));
    mission.prepare(&registry).unwrap();

    let solution = solve(&mission, &registry).expect("mission is satisfiable");

    assert_eq!(
        solution.model_distribution()[0].get(&ModelIri::new("Vehicle")),
        1
    );
    let timeline = &solution.timelines()[0];
    assert_eq!(timeline.waypoints().len(), 4);
    assert!(timeline.waypoints().iter().all(|&(l, _)| l == l0));
    assert!(solution.is_fulfilled());

    // Analysis: the requirement is fully covered, with no shortfall and
    // no surplus.
    let analysis = SolutionAnalysis::new(&mission, &registry, &solution);
    let missing = analysis.missing_resources(0).unwrap();
    assert_eq!(missing.get(&ModelIri::new("Vehicle")), 0);
    let delta = analysis.resource_delta(0).unwrap();
    assert_eq!(delta[&ModelIri::new("Vehicle")], 0);
    assert_eq!(analysis.degree_of_fulfillment(0).unwrap(), 1.0);
    assert_eq!(analysis.required_roles(1).len(), 1);
}

#[test]
fn concurrent_requirements_exceeding_the_pool_have_no_solution() {
    let registry = registry();
    let mut mission = Mission::new("concurrent-conflict");
    mission.add_resource("Vehicle", 1);
    let l0 = mission.add_location(Location::new("l0"));
    let l1 = mission.add_location(Location::new("l1"));
    let t = chain_timepoints(&mut mission, 2);
    mission.add_resource_requirement(l0, t[0], t[1], "Vehicle", 1, None);
    mission.add_resource_requirement(l1, t[0], t[1], "Vehicle", 1, None);
    mission.prepare(&registry).unwrap();

    assert!(solve(&mission, &registry).is_none());
}

#[test]
fn a_commodity_is_ferried_by_an_idle_carrier() {
    let registry = registry();
    let mut mission = Mission::new("commodity-on-carrier");
    mission.add_resource("Vehicle", 1);
    mission.add_resource("Commodity", 1);
    let l0 = mission.add_location(Location::new("l0"));
    let l1 = mission.add_location(Location::new("l1"));
    let t = chain_timepoints(&mut mission, 7);
    mission.add_resource_requirement(l0, t[0], t[3], "Commodity", 1, Some(1));
    mission.add_resource_requirement(l1, t[4], t[6], "Commodity", 1, Some(1));
    mission.prepare(&registry).unwrap();

    let solution = solve(&mission, &registry).expect("a carrier is available");

    // The commodity moves from l0 to l1 between its two requirements.
    let commodity = Role::new(ModelIri::new("Commodity"), 0);
    let commodity_timeline = solution.timeline_of(&commodity).unwrap();
    assert_eq!(commodity_timeline.movements().len(), 1);
    let ((move_from, _), (move_to, _)) = commodity_timeline.movements()[0];
    assert_eq!(move_from, l0);
    assert_eq!(move_to, l1);

    // The vehicle was routed along the commodity's path and carries it.
    let vehicle = Role::new(ModelIri::new("Vehicle"), 0);
    let vehicle_timeline = solution
        .timeline_of(&vehicle)
        .expect("the idle vehicle was routed as a carrier");
    let visits_l0_before_move = vehicle_timeline
        .waypoints()
        .iter()
        .any(|&(l, tp)| l == l0 && t[..4].contains(&tp));
    let visits_l1_after_move = vehicle_timeline
        .waypoints()
        .iter()
        .any(|&(l, tp)| l == l1 && t[4..].contains(&tp));
    assert!(visits_l0_before_move);
    assert!(visits_l1_after_move);

    assert!(solution.is_fulfilled(), "flaws: {:?}", solution.flaws());
}

#[test]
fn an_uncarriable_commodity_yields_flaws() {
    // No vehicle in the pool at all: the commodity cannot move.
    let registry = registry();
    let mut mission = Mission::new("stranded-commodity");
    mission.add_resource("Commodity", 1);
    let l0 = mission.add_location(Location::new("l0"));
    let l1 = mission.add_location(Location::new("l1"));
    let t = chain_timepoints(&mut mission, 4);
    mission.add_resource_requirement(l0, t[0], t[1], "Commodity", 1, Some(1));
    mission.add_resource_requirement(l1, t[2], t[3], "Commodity", 1, Some(1));
    mission.prepare(&registry).unwrap();

    let solution = solve(&mission, &registry).expect("the CSP itself is satisfiable");
    assert!(!solution.is_fulfilled());
    assert_eq!(solution.flaws().len(), 1);
    assert_eq!(
        solution.flaws()[0].affected_role,
        Role::new(ModelIri::new("Commodity"), 0)
    );
}

#[test]
fn constraints_over_unused_timepoints_are_ignored() {
    const MISSION: &str = r#"<?xml version="1.0"?>
<mission>
    <name>ignored-constraint</name>
    <resources>
        <resource><model>Vehicle</model><maxCardinality>1</maxCardinality></resource>
    </resources>
    <constants>
        <location id="l0" x="0" y="0" z="0"/>
    </constants>
    <requirements>
        <requirement id="0">
            <spatial-requirement><location><id>l0</id></location></spatial-requirement>
            <temporal-requirement><from>t0</from><to>t1</to></temporal-requirement>
            <resource-requirement>
                <resource><model>Vehicle</model><minCardinality>1</minCardinality></resource>
            </resource-requirement>
        </requirement>
    </requirements>
    <constraints>
        <temporal-constraints>
            <lessThan lval="tX" rval="t1"/>
        </temporal-constraints>
    </constraints>
</mission>"#;

    let registry = registry();
    let mut mission = MissionReader::from_str(MISSION).unwrap();
    // The dangling constraint was dropped during parsing.
    assert!(mission.recorded_constraints().is_empty());

    mission.prepare(&registry).unwrap();
    let solution = solve(&mission, &registry).expect("the solve proceeds normally");
    assert!(solution.is_fulfilled());
}

#[test]
fn model_distribution_respects_the_cardinality_bounds() {
    let registry = registry();
    let mut mission = Mission::new("bounds");
    mission.add_resource("Vehicle", 1);
    let l0 = mission.add_location(Location::new("l0"));
    let t = chain_timepoints(&mut mission, 2);
    mission.add_resource_requirement(l0, t[0], t[1], "Vehicle", 1, Some(1));
    mission.prepare(&registry).unwrap();

    let solution = solve(&mission, &registry).unwrap();
    for (requirement, pool) in solution.model_distribution().iter().enumerate() {
        let ftr = &solution.requirements()[requirement];
        assert!(ftr.min_cardinalities().is_covered_by(pool));
        assert!(pool.is_covered_by(ftr.max_cardinalities()));

        // Role counts per model match the model distribution.
        let roles = &solution.role_distribution()[requirement];
        assert_eq!(&Role::to_pool(roles.iter()), pool);
    }
}
