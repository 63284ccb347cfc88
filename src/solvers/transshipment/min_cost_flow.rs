use std::collections::BTreeMap;
use std::collections::HashMap;

use log::debug;
use log::info;

use crate::basic_types::PlanningResult;
use crate::mission::OrganizationOracle;
use crate::mission::Role;
use crate::network::SpaceTimeNetwork;
use crate::network::ASSIGNED_TAG;
use crate::solvers::csp::RoleTimeline;
use crate::solvers::csp::SpaceTimeKey;
use crate::solvers::transshipment::ConstraintViolation;
use crate::solvers::transshipment::Flaw;
use crate::solvers::FluentTimeResource;
use crate::temporal::point_algebra::TimePointId;
use crate::temporal::Interval;

/// The outcome of a transshipment run.
#[derive(Debug)]
pub struct TransshipmentStatus {
    pub flaws: Vec<Flaw>,
    /// Number of commodities (immobile active roles) considered.
    pub commodities: u32,
}

/// The multi-commodity flow check over the space-time network.
///
/// Mobile-role timelines induce carrier capacity on the movement edges
/// they traverse; every immobile active role is one commodity whose
/// supply sits at the start of its timeline and whose demand at the end.
/// Local transitions carry unlimited capacity, so a commodity only
/// consumes capacity where it changes location. The commodity paths are
/// fixed by their CSP timelines, which reduces the min-cost-flow run to
/// routing each commodity along its committed movement edges against the
/// aggregated carrier capacities, in deterministic role order.
pub struct MinCostFlow<'a> {
    oracle: &'a dyn OrganizationOracle,
    timelines: &'a [RoleTimeline],
    /// Requirement indices served per role, for flaw attribution.
    role_requirements: &'a BTreeMap<Role, Vec<usize>>,
    requirements: &'a [FluentTimeResource],
    intervals: &'a [Interval],
    timepoint_order: &'a [TimePointId],
}

impl<'a> MinCostFlow<'a> {
    pub fn new(
        oracle: &'a dyn OrganizationOracle,
        timelines: &'a [RoleTimeline],
        role_requirements: &'a BTreeMap<Role, Vec<usize>>,
        requirements: &'a [FluentTimeResource],
        intervals: &'a [Interval],
        timepoint_order: &'a [TimePointId],
    ) -> MinCostFlow<'a> {
        MinCostFlow {
            oracle,
            timelines,
            role_requirements,
            requirements,
            intervals,
            timepoint_order,
        }
    }

    /// Runs the flow check: annotates the network with the committed
    /// roles and returns the violations found.
    pub fn run(&self, network: &mut SpaceTimeNetwork) -> PlanningResult<TransshipmentStatus> {
        let mut capacities: HashMap<(SpaceTimeKey, SpaceTimeKey), u32> = HashMap::new();
        let mut carriers_seen = false;

        // Carrier capacity from the mobile timelines; carriers are
        // committed to every tuple and edge they traverse.
        for timeline in self.timelines {
            if !self.oracle.is_mobile(timeline.role().model())? {
                continue;
            }
            carriers_seen = true;
            let capacity = self.oracle.transport_capacity(timeline.role().model())?;
            for (from, to) in timeline.movements() {
                *capacities.entry((from, to)).or_insert(0) += capacity;
            }
            self.commit(network, timeline);
        }

        // Route the commodities.
        let mut flaws = Vec::new();
        let mut commodities = 0;
        for timeline in self.timelines {
            if self.oracle.is_mobile(timeline.role().model())? {
                continue;
            }
            commodities += 1;

            let mut routed = true;
            for (from, to) in timeline.movements() {
                let remaining = capacities.get_mut(&(from, to));
                match remaining {
                    Some(remaining) if *remaining > 0 => {
                        *remaining -= 1;
                    }
                    Some(_) => {
                        routed = false;
                        flaws.push(self.flaw(
                            timeline,
                            from,
                            ConstraintViolation::ExceededCapacity { from, to, excess: 1 },
                        ));
                    }
                    None => {
                        routed = false;
                        let violation = if carriers_seen {
                            ConstraintViolation::UnmetDemand { from, to, missing: 1 }
                        } else {
                            ConstraintViolation::Isolated { at: from }
                        };
                        flaws.push(self.flaw(timeline, from, violation));
                    }
                }
            }
            if routed {
                self.commit(network, timeline);
            }
        }

        info!(
            "transshipment: {} commodities, {} flaws",
            commodities,
            flaws.len()
        );
        Ok(TransshipmentStatus { flaws, commodities })
    }

    /// Tags every tuple and edge of the timeline with the role under the
    /// `assigned` tag, adding movement edges where missing.
    fn commit(&self, network: &mut SpaceTimeNetwork, timeline: &RoleTimeline) {
        let role = timeline.role().clone();
        for &(location, timepoint) in timeline.waypoints() {
            if let Some(node) = network.tuple_by_keys(location, timepoint) {
                network.tag_tuple(node, role.clone(), ASSIGNED_TAG);
            }
        }
        for (from, to) in timeline.segments() {
            let (Some(source), Some(target)) = (
                network.tuple_by_keys(from.0, from.1),
                network.tuple_by_keys(to.0, to.1),
            ) else {
                continue;
            };
            let edge = if from.0 == to.0 {
                network.find_edge(source, target)
            } else {
                Some(network.add_movement_edge(source, target, 1.0))
            };
            if let Some(edge) = edge {
                network.tag_edge(edge, role.clone(), ASSIGNED_TAG);
            }
        }
    }

    /// Wraps a violation with the requirements surrounding the violating
    /// position of the role's timeline.
    fn flaw(
        &self,
        timeline: &RoleTimeline,
        at: SpaceTimeKey,
        violation: ConstraintViolation,
    ) -> Flaw {
        let role = timeline.role().clone();
        let position = self.timepoint_position(at.1);

        let mut previous_ftr = None;
        let mut current_ftr = None;
        let mut subsequent_ftr = None;
        if let Some(served) = self.role_requirements.get(&role) {
            for &requirement in served {
                let interval = self.intervals[self.requirements[requirement].interval_idx()];
                let from = self.timepoint_position(interval.from);
                let to = self.timepoint_position(interval.to);
                if to <= position && previous_ftr.map_or(true, |(p, _)| p < to) {
                    previous_ftr = Some((to, requirement));
                }
                if from <= position && position <= to {
                    current_ftr = Some(requirement);
                }
                if from >= position && subsequent_ftr.map_or(true, |(n, _)| n > from) {
                    subsequent_ftr = Some((from, requirement));
                }
            }
        }
        debug!("flaw for {role}: {violation}");

        Flaw {
            violation,
            affected_role: role,
            previous_ftr: previous_ftr.map(|(_, r)| r),
            current_ftr,
            subsequent_ftr: subsequent_ftr.map(|(_, r)| r),
        }
    }

    fn timepoint_position(&self, timepoint: TimePointId) -> usize {
        self.timepoint_order
            .iter()
            .position(|&t| t == timepoint)
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::CapabilityRegistry;
    use crate::mission::ModelCapability;
    use crate::mission::ModelIri;
    use crate::symbols::LocationId;

    fn keys() -> (SpaceTimeKey, SpaceTimeKey, SpaceTimeKey) {
        (
            (LocationId(0), TimePointId(0)),
            (LocationId(0), TimePointId(1)),
            (LocationId(1), TimePointId(2)),
        )
    }

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new()
            .with(ModelCapability::new("Vehicle").mobile(1))
            .with(ModelCapability::new("Commodity"))
    }

    fn network() -> SpaceTimeNetwork {
        SpaceTimeNetwork::new(
            vec![LocationId(0), LocationId(1)],
            vec![TimePointId(0), TimePointId(1), TimePointId(2)],
        )
        .unwrap()
    }

    #[test]
    fn a_carried_commodity_produces_no_flaws() {
        let registry = registry();
        let (a, b, c) = keys();
        let vehicle = Role::new(ModelIri::new("Vehicle"), 0);
        let commodity = Role::new(ModelIri::new("Commodity"), 0);
        let timelines = vec![
            RoleTimeline::new(vehicle.clone(), vec![a, b, c]),
            RoleTimeline::new(commodity.clone(), vec![a, b, c]),
        ];
        let role_requirements = BTreeMap::new();
        let requirements = Vec::new();
        let intervals = Vec::new();
        let order = vec![TimePointId(0), TimePointId(1), TimePointId(2)];

        let flow = MinCostFlow::new(
            &registry,
            &timelines,
            &role_requirements,
            &requirements,
            &intervals,
            &order,
        );
        let mut network = network();
        let status = flow.run(&mut network).unwrap();

        assert_eq!(status.commodities, 1);
        assert!(status.flaws.is_empty());

        // Both roles are committed to the movement edge.
        let source = network.tuple_by_keys(b.0, b.1).unwrap();
        let target = network.tuple_by_keys(c.0, c.1).unwrap();
        let edge = network.find_edge(source, target).unwrap();
        assert!(network.graph()[edge].info.has_role(&vehicle, ASSIGNED_TAG));
        assert!(network.graph()[edge].info.has_role(&commodity, ASSIGNED_TAG));
    }

    #[test]
    fn an_uncarried_commodity_is_flagged() {
        let registry = registry();
        let (a, b, c) = keys();
        let commodity = Role::new(ModelIri::new("Commodity"), 0);
        let timelines = vec![RoleTimeline::new(commodity, vec![a, b, c])];
        let role_requirements = BTreeMap::new();
        let requirements = Vec::new();
        let intervals = Vec::new();
        let order = vec![TimePointId(0), TimePointId(1), TimePointId(2)];

        let flow = MinCostFlow::new(
            &registry,
            &timelines,
            &role_requirements,
            &requirements,
            &intervals,
            &order,
        );
        let status = flow.run(&mut network()).unwrap();

        assert_eq!(status.flaws.len(), 1);
        assert!(matches!(
            status.flaws[0].violation,
            ConstraintViolation::Isolated { .. }
        ));
    }

    #[test]
    fn capacity_is_shared_between_commodities() {
        let registry = registry();
        let (a, b, c) = keys();
        let vehicle = Role::new(ModelIri::new("Vehicle"), 0);
        let first = Role::new(ModelIri::new("Commodity"), 0);
        let second = Role::new(ModelIri::new("Commodity"), 1);
        let timelines = vec![
            RoleTimeline::new(vehicle, vec![a, b, c]),
            RoleTimeline::new(first, vec![a, b, c]),
            RoleTimeline::new(second, vec![a, b, c]),
        ];
        let role_requirements = BTreeMap::new();
        let requirements = Vec::new();
        let intervals = Vec::new();
        let order = vec![TimePointId(0), TimePointId(1), TimePointId(2)];

        let flow = MinCostFlow::new(
            &registry,
            &timelines,
            &role_requirements,
            &requirements,
            &intervals,
            &order,
        );
        let status = flow.run(&mut network()).unwrap();

        // The vehicle carries one unit; the second commodity exceeds it.
        assert_eq!(status.flaws.len(), 1);
        assert!(matches!(
            status.flaws[0].violation,
            ConstraintViolation::ExceededCapacity { .. }
        ));
    }
}
