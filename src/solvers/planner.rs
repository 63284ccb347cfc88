use std::collections::BTreeMap;
use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use log::info;

use crate::basic_types::PlanningResult;
use crate::mission::Mission;
use crate::mission::OrganizationOracle;
use crate::mission::Role;
use crate::network::SpaceTimeNetwork;
use crate::network::REQUIRED_TAG;
use crate::solvers::csp::CancellationToken;
use crate::solvers::csp::CspSolution;
use crate::solvers::csp::RoleTimeline;
use crate::solvers::csp::SpaceTimeKey;
use crate::solvers::csp::TerminationCondition;
use crate::solvers::csp::TimeBudget;
use crate::solvers::csp::TransportNetwork;
use crate::solvers::transshipment::MinCostFlow;
use crate::solvers::FluentTimeResource;
use crate::solvers::Solution;
use crate::symbols::Location;
use crate::symbols::LocationId;

/// The result of one planning run.
#[derive(Debug)]
pub enum PlanningOutcome {
    /// A plan was found; it may still carry transshipment flaws.
    Solved(Solution),
    /// The search space is exhausted (or the run was cancelled).
    NoSolution,
}

/// The planner facade: runs the transport CSP, realizes the role
/// timelines into a space-time network, routes carriers for the
/// commodities and validates transshipment feasibility.
pub struct TransportNetworkPlanner<'a> {
    oracle: &'a dyn OrganizationOracle,
    time_limit: Option<Duration>,
    cancellation: CancellationToken,
}

impl<'a> TransportNetworkPlanner<'a> {
    pub fn new(oracle: &'a dyn OrganizationOracle) -> TransportNetworkPlanner<'a> {
        TransportNetworkPlanner {
            oracle,
            time_limit: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> TransportNetworkPlanner<'a> {
        self.time_limit = Some(limit);
        self
    }

    /// A token that cancels the running solve cooperatively.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn solve(&self, mission: &Mission) -> PlanningResult<PlanningOutcome> {
        let mut termination = PlannerTermination {
            budget: self.time_limit.map(TimeBudget::starting_now),
            token: self.cancellation.clone(),
        };

        let Some(csp) = TransportNetwork::solve(mission, self.oracle, &mut termination)? else {
            info!("mission '{}': no feasible assignment", mission.name());
            return Ok(PlanningOutcome::NoSolution);
        };

        // Rebuild the problem context the CSP worked with.
        let requirements = FluentTimeResource::from_mission(mission, self.oracle)?;
        let mut locations: Vec<(LocationId, Location)> = mission
            .locations()
            .map(|(id, location)| (id, location.clone()))
            .collect();
        let transfer = LocationId(locations.len() as u32);
        locations.push((transfer, Location::transfer()));

        let mut network = SpaceTimeNetwork::new(
            locations.iter().map(|(id, _)| *id).collect(),
            mission.ordered_timepoints().to_vec(),
        )?;

        // Realize the timelines: required-role tags plus movement edges.
        let mut timelines = csp.timelines.clone();
        for timeline in &timelines {
            realize(&mut network, timeline);
        }

        let role_requirements = role_requirement_map(&csp);
        let repaired = self.route_idle_carriers(mission, &mut timelines)?;
        for timeline in &timelines[timelines.len() - repaired..] {
            realize(&mut network, timeline);
        }

        let flow = MinCostFlow::new(
            self.oracle,
            &timelines,
            &role_requirements,
            &requirements,
            mission.intervals(),
            mission.ordered_timepoints(),
        );
        let status = flow.run(&mut network)?;

        let timepoint_labels = mission
            .ordered_timepoints()
            .iter()
            .map(|&t| {
                mission
                    .temporal_constraint_network()
                    .timepoint(t)
                    .label()
                    .to_string()
            })
            .collect();

        Ok(PlanningOutcome::Solved(Solution::new(
            network,
            csp.model_distribution,
            csp.role_distribution,
            timelines,
            status.flaws,
            requirements,
            mission.intervals().to_vec(),
            mission.ordered_timepoints().to_vec(),
            timepoint_labels,
            locations,
        )))
    }

    /// One repair pass of the flaw-iteration loop: commodity movement
    /// edges without carrier capacity are claimed by mobile roles that
    /// the CSP left idle, each routed along the full commodity path.
    /// Returns the number of timelines appended.
    fn route_idle_carriers(
        &self,
        mission: &Mission,
        timelines: &mut Vec<RoleTimeline>,
    ) -> PlanningResult<usize> {
        let mut idle: Vec<Role> = Vec::new();
        for role in mission.roles() {
            if self.oracle.is_mobile(role.model())?
                && self.oracle.transport_capacity(role.model())? > 0
                && !timelines.iter().any(|t| t.role() == &role)
            {
                idle.push(role);
            }
        }

        let mut appended = 0;
        loop {
            let Some(commodity) = self.uncarried_commodity(timelines)? else {
                break;
            };
            let Some(carrier) = idle.pop() else {
                debug!("commodity movements remain uncovered and no idle carrier is left");
                break;
            };
            info!(
                "routing idle carrier {carrier} along the path of {}",
                timelines[commodity].role()
            );
            let waypoints = timelines[commodity].waypoints().to_vec();
            timelines.push(RoleTimeline::new(carrier, waypoints));
            appended += 1;
        }
        Ok(appended)
    }

    /// The first commodity timeline with a movement edge that exceeds
    /// the currently aggregated carrier capacity.
    fn uncarried_commodity(&self, timelines: &[RoleTimeline]) -> PlanningResult<Option<usize>> {
        let mut capacity: HashMap<(SpaceTimeKey, SpaceTimeKey), i64> = HashMap::new();
        for timeline in timelines {
            if self.oracle.is_mobile(timeline.role().model())? {
                let payload = self.oracle.transport_capacity(timeline.role().model())? as i64;
                for movement in timeline.movements() {
                    *capacity.entry(movement).or_insert(0) += payload;
                }
            }
        }

        for (index, timeline) in timelines.iter().enumerate() {
            if self.oracle.is_mobile(timeline.role().model())? {
                continue;
            }
            for movement in timeline.movements() {
                let entry = capacity.entry(movement).or_insert(0);
                *entry -= 1;
                if *entry < 0 {
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }
}

/// Tags the timeline's waypoints as required and materializes its
/// movement edges in the network.
fn realize(network: &mut SpaceTimeNetwork, timeline: &RoleTimeline) {
    for &(location, timepoint) in timeline.waypoints() {
        if let Some(node) = network.tuple_by_keys(location, timepoint) {
            network.tag_tuple(node, timeline.role().clone(), REQUIRED_TAG);
        }
    }
    for (from, to) in timeline.movements() {
        let (Some(source), Some(target)) = (
            network.tuple_by_keys(from.0, from.1),
            network.tuple_by_keys(to.0, to.1),
        ) else {
            continue;
        };
        let edge = network.add_movement_edge(source, target, 1.0);
        network.tag_edge(edge, timeline.role().clone(), REQUIRED_TAG);
    }
}

fn role_requirement_map(csp: &CspSolution) -> BTreeMap<Role, Vec<usize>> {
    let mut map: BTreeMap<Role, Vec<usize>> = BTreeMap::new();
    for (requirement, roles) in csp.role_distribution.iter().enumerate() {
        for role in roles {
            map.entry(role.clone()).or_default().push(requirement);
        }
    }
    map
}

struct PlannerTermination {
    budget: Option<TimeBudget>,
    token: CancellationToken,
}

impl TerminationCondition for PlannerTermination {
    fn should_stop(&mut self) -> bool {
        self.token.is_cancelled()
            || self
                .budget
                .as_mut()
                .is_some_and(|budget| budget.should_stop())
    }
}
