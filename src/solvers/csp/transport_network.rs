use std::rc::Rc;

use log::debug;
use log::info;

use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::mission::Mission;
use crate::mission::ModelIri;
use crate::mission::ModelPool;
use crate::mission::OrganizationOracle;
use crate::mission::Role;
use crate::solvers::csp::branching::InDomainMin;
use crate::solvers::csp::branching::InDomainSplitMin;
use crate::solvers::csp::branching::LargestDomain;
use crate::solvers::csp::branching::SelectionContext;
use crate::solvers::csp::branching::ValueSelector;
use crate::solvers::csp::branching::VariableSelector;
use crate::solvers::csp::propagators::IsPath;
use crate::solvers::csp::propagators::LexLeq;
use crate::solvers::csp::propagators::LinearLeq;
use crate::solvers::csp::propagators::TableConstraint;
use crate::solvers::csp::Decision;
use crate::solvers::csp::DepthFirstSearch;
use crate::solvers::csp::DomainId;
use crate::solvers::csp::EmptyDomain;
use crate::solvers::csp::RoleTimeline;
use crate::solvers::csp::SearchOutcome;
use crate::solvers::csp::SearchSpace;
use crate::solvers::csp::Space;
use crate::solvers::csp::TerminationCondition;
use crate::solvers::FluentTimeResource;
use crate::symbols::LocationId;
use crate::temporal::point_algebra::TimePointComparator;
use crate::temporal::point_algebra::TimePointId;
use crate::temporal::Interval;

/// The immutable problem description shared between a space and all its
/// clones.
#[derive(Debug)]
pub struct TransportProblem {
    pub models: Vec<ModelIri>,
    pub max_pool: Vec<i32>,
    pub roles: Vec<Role>,
    pub requirements: Vec<FluentTimeResource>,
    pub concurrent: Vec<Vec<usize>>,
    /// Extensional domain rows per requirement; `None` when the
    /// requirement carries no functionality.
    pub domains: Vec<Option<Vec<Vec<i32>>>>,
    /// Mission locations plus the synthetic transfer location (last).
    pub locations: Vec<LocationId>,
    pub transfer_location: LocationId,
    pub timepoints: Vec<TimePointId>,
    pub intervals: Vec<Interval>,
}

impl TransportProblem {
    fn timepoint_position(&self, timepoint: TimePointId) -> PlanningResult<usize> {
        self.timepoints
            .iter()
            .position(|&t| t == timepoint)
            .ok_or_else(|| {
                PlanningError::Internal("interval endpoint missing from the ordering".to_string())
            })
    }

    fn node_count(&self) -> usize {
        self.locations.len() * self.timepoints.len()
    }

    /// Node `(location l, timestep t)` has index `t * L + l`.
    fn node(&self, location: usize, timestep: usize) -> usize {
        timestep * self.locations.len() + location
    }
}

/// A solution of the transport CSP.
#[derive(Debug, Clone)]
pub struct CspSolution {
    /// Agent-model counts per requirement.
    pub model_distribution: Vec<ModelPool>,
    /// Concrete roles per requirement.
    pub role_distribution: Vec<Vec<Role>>,
    /// Routes of the active roles.
    pub timelines: Vec<RoleTimeline>,
}

/// The transport-network constraint space.
///
/// Search proceeds in three phases. Model usage and role usage are
/// branched first; once both blocks are ground, the post-role-assignment
/// hook materializes one timeline matrix per active role and the search
/// descends into the timeline variables.
#[derive(Debug, Clone)]
pub struct TransportNetwork {
    problem: Rc<TransportProblem>,
    space: Space,
    /// `U[r * M + m]`: agents of model `m` for requirement `r`.
    model_usage: Vec<DomainId>,
    /// `A[r * W + w]`: role `w` active for requirement `r`.
    role_usage: Vec<DomainId>,
    /// Timeline variables per active role, in `active_roles` order.
    timelines: Vec<Vec<DomainId>>,
    active_roles: Vec<usize>,
    timelines_posted: bool,
}

impl TransportNetwork {
    /// Builds the root space from a prepared mission.
    pub fn new(
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
    ) -> PlanningResult<TransportNetwork> {
        if !mission.is_prepared() {
            return Err(PlanningError::InvalidInput(
                "mission must be prepared before solving".to_string(),
            ));
        }
        let requirements = FluentTimeResource::from_mission(mission, oracle)?;
        if requirements.is_empty() {
            return Err(PlanningError::InvalidInput(
                "mission has no resource requirements".to_string(),
            ));
        }

        let comparator = TimePointComparator::new(mission.temporal_constraint_network())?;
        let concurrent = FluentTimeResource::concurrent_groups(
            &requirements,
            mission.intervals(),
            &comparator,
        )?;

        let models = mission.models();
        let max_pool: Vec<i32> = models
            .iter()
            .map(|m| mission.resources().get(m) as i32)
            .collect();
        let roles = mission.roles();

        let mut domains = Vec::with_capacity(requirements.len());
        for requirement in &requirements {
            let rows = requirement
                .domain(mission, oracle, mission.resources())?
                .map(|pools| {
                    pools
                        .iter()
                        .map(|pool| {
                            models.iter().map(|m| pool.get(m) as i32).collect::<Vec<i32>>()
                        })
                        .collect::<Vec<_>>()
                });
            domains.push(rows);
        }

        let mut locations: Vec<LocationId> =
            mission.locations().map(|(id, _)| id).collect();
        let transfer_location = LocationId(locations.len() as u32);
        locations.push(transfer_location);

        let problem = Rc::new(TransportProblem {
            models,
            max_pool,
            roles,
            requirements,
            concurrent,
            domains,
            locations,
            transfer_location,
            timepoints: mission.ordered_timepoints().to_vec(),
            intervals: mission.intervals().to_vec(),
        });

        info!(
            "transport CSP: {} requirements, {} models, {} roles, {} concurrent groups",
            problem.requirements.len(),
            problem.models.len(),
            problem.roles.len(),
            problem.concurrent.len()
        );

        let mut network = TransportNetwork {
            problem,
            space: Space::new(),
            model_usage: Vec::new(),
            role_usage: Vec::new(),
            timelines: Vec::new(),
            active_roles: Vec::new(),
            timelines_posted: false,
        };
        network.post_model_usage();
        network.post_role_usage();
        Ok(network)
    }

    fn model_count(&self) -> usize {
        self.problem.models.len()
    }

    fn role_count(&self) -> usize {
        self.problem.roles.len()
    }

    fn model_usage_var(&self, requirement: usize, model: usize) -> DomainId {
        self.model_usage[requirement * self.model_count() + model]
    }

    fn role_usage_var(&self, requirement: usize, role: usize) -> DomainId {
        self.role_usage[requirement * self.role_count() + role]
    }

    /// Variables and constraints of the model-usage block: resource
    /// bounds, non-emptiness, the extensional domains and model
    /// concurrency.
    fn post_model_usage(&mut self) {
        let problem = Rc::clone(&self.problem);

        for requirement in &problem.requirements {
            for (m, model) in problem.models.iter().enumerate() {
                let min = requirement.min_cardinalities().get(model) as i32;
                let max = (requirement.max_cardinalities().get(model) as i32)
                    .min(problem.max_pool[m]);
                let variable = self.space.new_variable(min, max);
                self.model_usage.push(variable);
            }
        }

        for (r, _) in problem.requirements.iter().enumerate() {
            let row: Vec<DomainId> = (0..self.model_count())
                .map(|m| self.model_usage_var(r, m))
                .collect();
            // There is no empty assignment for a requirement.
            self.space.post(LinearLeq::sum_geq(&row, 1));

            if let Some(rows) = &problem.domains[r] {
                self.space
                    .post(TableConstraint::new(row.clone(), rows.clone()));
            }
        }

        // Concurrent requirements share one pool.
        for group in &problem.concurrent {
            for (m, _) in problem.models.iter().enumerate() {
                let columns: Vec<DomainId> = group
                    .iter()
                    .map(|&r| self.model_usage_var(r, m))
                    .collect();
                self.space
                    .post(LinearLeq::sum_leq(&columns, problem.max_pool[m]));
            }
        }
    }

    /// Variables and constraints of the role-usage block: the coupling to
    /// the model counts, role concurrency and the lex-leader symmetry
    /// breaking between interchangeable roles.
    fn post_role_usage(&mut self) {
        let problem = Rc::clone(&self.problem);

        for _ in 0..problem.requirements.len() * problem.roles.len() {
            let variable = self.space.new_variable(0, 1);
            self.role_usage.push(variable);
        }

        for r in 0..problem.requirements.len() {
            for (m, model) in problem.models.iter().enumerate() {
                let activations: Vec<DomainId> = problem
                    .roles
                    .iter()
                    .enumerate()
                    .filter(|(_, role)| role.model() == model)
                    .map(|(w, _)| self.role_usage_var(r, w))
                    .collect();
                for propagator in
                    LinearLeq::sum_equals_var(&activations, self.model_usage_var(r, m))
                {
                    self.space.post(propagator);
                }
            }
        }

        // A role serves at most one of a set of concurrent requirements.
        for group in &problem.concurrent {
            for w in 0..problem.roles.len() {
                let columns: Vec<DomainId> =
                    group.iter().map(|&r| self.role_usage_var(r, w)).collect();
                self.space.post(LinearLeq::sum_leq(&columns, 1));
            }
        }

        // Roles of the same model are interchangeable: order their
        // activation columns lexicographically.
        for model in &problem.models {
            let same_model: Vec<usize> = problem
                .roles
                .iter()
                .enumerate()
                .filter(|(_, role)| role.model() == model)
                .map(|(w, _)| w)
                .collect();
            for pair in same_model.windows(2) {
                let earlier: Vec<DomainId> = (0..problem.requirements.len())
                    .map(|r| self.role_usage_var(r, pair[0]))
                    .collect();
                let later: Vec<DomainId> = (0..problem.requirements.len())
                    .map(|r| self.role_usage_var(r, pair[1]))
                    .collect();
                self.space.post(LexLeq::new(later, earlier));
            }
        }
    }

    /// The post-role-assignment hook: once model and role usage are
    /// ground, determine the active roles and materialize their timeline
    /// matrices with the path laws.
    fn post_role_assignments(&mut self) -> Result<(), EmptyDomain> {
        let problem = Rc::clone(&self.problem);

        self.active_roles = (0..self.role_count())
            .filter(|&w| {
                (0..problem.requirements.len())
                    .any(|r| self.space.value(self.role_usage_var(r, w)) == Some(1))
            })
            .collect();
        debug!(
            "materializing timelines for {} active roles",
            self.active_roles.len()
        );

        let nodes = problem.node_count();
        let fluents = problem.locations.len();

        for &w in &self.active_roles.clone() {
            let mut variables = Vec::with_capacity(nodes * nodes);
            for from in 0..nodes {
                for to in 0..nodes {
                    // Forward in time only.
                    let forward = to / fluents > from / fluents;
                    let variable = if forward {
                        self.space.new_variable(0, 1)
                    } else {
                        self.space.new_variable(0, 0)
                    };
                    variables.push(variable);
                }
            }

            // The role dwells at the location of every requirement it is
            // active for, throughout the requirement's interval.
            for (r, requirement) in problem.requirements.iter().enumerate() {
                if self.space.value(self.role_usage_var(r, w)) != Some(1) {
                    continue;
                }
                let interval = problem.intervals[requirement.interval_idx()];
                let from_position = problem
                    .timepoint_position(interval.from)
                    .map_err(|_| EmptyDomain)?;
                let to_position = problem
                    .timepoint_position(interval.to)
                    .map_err(|_| EmptyDomain)?;
                for timestep in from_position..to_position {
                    let from = problem.node(requirement.fluent_idx(), timestep);
                    let to = problem.node(requirement.fluent_idx(), timestep + 1);
                    let variable = variables[from * nodes + to];
                    self.space.branch_lower_bound(variable, 1);
                }
            }

            // In and out degree of every node is at most one.
            for node in 0..nodes {
                let row: Vec<DomainId> = (0..nodes)
                    .map(|to| variables[node * nodes + to])
                    .collect();
                self.space.post(LinearLeq::sum_leq(&row, 1));
                let column: Vec<DomainId> = (0..nodes)
                    .map(|from| variables[from * nodes + node])
                    .collect();
                self.space.post(LinearLeq::sum_leq(&column, 1));
            }

            // At most one outgoing edge per timestep: a role is in one
            // place at a time.
            for timestep in 0..problem.timepoints.len() {
                let mut outgoing = Vec::new();
                for fluent in 0..fluents {
                    let from = problem.node(fluent, timestep);
                    outgoing.extend((0..nodes).map(|to| variables[from * nodes + to]));
                }
                self.space.post(LinearLeq::sum_leq(&outgoing, 1));
            }

            self.space.post(IsPath::new(
                variables.clone(),
                fluents,
                problem.timepoints.len(),
            ));
            self.timelines.push(variables);
        }

        self.timelines_posted = true;
        if self.space.propagate() {
            Ok(())
        } else {
            Err(EmptyDomain)
        }
    }

    /// Reads the solution out of a ground space.
    pub fn solution(&self) -> PlanningResult<CspSolution> {
        let problem = &self.problem;
        let value = |variable: DomainId| {
            self.space.value(variable).ok_or_else(|| {
                PlanningError::Internal("solution read from an unassigned space".to_string())
            })
        };

        let mut model_distribution = Vec::with_capacity(problem.requirements.len());
        let mut role_distribution = Vec::with_capacity(problem.requirements.len());
        for r in 0..problem.requirements.len() {
            let mut pool = ModelPool::new();
            for (m, model) in problem.models.iter().enumerate() {
                let count = value(self.model_usage_var(r, m))?;
                if count > 0 {
                    pool.set(model.clone(), count as usize);
                }
            }
            model_distribution.push(pool);

            let mut roles = Vec::new();
            for (w, role) in problem.roles.iter().enumerate() {
                if value(self.role_usage_var(r, w))? == 1 {
                    roles.push(role.clone());
                }
            }
            role_distribution.push(roles);
        }

        let nodes = problem.node_count();
        let fluents = problem.locations.len();
        let mut timelines = Vec::with_capacity(self.active_roles.len());
        for (position, &w) in self.active_roles.iter().enumerate() {
            let variables = &self.timelines[position];
            let mut edges = Vec::new();
            for from in 0..nodes {
                for to in 0..nodes {
                    if value(variables[from * nodes + to])? == 1 {
                        edges.push((from, to));
                    }
                }
            }
            edges.sort_by_key(|&(from, _)| from / fluents);

            let mut waypoints = Vec::new();
            for (index, &(from, to)) in edges.iter().enumerate() {
                let key = |node: usize| {
                    (
                        LocationId((node % fluents) as u32),
                        problem.timepoints[node / fluents],
                    )
                };
                if index == 0 {
                    waypoints.push(key(from));
                }
                waypoints.push(key(to));
            }
            timelines.push(RoleTimeline::new(problem.roles[w].clone(), waypoints));
        }

        Ok(CspSolution {
            model_distribution,
            role_distribution,
            timelines,
        })
    }

    pub fn problem(&self) -> &TransportProblem {
        &self.problem
    }

    /// Runs the search and extracts the first feasible solution.
    pub fn solve(
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
        termination: &mut dyn TerminationCondition,
    ) -> PlanningResult<Option<CspSolution>> {
        let root = TransportNetwork::new(mission, oracle)?;
        match DepthFirstSearch::first_solution(root, termination) {
            SearchOutcome::Solution(network) => Ok(Some(network.solution()?)),
            SearchOutcome::Exhausted | SearchOutcome::Unknown => Ok(None),
        }
    }
}

impl SearchSpace for TransportNetwork {
    fn propagate(&mut self) -> bool {
        self.space.propagate()
    }

    fn next_decision(&mut self) -> Result<Option<Decision>, EmptyDomain> {
        // Phase 1: model usage, largest domain first, lower half first.
        {
            let context = SelectionContext::new(&self.space);
            let selector = LargestDomain::new(self.model_usage.clone());
            if let Some(variable) = selector.select_variable(&context) {
                return Ok(Some(InDomainSplitMin.select_value(&context, variable)));
            }
        }

        // Phase 2: role usage, smallest value first (prefer leaving a
        // role inactive).
        {
            let context = SelectionContext::new(&self.space);
            let selector = LargestDomain::new(self.role_usage.clone());
            if let Some(variable) = selector.select_variable(&context) {
                return Ok(Some(InDomainMin.select_value(&context, variable)));
            }
        }

        // Phase 3: timelines, materialized on first entry.
        if !self.timelines_posted {
            self.post_role_assignments()?;
        }
        let all_timeline_vars: Vec<DomainId> =
            self.timelines.iter().flatten().copied().collect();
        let context = SelectionContext::new(&self.space);
        let selector = LargestDomain::new(all_timeline_vars);
        if let Some(variable) = selector.select_variable(&context) {
            return Ok(Some(InDomainSplitMin.select_value(&context, variable)));
        }

        Ok(None)
    }

    fn commit(&mut self, decision: &Decision, take_left: bool) {
        decision.apply(&mut self.space, take_left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::CapabilityRegistry;
    use crate::mission::ModelCapability;
    use crate::solvers::csp::Indefinite;
    use crate::symbols::Location;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new()
            .with(ModelCapability::new("Vehicle").mobile(1))
            .with(ModelCapability::new("Commodity"))
    }

    fn chain_timepoints(mission: &mut Mission, count: usize) -> Vec<TimePointId> {
        let ids: Vec<TimePointId> = (0..count)
            .map(|i| mission.get_or_create_timepoint(&format!("t{i}")).unwrap())
            .collect();
        for pair in ids.windows(2) {
            mission.add_temporal_constraint(
                pair[0],
                pair[1],
                crate::temporal::point_algebra::QualitativeConstraint::LESS,
            );
        }
        ids
    }

    #[test]
    fn single_agent_single_location_mission() {
        let registry = registry();
        let mut mission = Mission::new("single");
        mission.add_resource("Vehicle", 1);
        let l0 = mission.add_location(Location::new("l0"));
        let t = chain_timepoints(&mut mission, 4);
        mission.add_resource_requirement(l0, t[0], t[3], "Vehicle", 1, Some(1));
        mission.prepare(&registry).unwrap();

        let solution = TransportNetwork::solve(&mission, &registry, &mut Indefinite)
            .unwrap()
            .expect("mission is satisfiable");

        assert_eq!(
            solution.model_distribution[0].get(&ModelIri::new("Vehicle")),
            1
        );
        assert_eq!(solution.role_distribution[0].len(), 1);

        // The timeline dwells at l0 through every timestep.
        let timeline = &solution.timelines[0];
        assert_eq!(timeline.waypoints().len(), 4);
        assert!(timeline
            .waypoints()
            .iter()
            .all(|&(location, _)| location == l0));
        assert!(timeline.movements().is_empty());
    }

    #[test]
    fn concurrent_conflict_has_no_solution() {
        let registry = registry();
        let mut mission = Mission::new("conflict");
        mission.add_resource("Vehicle", 1);
        let l0 = mission.add_location(Location::new("l0"));
        let l1 = mission.add_location(Location::new("l1"));
        let t = chain_timepoints(&mut mission, 2);
        mission.add_resource_requirement(l0, t[0], t[1], "Vehicle", 1, None);
        mission.add_resource_requirement(l1, t[0], t[1], "Vehicle", 1, None);
        mission.prepare(&registry).unwrap();

        let solution = TransportNetwork::solve(&mission, &registry, &mut Indefinite).unwrap();
        assert!(solution.is_none());
    }

    #[test]
    fn sequential_requirements_reuse_the_agent() {
        let registry = registry();
        let mut mission = Mission::new("sequential");
        mission.add_resource("Vehicle", 1);
        let l0 = mission.add_location(Location::new("l0"));
        let l1 = mission.add_location(Location::new("l1"));
        let t = chain_timepoints(&mut mission, 4);
        mission.add_resource_requirement(l0, t[0], t[1], "Vehicle", 1, None);
        mission.add_resource_requirement(l1, t[2], t[3], "Vehicle", 1, None);
        mission.prepare(&registry).unwrap();

        let solution = TransportNetwork::solve(&mission, &registry, &mut Indefinite)
            .unwrap()
            .expect("one vehicle can serve both sequential requirements");

        assert_eq!(solution.timelines.len(), 1);
        let timeline = &solution.timelines[0];
        // The route covers l0 at the start and l1 at the end.
        assert_eq!(timeline.first().unwrap().0, l0);
        assert_eq!(timeline.last().unwrap().0, l1);
        assert_eq!(timeline.movements().len(), 1);
    }

    #[test]
    fn model_concurrency_bounds_are_respected_with_two_vehicles() {
        let registry = registry();
        let mut mission = Mission::new("pair");
        mission.add_resource("Vehicle", 2);
        let l0 = mission.add_location(Location::new("l0"));
        let l1 = mission.add_location(Location::new("l1"));
        let t = chain_timepoints(&mut mission, 2);
        mission.add_resource_requirement(l0, t[0], t[1], "Vehicle", 1, None);
        mission.add_resource_requirement(l1, t[0], t[1], "Vehicle", 1, None);
        mission.prepare(&registry).unwrap();

        let solution = TransportNetwork::solve(&mission, &registry, &mut Indefinite)
            .unwrap()
            .expect("two vehicles cover two concurrent requirements");

        let first = &solution.role_distribution[0];
        let second = &solution.role_distribution[1];
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0], second[0], "concurrent requirements need distinct roles");
    }
}
