//! Read-only analysis over a solved space-time network.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::basic_types::PlanningResult;
use crate::mission::Mission;
use crate::mission::ModelIri;
use crate::mission::ModelPool;
use crate::mission::OrganizationOracle;
use crate::mission::Role;
use crate::network::ASSIGNED_TAG;
use crate::solvers::Solution;
use crate::symbols::LocationId;
use crate::temporal::point_algebra::TimePointComparator;
use crate::temporal::point_algebra::TimePointId;

/// A vertex of the hypergraph rendering of a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperGraphNode {
    Role(Role),
    Tuple(LocationId, TimePointId),
}

/// Derived quantities over one solution: per-requirement availability,
/// shortfall and fulfillment figures.
pub struct SolutionAnalysis<'a> {
    mission: &'a Mission,
    oracle: &'a dyn OrganizationOracle,
    solution: &'a Solution,
}

impl<'a> SolutionAnalysis<'a> {
    pub fn new(
        mission: &'a Mission,
        oracle: &'a dyn OrganizationOracle,
        solution: &'a Solution,
    ) -> SolutionAnalysis<'a> {
        SolutionAnalysis {
            mission,
            oracle,
            solution,
        }
    }

    /// The roles appearing on at least `min_usage` tuples of the network.
    pub fn required_roles(&self, min_usage: usize) -> BTreeSet<Role> {
        let mut usage: BTreeMap<Role, usize> = BTreeMap::new();
        for node in self.solution.network().graph().node_indices() {
            for role in self.solution.network().graph()[node].info.all_roles() {
                *usage.entry(role).or_insert(0) += 1;
            }
        }
        usage
            .into_iter()
            .filter(|&(_, count)| count >= min_usage)
            .map(|(role, _)| role)
            .collect()
    }

    /// The committed model pool at the requirement's location for every
    /// timepoint of its interval: the roles assigned to the tuple plus
    /// those arriving over assigned in-edges.
    pub fn available_resources(&self, requirement: usize) -> PlanningResult<Vec<ModelPool>> {
        let ftr = &self.solution.requirements()[requirement];
        let interval = self.solution.intervals()[ftr.interval_idx()];
        let location = LocationId(ftr.fluent_idx() as u32);
        let comparator = TimePointComparator::new(self.mission.temporal_constraint_network())?;

        let mut pools = Vec::new();
        for &timepoint in self.solution.timepoints() {
            if !comparator.in_interval(timepoint, interval.from, interval.to)? {
                continue;
            }
            let Some(node) = self.solution.network().tuple_by_keys(location, timepoint) else {
                continue;
            };

            let tuple_roles = self.solution.network().graph()[node].info.roles(ASSIGNED_TAG);
            let mut pool = Role::to_pool(tuple_roles.iter());
            for edge in self
                .solution
                .network()
                .graph()
                .edges_directed(node, Direction::Incoming)
            {
                for role in edge.weight().info.roles(ASSIGNED_TAG) {
                    pool.set(role.model().clone(), pool.get(role.model()) + 1);
                }
            }
            pools.push(pool);
        }
        Ok(pools)
    }

    /// The weakest committed pool over the requirement's interval.
    pub fn min_available_resources(&self, requirement: usize) -> PlanningResult<ModelPool> {
        let pools = self.available_resources(requirement)?;
        let mut iterator = pools.into_iter();
        let first = iterator.next().unwrap_or_default();
        Ok(iterator.fold(first, |acc, pool| ModelPool::min_merge(&acc, &pool)))
    }

    /// The strongest committed pool over the requirement's interval.
    pub fn max_available_resources(&self, requirement: usize) -> PlanningResult<ModelPool> {
        let pools = self.available_resources(requirement)?;
        Ok(pools
            .into_iter()
            .fold(ModelPool::new(), |acc, pool| ModelPool::max_merge(&acc, &pool)))
    }

    /// The `(min, max)` cardinality pools of the requirement.
    pub fn required_resources(&self, requirement: usize) -> (ModelPool, ModelPool) {
        let ftr = &self.solution.requirements()[requirement];
        (
            ftr.min_cardinalities().clone(),
            ftr.max_cardinalities().clone(),
        )
    }

    /// What the requirement still lacks: `delta(required, available)`,
    /// non-negative componentwise.
    pub fn missing_resources(&self, requirement: usize) -> PlanningResult<ModelPool> {
        let available = self.min_available_resources(requirement)?;
        let (required, _) = self.required_resources(requirement);
        Ok(ModelPool::delta(&required, &available))
    }

    /// The raw signed shortfall per model over the requirement's
    /// interval; negative components are surplus agents beyond what the
    /// requirement asked for.
    pub fn resource_delta(
        &self,
        requirement: usize,
    ) -> PlanningResult<BTreeMap<ModelIri, i64>> {
        let available = self.min_available_resources(requirement)?;
        let (required, _) = self.required_resources(requirement);
        Ok(ModelPool::signed_delta(&required, &available))
    }

    /// The fraction of the requirement's functionalities supported by the
    /// weakest committed pool; 1.0 for a requirement without
    /// functionalities.
    pub fn degree_of_fulfillment(&self, requirement: usize) -> PlanningResult<f64> {
        let ftr = &self.solution.requirements()[requirement];
        let functionalities = ftr.functionalities(self.mission, self.oracle);
        if functionalities.is_empty() {
            return Ok(1.0);
        }
        let available = self.min_available_resources(requirement)?;
        let supported = self.oracle.supported_functionalities(&available)?;
        let satisfied = functionalities
            .iter()
            .filter(|f| supported.contains(*f))
            .count();
        Ok(satisfied as f64 / functionalities.len() as f64)
    }

    /// Rewrites the role annotations as a hypergraph: one vertex per
    /// role, linked to every space-time tuple the role appears on.
    pub fn to_hyper_graph(&self) -> DiGraph<HyperGraphNode, ()> {
        let mut graph = DiGraph::new();
        let mut role_nodes = BTreeMap::new();

        for node in self.solution.network().graph().node_indices() {
            let tuple = &self.solution.network().graph()[node];
            let roles = tuple.info.all_roles();
            if roles.is_empty() {
                continue;
            }
            let tuple_node =
                graph.add_node(HyperGraphNode::Tuple(tuple.location, tuple.timepoint));
            for role in roles {
                let role_node = *role_nodes
                    .entry(role.clone())
                    .or_insert_with(|| graph.add_node(HyperGraphNode::Role(role)));
                let _ = graph.add_edge(role_node, tuple_node, ());
            }
        }
        graph
    }
}
