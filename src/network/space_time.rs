use std::collections::HashMap;
use std::fmt;

use petgraph::stable_graph::EdgeIndex;
use petgraph::stable_graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;

use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::mission::Role;
use crate::network::RoleInfo;
use crate::symbols::LocationId;
use crate::temporal::point_algebra::TimePointId;

/// A vertex of the space-time network: one `(location, timepoint)` pair
/// with its role annotations.
#[derive(Debug, Clone)]
pub struct RoleInfoTuple {
    pub location: LocationId,
    pub timepoint: TimePointId,
    pub info: RoleInfo,
}

/// An edge of the space-time network. Local transitions (same location,
/// consecutive timepoints) carry infinite weight; movement edges carry
/// the cost of the location change.
#[derive(Debug, Clone)]
pub struct RoleInfoEdge {
    pub weight: f64,
    pub info: RoleInfo,
}

impl RoleInfoEdge {
    pub fn local_transition() -> RoleInfoEdge {
        RoleInfoEdge {
            weight: f64::INFINITY,
            info: RoleInfo::new(),
        }
    }

    pub fn movement(weight: f64) -> RoleInfoEdge {
        RoleInfoEdge {
            weight,
            info: RoleInfo::new(),
        }
    }

    pub fn is_local_transition(&self) -> bool {
        self.weight.is_infinite()
    }
}

/// The temporally expanded network over `{locations × timepoints}`.
///
/// Construction materializes every tuple and exactly one local-transition
/// edge per location between each pair of consecutive timepoints.
/// Movement edges between distinct locations are added later, during role
/// timeline realization.
#[derive(Debug, Clone)]
pub struct SpaceTimeNetwork {
    graph: StableDiGraph<RoleInfoTuple, RoleInfoEdge>,
    locations: Vec<LocationId>,
    timepoints: Vec<TimePointId>,
    tuple_map: HashMap<(LocationId, TimePointId), NodeIndex>,
    location_positions: HashMap<LocationId, usize>,
    timepoint_positions: HashMap<TimePointId, usize>,
}

impl SpaceTimeNetwork {
    pub fn new(
        locations: Vec<LocationId>,
        timepoints: Vec<TimePointId>,
    ) -> PlanningResult<SpaceTimeNetwork> {
        if locations.is_empty() {
            return Err(PlanningError::InvalidInput(
                "cannot expand a network without locations".to_string(),
            ));
        }
        if timepoints.is_empty() {
            return Err(PlanningError::InvalidInput(
                "cannot expand a network without timepoints".to_string(),
            ));
        }

        let mut graph = StableDiGraph::new();
        let mut tuple_map = HashMap::new();
        for &location in &locations {
            let mut previous: Option<NodeIndex> = None;
            for &timepoint in &timepoints {
                let current = graph.add_node(RoleInfoTuple {
                    location,
                    timepoint,
                    info: RoleInfo::new(),
                });
                let _ = tuple_map.insert((location, timepoint), current);
                if let Some(previous) = previous {
                    let _ = graph.add_edge(previous, current, RoleInfoEdge::local_transition());
                }
                previous = Some(current);
            }
        }

        let location_positions = locations
            .iter()
            .enumerate()
            .map(|(position, &location)| (location, position))
            .collect();
        let timepoint_positions = timepoints
            .iter()
            .enumerate()
            .map(|(position, &timepoint)| (timepoint, position))
            .collect();

        Ok(SpaceTimeNetwork {
            graph,
            locations,
            timepoints,
            tuple_map,
            location_positions,
            timepoint_positions,
        })
    }

    pub fn graph(&self) -> &StableDiGraph<RoleInfoTuple, RoleInfoEdge> {
        &self.graph
    }

    pub fn locations(&self) -> &[LocationId] {
        &self.locations
    }

    pub fn timepoints(&self) -> &[TimePointId] {
        &self.timepoints
    }

    /// The vertex for `(location, timepoint)`.
    pub fn tuple_by_keys(
        &self,
        location: LocationId,
        timepoint: TimePointId,
    ) -> Option<NodeIndex> {
        self.tuple_map.get(&(location, timepoint)).copied()
    }

    pub fn tuple(&self, node: NodeIndex) -> &RoleInfoTuple {
        &self.graph[node]
    }

    /// The grid row of a vertex: the position of its timepoint.
    pub fn row(&self, node: NodeIndex) -> usize {
        *self
            .timepoint_positions
            .get(&self.graph[node].timepoint)
            .expect("tuple timepoint belongs to the network")
    }

    /// The grid column of a vertex: the position of its location.
    pub fn column(&self, node: NodeIndex) -> usize {
        *self
            .location_positions
            .get(&self.graph[node].location)
            .expect("tuple location belongs to the network")
    }

    /// Adds (or finds) a movement edge between two tuples of distinct
    /// locations.
    pub fn add_movement_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        weight: f64,
    ) -> EdgeIndex {
        debug_assert_ne!(
            self.graph[source].location, self.graph[target].location,
            "movement edges connect distinct locations"
        );
        if let Some(edge) = self.graph.find_edge(source, target) {
            return edge;
        }
        self.graph.add_edge(source, target, RoleInfoEdge::movement(weight))
    }

    pub fn find_edge(&self, source: NodeIndex, target: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(source, target)
    }

    /// Tags the tuple with the role.
    pub fn tag_tuple(&mut self, node: NodeIndex, role: Role, tag: &str) {
        self.graph[node].info.add_role(role, tag);
    }

    /// Tags the edge with the role.
    pub fn tag_edge(&mut self, edge: EdgeIndex, role: Role, tag: &str) {
        self.graph[edge].info.add_role(role, tag);
    }
}

impl fmt::Display for SpaceTimeNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpaceTimeNetwork: {} locations x {} timepoints, {} edges",
            self.locations.len(),
            self.timepoints.len(),
            self.graph.edge_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> SpaceTimeNetwork {
        SpaceTimeNetwork::new(
            vec![LocationId(0), LocationId(1)],
            vec![TimePointId(0), TimePointId(1), TimePointId(2)],
        )
        .unwrap()
    }

    #[test]
    fn grid_has_one_local_transition_per_step() {
        let network = network();
        // 2 locations x 3 timepoints, 2 transitions per location.
        assert_eq!(network.graph().node_count(), 6);
        assert_eq!(network.graph().edge_count(), 4);

        let l0t0 = network.tuple_by_keys(LocationId(0), TimePointId(0)).unwrap();
        let l0t1 = network.tuple_by_keys(LocationId(0), TimePointId(1)).unwrap();
        let edge = network.find_edge(l0t0, l0t1).unwrap();
        assert!(network.graph()[edge].is_local_transition());
    }

    #[test]
    fn rows_and_columns_follow_the_grid() {
        let network = network();
        let node = network.tuple_by_keys(LocationId(1), TimePointId(2)).unwrap();
        assert_eq!(network.column(node), 1);
        assert_eq!(network.row(node), 2);
    }

    #[test]
    fn movement_edges_are_deduplicated() {
        let mut network = network();
        let a = network.tuple_by_keys(LocationId(0), TimePointId(0)).unwrap();
        let b = network.tuple_by_keys(LocationId(1), TimePointId(1)).unwrap();
        let first = network.add_movement_edge(a, b, 1.0);
        let second = network.add_movement_edge(a, b, 1.0);
        assert_eq!(first, second);
    }
}
