use std::fmt;

use crate::mission::ModelPool;
use crate::mission::Role;
use crate::network::SpaceTimeNetwork;
use crate::solvers::csp::RoleTimeline;
use crate::solvers::transshipment::Flaw;
use crate::solvers::FluentTimeResource;
use crate::symbols::Location;
use crate::symbols::LocationId;
use crate::temporal::point_algebra::TimePointId;
use crate::temporal::Interval;

/// A read-only view over a solved transport network.
#[derive(Debug)]
pub struct Solution {
    network: SpaceTimeNetwork,
    model_distribution: Vec<ModelPool>,
    role_distribution: Vec<Vec<Role>>,
    timelines: Vec<RoleTimeline>,
    flaws: Vec<Flaw>,
    requirements: Vec<FluentTimeResource>,
    intervals: Vec<Interval>,
    timepoints: Vec<TimePointId>,
    timepoint_labels: Vec<String>,
    /// All locations of the network, the synthetic transfer location
    /// included (last).
    locations: Vec<(LocationId, Location)>,
}

impl Solution {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        network: SpaceTimeNetwork,
        model_distribution: Vec<ModelPool>,
        role_distribution: Vec<Vec<Role>>,
        timelines: Vec<RoleTimeline>,
        flaws: Vec<Flaw>,
        requirements: Vec<FluentTimeResource>,
        intervals: Vec<Interval>,
        timepoints: Vec<TimePointId>,
        timepoint_labels: Vec<String>,
        locations: Vec<(LocationId, Location)>,
    ) -> Solution {
        Solution {
            network,
            model_distribution,
            role_distribution,
            timelines,
            flaws,
            requirements,
            intervals,
            timepoints,
            timepoint_labels,
            locations,
        }
    }

    pub fn network(&self) -> &SpaceTimeNetwork {
        &self.network
    }

    /// The model pool assigned to each requirement.
    pub fn model_distribution(&self) -> &[ModelPool] {
        &self.model_distribution
    }

    /// The concrete roles assigned to each requirement.
    pub fn role_distribution(&self) -> &[Vec<Role>] {
        &self.role_distribution
    }

    pub fn timelines(&self) -> &[RoleTimeline] {
        &self.timelines
    }

    pub fn timeline_of(&self, role: &Role) -> Option<&RoleTimeline> {
        self.timelines.iter().find(|t| t.role() == role)
    }

    /// The transshipment violations; empty for a fully feasible plan.
    pub fn flaws(&self) -> &[Flaw] {
        &self.flaws
    }

    pub fn is_fulfilled(&self) -> bool {
        self.flaws.is_empty()
    }

    pub fn requirements(&self) -> &[FluentTimeResource] {
        &self.requirements
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn timepoints(&self) -> &[TimePointId] {
        &self.timepoints
    }

    pub fn locations(&self) -> &[(LocationId, Location)] {
        &self.locations
    }

    pub fn location_name(&self, id: LocationId) -> &str {
        self.locations
            .iter()
            .find(|(location_id, _)| *location_id == id)
            .map_or("?", |(_, location)| location.id())
    }

    pub fn timepoint_label(&self, id: TimePointId) -> &str {
        self.timepoints
            .iter()
            .position(|&t| t == id)
            .map_or("?", |position| self.timepoint_labels[position].as_str())
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution ({} requirements)", self.requirements.len())?;
        for (index, (pool, roles)) in self
            .model_distribution
            .iter()
            .zip(&self.role_distribution)
            .enumerate()
        {
            writeln!(f, "  requirement #{index}: {pool}")?;
            for role in roles {
                writeln!(f, "    {role}")?;
            }
        }
        writeln!(f, "  timelines:")?;
        for timeline in &self.timelines {
            writeln!(f, "    {timeline}")?;
        }
        if self.flaws.is_empty() {
            write!(f, "  no flaws")
        } else {
            writeln!(f, "  flaws:")?;
            for flaw in &self.flaws {
                writeln!(f, "    {flaw}")?;
            }
            Ok(())
        }
    }
}
