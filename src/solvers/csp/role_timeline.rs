use std::fmt;

use crate::mission::Role;
use crate::symbols::LocationId;
use crate::temporal::point_algebra::TimePointId;

/// One stop of a role timeline.
pub type SpaceTimeKey = (LocationId, TimePointId);

/// The realized route of one role: the ordered space-time tuples the role
/// occupies, as recovered from its timeline variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTimeline {
    role: Role,
    waypoints: Vec<SpaceTimeKey>,
}

impl RoleTimeline {
    pub fn new(role: Role, waypoints: Vec<SpaceTimeKey>) -> RoleTimeline {
        RoleTimeline { role, waypoints }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn waypoints(&self) -> &[SpaceTimeKey] {
        &self.waypoints
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first(&self) -> Option<SpaceTimeKey> {
        self.waypoints.first().copied()
    }

    pub fn last(&self) -> Option<SpaceTimeKey> {
        self.waypoints.last().copied()
    }

    /// Consecutive waypoint pairs.
    pub fn segments(&self) -> impl Iterator<Item = (SpaceTimeKey, SpaceTimeKey)> + '_ {
        self.waypoints.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// The segments that change location: the transport demand (for an
    /// immobile role) or supply (for a mobile one).
    pub fn movements(&self) -> Vec<(SpaceTimeKey, SpaceTimeKey)> {
        self.segments()
            .filter(|((from_location, _), (to_location, _))| from_location != to_location)
            .collect()
    }
}

impl fmt::Display for RoleTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.role)?;
        for (location, timepoint) in &self.waypoints {
            write!(f, " (l{},t{})", location.0, timepoint.0)?;
        }
        Ok(())
    }
}
