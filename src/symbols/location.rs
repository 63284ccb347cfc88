use std::fmt;

use crate::basic_types::StorageKey;

/// Index of a [`Location`] within its owning mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(pub u32);

impl StorageKey for LocationId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        LocationId(index as u32)
    }
}

/// An optional spatial anchor for a location constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// A cartesian position in a local frame.
    Cartesian { x: f64, y: f64, z: f64 },
    /// A geodesic position on a sphere of the given radius.
    Geodesic {
        radius: f64,
        latitude: f64,
        longitude: f64,
    },
}

/// A named location constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    id: String,
    position: Option<Position>,
}

impl Location {
    pub fn new(id: impl Into<String>) -> Location {
        Location {
            id: id.into(),
            position: None,
        }
    }

    pub fn with_position(id: impl Into<String>, position: Position) -> Location {
        Location {
            id: id.into(),
            position: Some(position),
        }
    }

    /// The synthetic location role timelines may route through when they
    /// complete a path without a physical location change.
    pub fn transfer() -> Location {
        Location::new("transfer")
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
