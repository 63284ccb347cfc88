use std::fmt;

use crate::symbols::LocationId;

/// How a cardinality figure is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalityRestriction {
    Min,
    Max,
    Exact,
}

impl fmt::Display for CardinalityRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let txt = match self {
            CardinalityRestriction::Min => "min",
            CardinalityRestriction::Max => "max",
            CardinalityRestriction::Exact => "exact",
        };
        write!(f, "{txt}")
    }
}

/// A typed object variable: the value side of a temporal assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectVariable {
    /// "`cardinality` agents (`restriction`-wise) at `location`".
    LocationCardinality {
        location: LocationId,
        cardinality: u32,
        restriction: CardinalityRestriction,
    },
}

impl ObjectVariable {
    pub fn location_cardinality(
        location: LocationId,
        cardinality: u32,
        restriction: CardinalityRestriction,
    ) -> ObjectVariable {
        ObjectVariable::LocationCardinality {
            location,
            cardinality,
            restriction,
        }
    }

    pub fn location(&self) -> LocationId {
        match self {
            ObjectVariable::LocationCardinality { location, .. } => *location,
        }
    }
}

impl fmt::Display for ObjectVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectVariable::LocationCardinality {
                location,
                cardinality,
                restriction,
            } => write!(
                f,
                "location-cardinality(l{}, {restriction} {cardinality})",
                location.0
            ),
        }
    }
}
