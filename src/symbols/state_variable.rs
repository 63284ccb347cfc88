use std::fmt;

/// A state variable: a function symbol applied to a resource identifier,
/// e.g. `location-cardinality(Payload)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateVariable {
    function: String,
    resource: String,
}

impl StateVariable {
    /// The function symbol used for spatio-temporal resource requirements.
    pub const LOCATION_CARDINALITY: &'static str = "location-cardinality";

    pub fn new(function: impl Into<String>, resource: impl Into<String>) -> StateVariable {
        StateVariable {
            function: function.into(),
            resource: resource.into(),
        }
    }

    pub fn location_cardinality(resource: impl Into<String>) -> StateVariable {
        StateVariable::new(Self::LOCATION_CARDINALITY, resource)
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function, self.resource)
    }
}
