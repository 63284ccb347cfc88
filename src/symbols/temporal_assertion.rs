use crate::basic_types::PlanningResult;
use crate::symbols::ObjectVariable;
use crate::symbols::StateVariable;
use crate::temporal::point_algebra::TimePointComparator;
use crate::temporal::point_algebra::TimePointId;

/// An assertion about the value of a state variable over time.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalAssertion {
    /// The state variable takes `value` at the instant `at`.
    Event {
        state_variable: StateVariable,
        value: ObjectVariable,
        at: TimePointId,
    },
    /// The state variable holds `value` throughout `[from, to]`.
    PersistenceCondition {
        state_variable: StateVariable,
        value: ObjectVariable,
        from: TimePointId,
        to: TimePointId,
    },
}

impl TemporalAssertion {
    pub fn state_variable(&self) -> &StateVariable {
        match self {
            TemporalAssertion::Event { state_variable, .. } => state_variable,
            TemporalAssertion::PersistenceCondition { state_variable, .. } => state_variable,
        }
    }

    pub fn value(&self) -> &ObjectVariable {
        match self {
            TemporalAssertion::Event { value, .. } => value,
            TemporalAssertion::PersistenceCondition { value, .. } => value,
        }
    }

    /// Whether both assertions assert the same value of the same state
    /// variable.
    pub fn refers_to_same_value(&self, other: &TemporalAssertion) -> bool {
        self.state_variable() == other.state_variable() && self.value() == other.value()
    }

    /// Whether the two assertions cannot interfere: they either concern
    /// different state variables, or their temporal extents are disjoint.
    pub fn disjoint_from(
        &self,
        other: &TemporalAssertion,
        comparator: &TimePointComparator<'_>,
    ) -> PlanningResult<bool> {
        if self.state_variable() != other.state_variable() {
            return Ok(true);
        }

        use TemporalAssertion::*;
        let overlapping = match (self, other) {
            (Event { at: a, .. }, Event { at: b, .. }) => comparator.equals(*a, *b),
            (Event { at, .. }, PersistenceCondition { from, to, .. })
            | (PersistenceCondition { from, to, .. }, Event { at, .. }) => {
                comparator.in_interval(*at, *from, *to)?
            }
            (
                PersistenceCondition { from, to, .. },
                PersistenceCondition {
                    from: other_from,
                    to: other_to,
                    ..
                },
            ) => comparator.has_interval_overlap(*from, *to, *other_from, *other_to)?,
        };
        Ok(!overlapping)
    }
}
