use std::fmt;

use crate::mission::Role;
use crate::solvers::csp::SpaceTimeKey;

/// A violated constraint of the flow problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A commodity has to move along this edge but no carrier capacity
    /// covers it.
    UnmetDemand {
        from: SpaceTimeKey,
        to: SpaceTimeKey,
        missing: u32,
    },
    /// The aggregated commodity flow over this edge exceeds the carrier
    /// capacity.
    ExceededCapacity {
        from: SpaceTimeKey,
        to: SpaceTimeKey,
        excess: u32,
    },
    /// The commodity's departure tuple is not visited by any carrier at
    /// all; the demand is isolated from the carrier subgraph.
    Isolated { at: SpaceTimeKey },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::UnmetDemand { from, to, missing } => write!(
                f,
                "unmet demand of {missing} on (l{},t{}) -> (l{},t{})",
                from.0 .0, from.1 .0, to.0 .0, to.1 .0
            ),
            ConstraintViolation::ExceededCapacity { from, to, excess } => write!(
                f,
                "capacity exceeded by {excess} on (l{},t{}) -> (l{},t{})",
                from.0 .0, from.1 .0, to.0 .0, to.1 .0
            ),
            ConstraintViolation::Isolated { at } => {
                write!(f, "no carrier reaches (l{},t{})", at.0 .0, at.1 .0)
            }
        }
    }
}

/// A violation wrapped with its planning context: the affected role and
/// the requirements surrounding the violating timeline position, for
/// higher-level repair.
#[derive(Debug, Clone)]
pub struct Flaw {
    pub violation: ConstraintViolation,
    pub affected_role: Role,
    /// Index of the requirement the role last served before the
    /// violation.
    pub previous_ftr: Option<usize>,
    /// Index of the requirement the role serves at the violation.
    pub current_ftr: Option<usize>,
    /// Index of the requirement the role serves next after the violation.
    pub subsequent_ftr: Option<usize>,
}

impl fmt::Display for Flaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.affected_role, self.violation)
    }
}
