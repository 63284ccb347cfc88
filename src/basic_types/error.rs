use thiserror::Error;

pub type PlanningResult<T> = Result<T, PlanningError>;

/// The error kinds that surface to callers of the planner.
///
/// An exhausted search is *not* an error: the solvers report it through
/// their result types. Transshipment shortfalls are likewise returned as
/// structured [`Flaw`](crate::solvers::transshipment::Flaw) lists.
#[derive(Error, Debug)]
pub enum PlanningError {
    /// Malformed mission document, unknown element, unparsable number or a
    /// reference to an unknown location, service or timepoint.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The temporal constraint network admits no assignment: a qualitative
    /// relation collapsed to the empty relation, or the distance graph
    /// contains a negative cycle.
    #[error("inconsistent temporal network: {0}")]
    InconsistentNetwork(String),

    /// An organization-model query failed or returned unusable data.
    #[error("organization model: {0}")]
    OracleError(String),

    /// An internal invariant was broken; unreachable under sound inputs.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
