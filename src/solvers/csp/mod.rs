//! A clone-on-branch finite-domain constraint solver and the
//! transport-network model built on top of it.
//!
//! The engine keeps bounds domains over integer variables in a
//! [`Space`]; propagators run to fixpoint in a deterministic order and a
//! depth-first search clones the space at every decision. This is the
//! custom trail-free scheme the planner needs: spaces are plain
//! structures of integer arrays and cloning one is cheap.

pub mod branching;
mod domain;
pub mod propagators;
mod role_timeline;
mod search;
mod space;
mod termination;
mod transport_network;

pub use domain::IntDomain;
pub use role_timeline::RoleTimeline;
pub use role_timeline::SpaceTimeKey;
pub use search::Decision;
pub use search::DepthFirstSearch;
pub use search::SearchOutcome;
pub use search::SearchSpace;
pub use space::DomainId;
pub use space::EmptyDomain;
pub use space::PropagationContext;
pub use space::PropagationStatus;
pub use space::Propagator;
pub use space::Space;
pub use termination::CancellationToken;
pub use termination::Indefinite;
pub use termination::TerminationCondition;
pub use termination::TimeBudget;
pub use transport_network::CspSolution;
pub use transport_network::TransportNetwork;
pub use transport_network::TransportProblem;

#[cfg(test)]
pub(crate) mod test_helper;
