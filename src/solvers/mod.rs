//! The solving engines: requirement translation, the transport-network
//! CSP, the transshipment validation layer, and solution analysis.

pub mod analysis;
pub mod csp;
mod fluent_time_resource;
mod planner;
mod solution;
pub mod transshipment;

pub use fluent_time_resource::FluentTimeResource;
pub use planner::PlanningOutcome;
pub use planner::TransportNetworkPlanner;
pub use solution::Solution;
