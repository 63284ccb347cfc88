//! # Caravan
//! Caravan is a mission planner for heterogeneous multi-robot teams. Given a
//! pool of agent models, a set of spatio-temporally anchored resource
//! requirements and qualitative relations between timepoints, it computes a
//! *transport network*: an assignment of concrete agents (roles) to
//! space-time tuples together with per-role routes, such that every
//! requirement is met within the available resources.
//!
//! The planner is built from three engines:
//! * a [temporal constraint network](crate::temporal) over qualitative or
//!   quantitative timepoints, with path consistency and minimal-network
//!   computation,
//! * a [constraint-satisfaction solver](crate::solvers::csp) which jointly
//!   assigns agent-model counts, role activations and role timelines over a
//!   space-time grid,
//! * a [transshipment layer](crate::solvers::transshipment) which validates
//!   that immobile payloads can actually be ferried by mobile carriers, and
//!   reports flaws when they cannot.
//!
//! # Example
//! ```no_run
//! use caravan_solver::io::MissionReader;
//! use caravan_solver::mission::CapabilityRegistry;
//! use caravan_solver::solvers::{PlanningOutcome, TransportNetworkPlanner};
//!
//! let mut mission = MissionReader::from_file("mission.xml").unwrap();
//! let registry = CapabilityRegistry::default();
//! mission.prepare(&registry).unwrap();
//!
//! match TransportNetworkPlanner::new(&registry).solve(&mission).unwrap() {
//!     PlanningOutcome::Solved(solution) => println!("{}", solution),
//!     PlanningOutcome::NoSolution => println!("mission is infeasible"),
//! }
//! ```

pub mod basic_types;
pub mod io;
pub mod mission;
pub mod network;
pub mod solvers;
pub mod symbols;
pub mod temporal;

pub use basic_types::PlanningError;
pub use basic_types::PlanningResult;
