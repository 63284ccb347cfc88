//! Transshipment feasibility: validates that immobile payloads can be
//! ferried along their timelines by mobile carriers, and reports flaws
//! when they cannot.

mod flaw;
mod min_cost_flow;

pub use flaw::ConstraintViolation;
pub use flaw::Flaw;
pub use min_cost_flow::MinCostFlow;
pub use min_cost_flow::TransshipmentStatus;
