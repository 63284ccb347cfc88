//! The mission model: agent models and pools, roles, the
//! organization-model oracle and the mission aggregate.

mod mission;
mod model_pool;
mod organization;
mod role;

pub use mission::Mission;
pub use mission::RecordedConstraint;
pub use model_pool::ModelIri;
pub use model_pool::ModelPool;
pub use organization::CapabilityRegistry;
pub use organization::ModelCapability;
pub use organization::OrganizationOracle;
pub use role::Role;
