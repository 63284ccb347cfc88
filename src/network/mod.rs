//! The temporally expanded network: the `{locations × timepoints}` grid
//! with role annotations on tuples and edges.

mod role_info;
mod space_time;

pub use role_info::RoleInfo;
pub use role_info::ASSIGNED_TAG;
pub use role_info::REQUIRED_TAG;
pub use space_time::RoleInfoEdge;
pub use space_time::RoleInfoTuple;
pub use space_time::SpaceTimeNetwork;
