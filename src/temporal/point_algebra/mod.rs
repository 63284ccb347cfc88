//! The point algebra: labelled timepoints and the eight-value relation
//! lattice over the primitive relations `<`, `=`, `>`.

mod comparator;
mod constraint;
mod time_point;

pub use comparator::TimePointComparator;
pub use constraint::PointRelation;
pub use constraint::QualitativeConstraint;
pub use time_point::TimePoint;
pub use time_point::TimePointId;
pub use time_point::TimePointVariant;
