//! Mission input/output: the mission XML format, and DOT/GEXF dumps of
//! solved networks.

mod export;
mod reader;
mod writer;
pub(crate) mod xml;

pub use export::write_dot;
pub use export::write_gexf;
pub use export::write_solution_xml;
pub use reader::MissionReader;
pub use writer::MissionWriter;
