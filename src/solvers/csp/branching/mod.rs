//! Variable and value selection for the search.

mod selection_context;
mod value_selection;
mod variable_selection;

pub use selection_context::SelectionContext;
pub use value_selection::InDomainMin;
pub use value_selection::InDomainSplitMin;
pub use value_selection::ValueSelector;
pub use variable_selection::InputOrder;
pub use variable_selection::LargestDomain;
pub use variable_selection::VariableSelector;
