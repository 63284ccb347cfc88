use crate::solvers::csp::DomainId;
use crate::solvers::csp::Space;

/// The read-only view selectors use to inspect the current domains.
pub struct SelectionContext<'a> {
    space: &'a Space,
}

impl<'a> SelectionContext<'a> {
    pub fn new(space: &'a Space) -> SelectionContext<'a> {
        SelectionContext { space }
    }

    pub fn lower_bound(&self, variable: DomainId) -> i32 {
        self.space.lower_bound(variable)
    }

    pub fn upper_bound(&self, variable: DomainId) -> i32 {
        self.space.upper_bound(variable)
    }

    pub fn domain_size(&self, variable: DomainId) -> i64 {
        self.space.domain(variable).size()
    }

    pub fn is_fixed(&self, variable: DomainId) -> bool {
        self.space.is_fixed(variable)
    }
}
