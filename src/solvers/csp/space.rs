use std::fmt;
use std::rc::Rc;

use crate::basic_types::KeyedVec;
use crate::basic_types::StorageKey;
use crate::solvers::csp::IntDomain;

/// Index of an integer variable within a [`Space`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub u32);

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        DomainId(index as u32)
    }
}

/// Raised by a propagator when a domain wipes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyDomain;

pub type PropagationStatus = Result<(), EmptyDomain>;

/// A deduction rule over the variables of a space.
///
/// Propagators are stateless with respect to the search: they are shared
/// behind [`Rc`] between a space and its clones and re-derive whatever
/// they need from the current domains on every call.
pub trait Propagator {
    fn name(&self) -> &'static str;

    /// Tightens domains as far as the constraint allows, or reports a
    /// wipe-out.
    fn propagate(&self, context: &mut PropagationContext<'_>) -> PropagationStatus;
}

/// The mutable view of the domains a propagator works on.
pub struct PropagationContext<'a> {
    domains: &'a mut KeyedVec<DomainId, IntDomain>,
    changed: bool,
}

impl<'a> PropagationContext<'a> {
    fn new(domains: &'a mut KeyedVec<DomainId, IntDomain>) -> PropagationContext<'a> {
        PropagationContext {
            domains,
            changed: false,
        }
    }

    pub fn lower_bound(&self, variable: DomainId) -> i32 {
        self.domains[variable].lower
    }

    pub fn upper_bound(&self, variable: DomainId) -> i32 {
        self.domains[variable].upper
    }

    pub fn is_fixed(&self, variable: DomainId) -> bool {
        self.domains[variable].is_fixed()
    }

    /// The value of a fixed variable.
    pub fn value(&self, variable: DomainId) -> Option<i32> {
        let domain = self.domains[variable];
        domain.is_fixed().then_some(domain.lower)
    }

    pub fn set_lower_bound(&mut self, variable: DomainId, bound: i32) -> PropagationStatus {
        if bound > self.domains[variable].lower {
            self.domains[variable].lower = bound;
            self.changed = true;
            if self.domains[variable].is_empty() {
                return Err(EmptyDomain);
            }
        }
        Ok(())
    }

    pub fn set_upper_bound(&mut self, variable: DomainId, bound: i32) -> PropagationStatus {
        if bound < self.domains[variable].upper {
            self.domains[variable].upper = bound;
            self.changed = true;
            if self.domains[variable].is_empty() {
                return Err(EmptyDomain);
            }
        }
        Ok(())
    }

    pub fn fix(&mut self, variable: DomainId, value: i32) -> PropagationStatus {
        self.set_lower_bound(variable, value)?;
        self.set_upper_bound(variable, value)
    }
}

/// A constraint space: bounds domains plus the propagators posted over
/// them. Cloning the space is the branching operation.
#[derive(Clone)]
pub struct Space {
    domains: KeyedVec<DomainId, IntDomain>,
    propagators: Vec<Rc<dyn Propagator>>,
    failed: bool,
}

impl Space {
    pub fn new() -> Space {
        Space {
            domains: KeyedVec::default(),
            propagators: Vec::new(),
            failed: false,
        }
    }

    pub fn new_variable(&mut self, lower: i32, upper: i32) -> DomainId {
        if lower > upper {
            self.failed = true;
        }
        self.domains.push(IntDomain::new(lower, upper))
    }

    /// Posts a propagator. It first runs on the next
    /// [`propagate`](Self::propagate) call.
    pub fn post(&mut self, propagator: Rc<dyn Propagator>) {
        self.propagators.push(propagator);
    }

    pub fn lower_bound(&self, variable: DomainId) -> i32 {
        self.domains[variable].lower
    }

    pub fn upper_bound(&self, variable: DomainId) -> i32 {
        self.domains[variable].upper
    }

    pub fn domain(&self, variable: DomainId) -> IntDomain {
        self.domains[variable]
    }

    pub fn is_fixed(&self, variable: DomainId) -> bool {
        self.domains[variable].is_fixed()
    }

    /// The value of a fixed variable.
    pub fn value(&self, variable: DomainId) -> Option<i32> {
        let domain = self.domains[variable];
        domain.is_fixed().then_some(domain.lower)
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    /// Tightens a bound from a search decision.
    pub fn branch_lower_bound(&mut self, variable: DomainId, bound: i32) {
        let mut context = PropagationContext::new(&mut self.domains);
        if context.set_lower_bound(variable, bound).is_err() {
            self.failed = true;
        }
    }

    /// Tightens a bound from a search decision.
    pub fn branch_upper_bound(&mut self, variable: DomainId, bound: i32) {
        let mut context = PropagationContext::new(&mut self.domains);
        if context.set_upper_bound(variable, bound).is_err() {
            self.failed = true;
        }
    }

    /// Runs every propagator, in posting order, until no domain changes.
    /// Returns false when the space has failed.
    pub fn propagate(&mut self) -> bool {
        if self.failed {
            return false;
        }
        loop {
            let mut context = PropagationContext::new(&mut self.domains);
            for propagator in &self.propagators {
                if propagator.propagate(&mut context).is_err() {
                    self.failed = true;
                    return false;
                }
            }
            if !context.changed {
                return true;
            }
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Space::new()
    }
}

impl fmt::Debug for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Space")
            .field("variables", &self.domains.len())
            .field("propagators", &self.propagators.len())
            .field("failed", &self.failed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branching_tightens_bounds() {
        let mut space = Space::new();
        let x = space.new_variable(0, 10);
        space.branch_upper_bound(x, 5);
        assert_eq!(space.upper_bound(x), 5);
        assert!(!space.is_failed());

        space.branch_lower_bound(x, 6);
        assert!(space.is_failed());
        assert!(!space.propagate());
    }

    #[test]
    fn clones_are_independent() {
        let mut space = Space::new();
        let x = space.new_variable(0, 10);

        let mut clone = space.clone();
        clone.branch_upper_bound(x, 3);

        assert_eq!(clone.upper_bound(x), 3);
        assert_eq!(space.upper_bound(x), 10);
    }
}
