//! A small harness for exercising propagators in isolation.

use std::rc::Rc;

use crate::solvers::csp::DomainId;
use crate::solvers::csp::Propagator;
use crate::solvers::csp::Space;

pub(crate) struct TestSolver {
    space: Space,
}

impl TestSolver {
    pub(crate) fn new() -> TestSolver {
        TestSolver {
            space: Space::new(),
        }
    }

    pub(crate) fn new_variable(&mut self, lower: i32, upper: i32) -> DomainId {
        self.space.new_variable(lower, upper)
    }

    pub(crate) fn post(&mut self, propagator: Rc<dyn Propagator>) {
        self.space.post(propagator);
    }

    /// Runs propagation to fixpoint; true when the space survived.
    pub(crate) fn propagate(&mut self) -> bool {
        self.space.propagate()
    }

    pub(crate) fn fix(&mut self, variable: DomainId, value: i32) {
        self.space.branch_lower_bound(variable, value);
        self.space.branch_upper_bound(variable, value);
    }

    pub(crate) fn bounds(&self, variable: DomainId) -> (i32, i32) {
        (
            self.space.lower_bound(variable),
            self.space.upper_bound(variable),
        )
    }

    pub(crate) fn assert_bounds(&self, variable: DomainId, lower: i32, upper: i32) {
        assert_eq!(
            self.bounds(variable),
            (lower, upper),
            "unexpected bounds for {variable:?}"
        );
    }
}
