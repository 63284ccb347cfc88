use crate::solvers::csp::branching::SelectionContext;
use crate::solvers::csp::Decision;
use crate::solvers::csp::DomainId;

/// Turns a selected variable into a two-way [`Decision`].
pub trait ValueSelector {
    fn select_value(&self, context: &SelectionContext<'_>, variable: DomainId) -> Decision;
}

/// Splits the domain in half and tries the lower half first.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainSplitMin;

impl ValueSelector for InDomainSplitMin {
    fn select_value(&self, context: &SelectionContext<'_>, variable: DomainId) -> Decision {
        let lower = context.lower_bound(variable);
        let upper = context.upper_bound(variable);
        debug_assert!(lower < upper, "only unfixed variables are branched on");
        let bound = lower + (upper - lower) / 2;
        Decision::SplitAt { variable, bound }
    }
}

/// Tries the smallest value of the domain first.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMin;

impl ValueSelector for InDomainMin {
    fn select_value(&self, context: &SelectionContext<'_>, variable: DomainId) -> Decision {
        Decision::AssignMin {
            variable,
            value: context.lower_bound(variable),
        }
    }
}
