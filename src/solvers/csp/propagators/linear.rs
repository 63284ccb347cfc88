use std::rc::Rc;

use crate::solvers::csp::DomainId;
use crate::solvers::csp::PropagationContext;
use crate::solvers::csp::PropagationStatus;
use crate::solvers::csp::Propagator;

/// A `±1`-weighted variable occurrence in a linear constraint.
#[derive(Debug, Clone, Copy)]
pub struct LinearTerm {
    pub variable: DomainId,
    pub negated: bool,
}

impl LinearTerm {
    pub fn positive(variable: DomainId) -> LinearTerm {
        LinearTerm {
            variable,
            negated: false,
        }
    }

    pub fn negative(variable: DomainId) -> LinearTerm {
        LinearTerm {
            variable,
            negated: true,
        }
    }

    fn lower(&self, context: &PropagationContext<'_>) -> i32 {
        if self.negated {
            -context.upper_bound(self.variable)
        } else {
            context.lower_bound(self.variable)
        }
    }
}

/// Bounds propagator for `Σ ±x_i <= bound`.
///
/// Every linear constraint of the transport model reduces to this shape:
/// `Σ x <= c` directly, `Σ x >= c` by negating the terms, and equalities
/// by posting both directions.
#[derive(Debug)]
pub struct LinearLeq {
    terms: Vec<LinearTerm>,
    bound: i32,
}

impl LinearLeq {
    pub fn new(terms: Vec<LinearTerm>, bound: i32) -> Rc<LinearLeq> {
        Rc::new(LinearLeq { terms, bound })
    }

    /// `Σ x_i <= bound`.
    pub fn sum_leq(variables: &[DomainId], bound: i32) -> Rc<LinearLeq> {
        LinearLeq::new(
            variables.iter().copied().map(LinearTerm::positive).collect(),
            bound,
        )
    }

    /// `Σ x_i >= bound`.
    pub fn sum_geq(variables: &[DomainId], bound: i32) -> Rc<LinearLeq> {
        LinearLeq::new(
            variables.iter().copied().map(LinearTerm::negative).collect(),
            -bound,
        )
    }

    /// Both directions of `Σ x_i = total`.
    pub fn sum_equals_var(variables: &[DomainId], total: DomainId) -> [Rc<LinearLeq>; 2] {
        let forward = variables
            .iter()
            .copied()
            .map(LinearTerm::positive)
            .chain([LinearTerm::negative(total)])
            .collect();
        let backward = variables
            .iter()
            .copied()
            .map(LinearTerm::negative)
            .chain([LinearTerm::positive(total)])
            .collect();
        [
            LinearLeq::new(forward, 0),
            LinearLeq::new(backward, 0),
        ]
    }
}

impl Propagator for LinearLeq {
    fn name(&self) -> &'static str {
        "LinearLeq"
    }

    fn propagate(&self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let lower_sum: i64 = self
            .terms
            .iter()
            .map(|term| term.lower(context) as i64)
            .sum();
        let slack = self.bound as i64 - lower_sum;
        if slack < 0 {
            return Err(crate::solvers::csp::EmptyDomain);
        }

        for term in &self.terms {
            // Each term may exceed its own lower bound by at most `slack`.
            let headroom = (term.lower(context) as i64 + slack).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            if term.negated {
                context.set_lower_bound(term.variable, -headroom)?;
            } else {
                context.set_upper_bound(term.variable, headroom)?;
            }
        }
        Ok(())
    }
}
