use std::rc::Rc;

use crate::solvers::csp::DomainId;
use crate::solvers::csp::EmptyDomain;
use crate::solvers::csp::PropagationContext;
use crate::solvers::csp::PropagationStatus;
use crate::solvers::csp::Propagator;

/// Lexicographic ordering `left <=_lex right` between two equal-length
/// variable vectors.
///
/// Used as the lex-leader symmetry breaker: the role-activation columns of
/// interchangeable roles (same agent model) are ordered so that only the
/// canonical representative of each activation pattern survives.
#[derive(Debug)]
pub struct LexLeq {
    left: Vec<DomainId>,
    right: Vec<DomainId>,
}

impl LexLeq {
    pub fn new(left: Vec<DomainId>, right: Vec<DomainId>) -> Rc<LexLeq> {
        debug_assert_eq!(left.len(), right.len());
        Rc::new(LexLeq { left, right })
    }
}

impl Propagator for LexLeq {
    fn name(&self) -> &'static str {
        "LexLeq"
    }

    fn propagate(&self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        // Walk the fixed, equal prefix. At the first position that is not
        // decided-equal, `left[i] <= right[i]` is implied; if that position
        // settles as strictly less the rest is unconstrained.
        for (&l, &r) in self.left.iter().zip(&self.right) {
            let (l_fixed, r_fixed) = (context.is_fixed(l), context.is_fixed(r));
            if l_fixed && r_fixed {
                let (lv, rv) = (context.lower_bound(l), context.lower_bound(r));
                if lv < rv {
                    return Ok(());
                }
                if lv > rv {
                    return Err(EmptyDomain);
                }
                continue;
            }

            // Prefix equal so far: enforce l <= r at this position.
            context.set_upper_bound(l, context.upper_bound(r))?;
            context.set_lower_bound(r, context.lower_bound(l))?;

            let settled_equal = context.is_fixed(l)
                && context.is_fixed(r)
                && context.lower_bound(l) == context.lower_bound(r);
            if !settled_equal {
                return Ok(());
            }
        }
        Ok(())
    }
}
