use crate::solvers::csp::branching::SelectionContext;
use crate::solvers::csp::DomainId;

/// Picks the next variable to branch on, or `None` when every variable
/// under consideration is fixed.
pub trait VariableSelector {
    fn select_variable(&self, context: &SelectionContext<'_>) -> Option<DomainId>;
}

/// Selects the unfixed variable with the largest domain; ties break
/// towards the earliest variable in the list.
#[derive(Debug, Clone)]
pub struct LargestDomain {
    variables: Vec<DomainId>,
}

impl LargestDomain {
    pub fn new(variables: Vec<DomainId>) -> LargestDomain {
        LargestDomain { variables }
    }
}

impl VariableSelector for LargestDomain {
    fn select_variable(&self, context: &SelectionContext<'_>) -> Option<DomainId> {
        let mut best: Option<(DomainId, i64)> = None;
        for &variable in &self.variables {
            if context.is_fixed(variable) {
                continue;
            }
            let size = context.domain_size(variable);
            match best {
                Some((_, best_size)) if best_size >= size => {}
                _ => best = Some((variable, size)),
            }
        }
        best.map(|(variable, _)| variable)
    }
}

/// Selects the first unfixed variable in the list.
#[derive(Debug, Clone)]
pub struct InputOrder {
    variables: Vec<DomainId>,
}

impl InputOrder {
    pub fn new(variables: Vec<DomainId>) -> InputOrder {
        InputOrder { variables }
    }
}

impl VariableSelector for InputOrder {
    fn select_variable(&self, context: &SelectionContext<'_>) -> Option<DomainId> {
        self.variables
            .iter()
            .copied()
            .find(|&variable| !context.is_fixed(variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::csp::Space;

    #[test]
    fn largest_prefers_the_widest_domain() {
        let mut space = Space::new();
        let x = space.new_variable(0, 10);
        let y = space.new_variable(5, 20);

        let selector = LargestDomain::new(vec![x, y]);
        let context = SelectionContext::new(&space);
        assert_eq!(selector.select_variable(&context), Some(y));
    }

    #[test]
    fn fixed_variables_are_skipped() {
        let mut space = Space::new();
        let x = space.new_variable(3, 3);
        let y = space.new_variable(7, 7);

        let selector = LargestDomain::new(vec![x, y]);
        let context = SelectionContext::new(&space);
        assert_eq!(selector.select_variable(&context), None);

        let selector = InputOrder::new(vec![x, y]);
        assert_eq!(selector.select_variable(&context), None);
    }

    #[test]
    fn ties_break_in_order() {
        let mut space = Space::new();
        let x = space.new_variable(0, 1);
        let y = space.new_variable(0, 1);

        let selector = LargestDomain::new(vec![x, y]);
        let context = SelectionContext::new(&space);
        assert_eq!(selector.select_variable(&context), Some(x));
    }
}
