use std::rc::Rc;

use crate::solvers::csp::DomainId;
use crate::solvers::csp::EmptyDomain;
use crate::solvers::csp::PropagationContext;
use crate::solvers::csp::PropagationStatus;
use crate::solvers::csp::Propagator;

/// Above this row count the propagator stops enumerating live rows on
/// every call and degrades to a membership check once all variables are
/// fixed.
const ENUMERATION_THRESHOLD: usize = 4096;

/// An extensional constraint: the variable vector must equal one of the
/// given rows.
#[derive(Debug)]
pub struct TableConstraint {
    variables: Vec<DomainId>,
    rows: Vec<Vec<i32>>,
}

impl TableConstraint {
    pub fn new(variables: Vec<DomainId>, rows: Vec<Vec<i32>>) -> Rc<TableConstraint> {
        debug_assert!(rows.iter().all(|row| row.len() == variables.len()));
        Rc::new(TableConstraint { variables, rows })
    }

    fn row_is_live(&self, context: &PropagationContext<'_>, row: &[i32]) -> bool {
        self.variables
            .iter()
            .zip(row)
            .all(|(&variable, &value)| {
                context.lower_bound(variable) <= value && value <= context.upper_bound(variable)
            })
    }
}

impl Propagator for TableConstraint {
    fn name(&self) -> &'static str {
        "Table"
    }

    fn propagate(&self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        if self.rows.len() > ENUMERATION_THRESHOLD {
            // Membership-only mode: wait until the tuple is ground.
            if self.variables.iter().any(|&v| !context.is_fixed(v)) {
                return Ok(());
            }
            let assigned: Vec<i32> = self
                .variables
                .iter()
                .map(|&v| context.lower_bound(v))
                .collect();
            return if self.rows.contains(&assigned) {
                Ok(())
            } else {
                Err(EmptyDomain)
            };
        }

        let live: Vec<&Vec<i32>> = self
            .rows
            .iter()
            .filter(|row| self.row_is_live(context, row))
            .collect();
        if live.is_empty() {
            return Err(EmptyDomain);
        }

        // Bounds consistency per column over the surviving rows.
        for (column, &variable) in self.variables.iter().enumerate() {
            let mut min = i32::MAX;
            let mut max = i32::MIN;
            for row in &live {
                min = min.min(row[column]);
                max = max.max(row[column]);
            }
            context.set_lower_bound(variable, min)?;
            context.set_upper_bound(variable, max)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::csp::test_helper::TestSolver;

    #[test]
    fn columns_are_tightened_to_the_live_rows() {
        let mut solver = TestSolver::new();
        let x = solver.new_variable(0, 3);
        let y = solver.new_variable(0, 3);
        solver.post(TableConstraint::new(
            vec![x, y],
            vec![vec![1, 2], vec![2, 2], vec![3, 0]],
        ));

        assert!(solver.propagate());
        solver.assert_bounds(x, 1, 3);

        solver.fix(y, 2);
        assert!(solver.propagate());
        solver.assert_bounds(x, 1, 2);
    }

    #[test]
    fn no_live_row_fails() {
        let mut solver = TestSolver::new();
        let x = solver.new_variable(0, 0);
        let y = solver.new_variable(0, 0);
        solver.post(TableConstraint::new(vec![x, y], vec![vec![1, 1]]));

        assert!(!solver.propagate());
    }

    #[test]
    fn an_empty_table_is_unsatisfiable() {
        let mut solver = TestSolver::new();
        let x = solver.new_variable(0, 1);
        solver.post(TableConstraint::new(vec![x], Vec::new()));

        assert!(!solver.propagate());
    }
}
