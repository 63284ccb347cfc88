use log::debug;

use crate::solvers::csp::DomainId;
use crate::solvers::csp::EmptyDomain;
use crate::solvers::csp::Space;
use crate::solvers::csp::TerminationCondition;

/// A two-way search decision over one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Left branch: `variable <= bound`; right branch:
    /// `variable >= bound + 1`.
    SplitAt { variable: DomainId, bound: i32 },
    /// Left branch: `variable = value`; right branch:
    /// `variable >= value + 1`. `value` is the current lower bound.
    AssignMin { variable: DomainId, value: i32 },
}

impl Decision {
    /// Applies one side of the decision to a space.
    pub fn apply(&self, space: &mut Space, take_left: bool) {
        match *self {
            Decision::SplitAt { variable, bound } => {
                if take_left {
                    space.branch_upper_bound(variable, bound);
                } else {
                    space.branch_lower_bound(variable, bound + 1);
                }
            }
            Decision::AssignMin { variable, value } => {
                if take_left {
                    space.branch_upper_bound(variable, value);
                } else {
                    space.branch_lower_bound(variable, value + 1);
                }
            }
        }
    }
}

/// A problem-specific space the search engine can run on.
///
/// `next_decision` is only called on a propagated, unfailed space. It may
/// extend the space with fresh variables and propagators (the
/// transport model materializes role timelines this way once the earlier
/// variable blocks are ground); an extension that immediately fails is
/// reported as `Err`.
pub trait SearchSpace: Clone {
    /// Runs propagation to fixpoint; false when the space failed.
    fn propagate(&mut self) -> bool;

    /// The next decision, or `None` when the space is a solution.
    fn next_decision(&mut self) -> Result<Option<Decision>, EmptyDomain>;

    /// Applies one side of a decision.
    fn commit(&mut self, decision: &Decision, take_left: bool);
}

#[derive(Debug)]
pub enum SearchOutcome<S> {
    Solution(S),
    /// The search space is exhausted; there is no solution.
    Exhausted,
    /// The termination condition fired before the search finished.
    Unknown,
}

/// Depth-first, clone-on-branch search returning the first feasible
/// solution.
///
/// With a constant cost function branch-and-bound degenerates to exactly
/// this search, which is all the feasibility-only planner needs. The
/// exploration order is deterministic: the left branch of every decision
/// is explored first.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirstSearch;

impl DepthFirstSearch {
    pub fn first_solution<S: SearchSpace>(
        root: S,
        termination: &mut dyn TerminationCondition,
    ) -> SearchOutcome<S> {
        let mut stack: Vec<S> = vec![root];
        let mut explored: u64 = 0;

        while let Some(mut space) = stack.pop() {
            if termination.should_stop() {
                debug!("search stopped after {explored} nodes");
                return SearchOutcome::Unknown;
            }
            explored += 1;

            if !space.propagate() {
                continue;
            }
            match space.next_decision() {
                Err(EmptyDomain) => continue,
                Ok(None) => {
                    debug!("first solution after {explored} nodes");
                    return SearchOutcome::Solution(space);
                }
                Ok(Some(decision)) => {
                    let mut right = space.clone();
                    right.commit(&decision, false);
                    stack.push(right);

                    space.commit(&decision, true);
                    stack.push(space);
                }
            }
        }
        debug!("search exhausted after {explored} nodes");
        SearchOutcome::Exhausted
    }
}
