use std::rc::Rc;

use crate::solvers::csp::DomainId;
use crate::solvers::csp::EmptyDomain;
use crate::solvers::csp::PropagationContext;
use crate::solvers::csp::PropagationStatus;
use crate::solvers::csp::Propagator;

/// Enforces that the boolean adjacency matrix of a role timeline forms a
/// single simple directed path (or stays empty).
///
/// The cheap laws (forward-in-time zeroing, row/column sums, at most one
/// outgoing edge per timestep) are posted separately at timeline
/// materialization. This propagator adds what those laws cannot express:
/// * every timestep between the earliest and the latest committed edge
///   must keep at least one open outgoing edge, which is committed as
///   soon as it is the only candidate left,
/// * committed edges must chain: the edge departing at the arrival
///   timestep of another committed edge has to depart from its target
///   node,
/// * once the matrix is ground the committed edges must form one
///   connected, strictly forward-in-time path.
#[derive(Debug)]
pub struct IsPath {
    /// Edge activation variables, row-major: `(i, j)` at `i * nodes + j`
    /// where a node `(location l, timestep t)` has index `t * fluents + l`.
    variables: Vec<DomainId>,
    fluents: usize,
    timepoints: usize,
}

impl IsPath {
    pub fn new(variables: Vec<DomainId>, fluents: usize, timepoints: usize) -> Rc<IsPath> {
        debug_assert_eq!(variables.len(), (fluents * timepoints).pow(2));
        Rc::new(IsPath {
            variables,
            fluents,
            timepoints,
        })
    }

    fn nodes(&self) -> usize {
        self.fluents * self.timepoints
    }

    fn edge(&self, from: usize, to: usize) -> DomainId {
        self.variables[from * self.nodes() + to]
    }

    fn timestep(&self, node: usize) -> usize {
        node / self.fluents
    }

    /// All committed edges, ordered by departure timestep.
    fn committed_edges(&self, context: &PropagationContext<'_>) -> Vec<(usize, usize)> {
        let nodes = self.nodes();
        let mut ones = Vec::new();
        for from in 0..nodes {
            for to in 0..nodes {
                if context.lower_bound(self.edge(from, to)) >= 1 {
                    ones.push((from, to));
                }
            }
        }
        ones.sort_by_key(|&(from, _)| self.timestep(from));
        ones
    }

    fn check_degrees(
        &self,
        ones: &[(usize, usize)],
    ) -> Result<(Vec<usize>, Vec<usize>), EmptyDomain> {
        let nodes = self.nodes();
        let mut out_degree = vec![0usize; nodes];
        let mut in_degree = vec![0usize; nodes];
        for &(from, to) in ones {
            out_degree[from] += 1;
            in_degree[to] += 1;
            if out_degree[from] > 1 || in_degree[to] > 1 {
                return Err(EmptyDomain);
            }
        }
        Ok((out_degree, in_degree))
    }

    /// Every timestep within the committed span needs an outgoing edge;
    /// commit it when only one candidate remains.
    fn cover_span(
        &self,
        context: &mut PropagationContext<'_>,
        ones: &[(usize, usize)],
    ) -> PropagationStatus {
        let nodes = self.nodes();
        let span_start = self.timestep(ones.first().expect("nonempty").0);
        let span_end = self.timestep(ones.last().expect("nonempty").0);

        for timestep in span_start..=span_end {
            let mut open = Vec::new();
            let mut committed = 0usize;
            for fluent in 0..self.fluents {
                let from = timestep * self.fluents + fluent;
                for to in 0..nodes {
                    let variable = self.edge(from, to);
                    if context.lower_bound(variable) >= 1 {
                        committed += 1;
                    } else if context.upper_bound(variable) >= 1 {
                        open.push(variable);
                    }
                }
            }
            if committed > 1 {
                return Err(EmptyDomain);
            }
            if committed == 0 {
                match open.len() {
                    0 => return Err(EmptyDomain),
                    1 => context.set_lower_bound(open[0], 1)?,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Committed edges must chain at their arrival timesteps, and no edge
    /// may depart strictly inside the hop of another.
    fn check_chaining(&self, ones: &[(usize, usize)]) -> PropagationStatus {
        for &(from, to) in ones {
            let departure = self.timestep(from);
            let arrival = self.timestep(to);
            for &(other_from, other_to) in ones {
                let other_departure = self.timestep(other_from);
                if other_departure > departure && other_departure < arrival {
                    return Err(EmptyDomain);
                }
                if other_departure == arrival && other_from != to {
                    return Err(EmptyDomain);
                }
                let _ = other_to;
            }
        }
        Ok(())
    }

    fn validate_ground(
        &self,
        ones: &[(usize, usize)],
        out_degree: &[usize],
        in_degree: &[usize],
    ) -> PropagationStatus {
        let sources: Vec<usize> = (0..self.nodes())
            .filter(|&n| out_degree[n] == 1 && in_degree[n] == 0)
            .collect();
        let sinks: Vec<usize> = (0..self.nodes())
            .filter(|&n| in_degree[n] == 1 && out_degree[n] == 0)
            .collect();
        if sources.len() != 1 || sinks.len() != 1 {
            return Err(EmptyDomain);
        }

        // Follow the unique successor chain from the source; it must use
        // every committed edge and move strictly forward in time.
        let mut visited = 0usize;
        let mut current = sources[0];
        while let Some(&(from, to)) = ones.iter().find(|&&(from, _)| from == current) {
            if self.timestep(to) <= self.timestep(from) {
                return Err(EmptyDomain);
            }
            visited += 1;
            current = to;
        }
        if visited != ones.len() || current != sinks[0] {
            return Err(EmptyDomain);
        }
        Ok(())
    }
}

impl Propagator for IsPath {
    fn name(&self) -> &'static str {
        "IsPath"
    }

    fn propagate(&self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let ones = self.committed_edges(context);
        let _ = self.check_degrees(&ones)?;

        if !ones.is_empty() {
            self.cover_span(context, &ones)?;
            self.check_chaining(&ones)?;
        }

        if self.variables.iter().all(|&v| context.is_fixed(v)) {
            // Bounds may have moved since the edge list was collected.
            let ones = self.committed_edges(context);
            if !ones.is_empty() {
                let (out_degree, in_degree) = self.check_degrees(&ones)?;
                self.validate_ground(&ones, &out_degree, &in_degree)?;
            }
        }
        Ok(())
    }
}
