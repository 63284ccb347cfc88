use std::fmt;

/// A single closed interval `[lower, upper]` over the extended reals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Bounds {
        Bounds { lower, upper }
    }

    pub fn is_empty(&self) -> bool {
        self.lower > self.upper
    }

    pub fn intersect(&self, other: &Bounds) -> Bounds {
        Bounds {
            lower: self.lower.max(other.lower),
            upper: self.upper.min(other.upper),
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lower, self.upper)
    }
}

/// A quantitative constraint on a directed edge `src -> tgt`: the union of
/// closed intervals of admissible values for `tgt - src`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntervalConstraint {
    intervals: Vec<Bounds>,
}

impl IntervalConstraint {
    pub fn new(intervals: Vec<Bounds>) -> IntervalConstraint {
        IntervalConstraint { intervals }
    }

    pub fn singleton(lower: f64, upper: f64) -> IntervalConstraint {
        IntervalConstraint {
            intervals: vec![Bounds::new(lower, upper)],
        }
    }

    pub fn intervals(&self) -> &[Bounds] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.iter().all(Bounds::is_empty)
    }

    /// The smallest lower bound over the union.
    pub fn lower_bound(&self) -> f64 {
        self.intervals
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.lower)
            .fold(f64::INFINITY, f64::min)
    }

    /// The greatest upper bound over the union.
    pub fn upper_bound(&self) -> f64 {
        self.intervals
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.upper)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// The convex hull `[lower_bound, upper_bound]`; the simple-temporal
    /// relaxation of this constraint.
    pub fn hull(&self) -> Bounds {
        Bounds::new(self.lower_bound(), self.upper_bound())
    }

    /// Clips every member interval against `bounds`, dropping members that
    /// become empty. Returns true when anything changed.
    pub fn tighten(&mut self, bounds: Bounds) -> bool {
        let mut changed = false;
        self.intervals.retain_mut(|interval| {
            let clipped = interval.intersect(&bounds);
            if clipped != *interval {
                changed = true;
                *interval = clipped;
            }
            !clipped.is_empty()
        });
        changed
    }

    /// Merges another constraint on the same edge by intersecting the
    /// unions pairwise.
    pub fn merge(&mut self, other: &IntervalConstraint) {
        let mut result = Vec::new();
        for a in &self.intervals {
            for b in &other.intervals {
                let c = a.intersect(b);
                if !c.is_empty() {
                    result.push(c);
                }
            }
        }
        self.intervals = result;
    }
}

impl fmt::Display for IntervalConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, bounds) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{bounds}")?;
        }
        write!(f, "}}")
    }
}
