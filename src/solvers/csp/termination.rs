use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// Decides when the search should give up. Polled once per search node
/// and before every propagation pass.
pub trait TerminationCondition {
    fn should_stop(&mut self) -> bool;
}

/// Never stops the search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Stops the search once the wall-clock budget is spent.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    deadline: Instant,
}

impl TimeBudget {
    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            deadline: Instant::now() + budget,
        }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// An advisory cancellation flag that can be shared with another thread.
///
/// Cancelling makes the current solve come back empty-handed; it leaves
/// no persistent state behind.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl TerminationCondition for CancellationToken {
    fn should_stop(&mut self) -> bool {
        self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_observable_through_clones() {
        let token = CancellationToken::new();
        let mut observer = token.clone();
        assert!(!observer.should_stop());
        token.cancel();
        assert!(observer.should_stop());
    }

    #[test]
    fn elapsed_budget_stops() {
        let mut budget = TimeBudget::starting_now(Duration::from_secs(0));
        assert!(budget.should_stop());
    }
}
