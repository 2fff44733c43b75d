//! Time-based termination.

use std::time::Duration;

use optiplan_core::PlanningSolution;

use super::Termination;
use crate::scope::ScopeSnapshot;

/// Terminates after a time limit.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use optiplan_solver::termination::TimeTermination;
///
/// let term = TimeTermination::new(Duration::from_secs(30));
///
/// let term = TimeTermination::seconds(30);
/// let term = TimeTermination::millis(500);
/// ```
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl<S: PlanningSolution> Termination<S> for TimeTermination {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        snapshot.elapsed >= self.limit
    }

    fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
        if self.limit.is_zero() {
            return Some(1.0);
        }
        Some((snapshot.elapsed.as_secs_f64() / self.limit.as_secs_f64()).min(1.0))
    }
}
