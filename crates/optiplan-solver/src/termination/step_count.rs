//! Step count termination.

use optiplan_core::PlanningSolution;

use super::Termination;
use crate::scope::ScopeSnapshot;

/// Terminates after a step count.
///
/// Counts solver steps on the solver, phase steps on a phase.
///
/// ```
/// use optiplan_solver::termination::StepCountTermination;
///
/// let term = StepCountTermination::new(1000);
/// ```
#[derive(Debug, Clone)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<S: PlanningSolution> Termination<S> for StepCountTermination {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        snapshot.step_count >= self.limit
    }

    fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
        if self.limit == 0 {
            return Some(1.0);
        }
        Some((snapshot.step_count as f64 / self.limit as f64).min(1.0))
    }
}
