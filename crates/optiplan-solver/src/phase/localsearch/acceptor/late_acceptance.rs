//! Late acceptance acceptor.

use std::fmt::Debug;

use optiplan_core::PlanningSolution;

use super::{Acceptor, MoveCandidate, StepOutcome};
use crate::scope::SolverRng;

/// Late acceptance acceptor - accepts moves that improve on a historical score.
///
/// Maintains a circular buffer of the last step scores and accepts a move
/// that is at least as good as the score from `late_acceptance_size` steps
/// ago, or at least as good as the last step score.
///
/// # Example
///
/// ```
/// use optiplan_solver::phase::localsearch::LateAcceptanceAcceptor;
/// use optiplan_test::NQueensSolution;
///
/// let acceptor = LateAcceptanceAcceptor::<NQueensSolution>::new(400);
/// assert_eq!(acceptor.late_acceptance_size(), 400);
/// ```
pub struct LateAcceptanceAcceptor<S: PlanningSolution> {
    late_acceptance_size: usize,
    /// Circular buffer of historical scores.
    score_history: Vec<Option<S::Score>>,
    /// Slot of the oldest score, overwritten at the end of the next step.
    current_index: usize,
}

impl<S: PlanningSolution> Debug for LateAcceptanceAcceptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LateAcceptanceAcceptor")
            .field("late_acceptance_size", &self.late_acceptance_size)
            .field("current_index", &self.current_index)
            .finish()
    }
}

impl<S: PlanningSolution> Clone for LateAcceptanceAcceptor<S> {
    fn clone(&self) -> Self {
        Self {
            late_acceptance_size: self.late_acceptance_size,
            score_history: self.score_history.clone(),
            current_index: self.current_index,
        }
    }
}

impl<S: PlanningSolution> LateAcceptanceAcceptor<S> {
    /// Creates a new late acceptance acceptor.
    ///
    /// A size of 0 is treated as 1.
    pub fn new(late_acceptance_size: usize) -> Self {
        let late_acceptance_size = late_acceptance_size.max(1);
        Self {
            late_acceptance_size,
            score_history: vec![None; late_acceptance_size],
            current_index: 0,
        }
    }

    pub fn late_acceptance_size(&self) -> usize {
        self.late_acceptance_size
    }
}

impl<S: PlanningSolution> Acceptor<S> for LateAcceptanceAcceptor<S> {
    fn acceptance_weight(
        &mut self,
        candidate: &MoveCandidate<'_, S::Score>,
        _rng: &mut SolverRng,
    ) -> f64 {
        let late_accepted = self.score_history[self.current_index]
            .map_or(true, |late| candidate.move_score >= late);
        if late_accepted || candidate.move_score >= candidate.last_step_score {
            1.0
        } else {
            0.0
        }
    }

    fn phase_started(&mut self, starting_score: &S::Score) {
        self.score_history.fill(Some(*starting_score));
        self.current_index = 0;
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, S::Score>) {
        self.score_history[self.current_index] = Some(outcome.step_score);
        self.current_index = (self.current_index + 1) % self.late_acceptance_size;
    }

    fn phase_ended(&mut self) {
        self.score_history.fill(None);
        self.current_index = 0;
    }
}
