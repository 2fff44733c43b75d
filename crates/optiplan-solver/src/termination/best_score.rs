//! Score-based termination conditions.
//!
//! Both require a fully initialized best solution: a partial assignment with
//! a good score is not a result worth stopping at.

use std::fmt::Debug;

use optiplan_core::{PlanningSolution, Score};

use super::Termination;
use crate::scope::ScopeSnapshot;

/// Terminates when the best score reaches or exceeds a target.
///
/// # Example
///
/// ```
/// use optiplan_core::SimpleScore;
/// use optiplan_solver::termination::BestScoreTermination;
///
/// let term = BestScoreTermination::new(SimpleScore::of(0));
/// ```
#[derive(Debug, Clone)]
pub struct BestScoreTermination<Sc: Score> {
    target_score: Sc,
}

impl<Sc: Score> BestScoreTermination<Sc> {
    pub fn new(target_score: Sc) -> Self {
        Self { target_score }
    }

    pub fn target_score(&self) -> Sc {
        self.target_score
    }
}

impl<S, Sc> Termination<S> for BestScoreTermination<Sc>
where
    S: PlanningSolution<Score = Sc>,
    Sc: Score,
{
    fn is_terminated(&self, snapshot: &ScopeSnapshot<Sc>) -> bool {
        snapshot.best_initialized
            && snapshot
                .best_score
                .is_some_and(|score| score >= self.target_score)
    }
}

/// Terminates when the best score becomes feasible.
#[derive(Debug, Clone, Default)]
pub struct BestScoreFeasibleTermination;

impl BestScoreFeasibleTermination {
    pub fn new() -> Self {
        Self
    }
}

impl<S: PlanningSolution> Termination<S> for BestScoreFeasibleTermination {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        snapshot.best_initialized && snapshot.best_score.is_some_and(|s| s.is_feasible())
    }
}
