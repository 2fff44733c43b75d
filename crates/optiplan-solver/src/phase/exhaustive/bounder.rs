//! Score bounder for exhaustive search pruning.
//!
//! Bounders calculate optimistic and pessimistic score bounds
//! that enable branch-and-bound pruning.

use std::fmt::Debug;

use optiplan_core::{PlanningSolution, Score};
use optiplan_scoring::ScoreDirector;

/// How a score level can move as more variables get assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTrend {
    /// Assigning more variables never raises the level.
    OnlyDown,
    /// Assigning more variables never lowers the level.
    OnlyUp,
    /// No guarantee.
    Any,
}

/// Calculates score bounds for exhaustive search pruning.
///
/// The optimistic bound of a partial assignment is at least as good as the
/// score of every complete assignment below it. The pessimistic bound is at
/// most as good as the best of them.
pub trait ScoreBounder<S: PlanningSolution>: Send + Debug {
    fn optimistic_bound(&self, score_director: &dyn ScoreDirector<S>, score: S::Score) -> S::Score;

    fn pessimistic_bound(&self, score_director: &dyn ScoreDirector<S>, score: S::Score) -> S::Score;
}

/// Bounds every level by its trend alone.
///
/// A level that only goes down keeps its current value as the optimistic
/// bound; a level that only goes up keeps it as the pessimistic bound.
/// Every other level is unbounded in that direction.
#[derive(Debug, Clone)]
pub struct TrendScoreBounder {
    trends: Vec<ScoreTrend>,
}

impl TrendScoreBounder {
    pub fn new(trends: Vec<ScoreTrend>) -> Self {
        Self { trends }
    }

    /// Every level only goes down, as for pure penalty constraints.
    pub fn only_down<Sc: Score>() -> Self {
        Self::new(vec![ScoreTrend::OnlyDown; Sc::levels_count()])
    }

    pub fn trends(&self) -> &[ScoreTrend] {
        &self.trends
    }

    fn bound<Sc: Score>(&self, score: Sc, kept: ScoreTrend, unbounded: i64) -> Sc {
        let levels: Vec<i64> = score
            .to_level_numbers()
            .into_iter()
            .enumerate()
            .map(|(i, level)| match self.trends.get(i) {
                Some(&trend) if trend == kept => level,
                _ => unbounded,
            })
            .collect();
        Sc::from_level_numbers(&levels)
    }
}

impl<S: PlanningSolution> ScoreBounder<S> for TrendScoreBounder {
    fn optimistic_bound(&self, _score_director: &dyn ScoreDirector<S>, score: S::Score) -> S::Score {
        self.bound(score, ScoreTrend::OnlyDown, i64::MAX)
    }

    fn pessimistic_bound(&self, _score_director: &dyn ScoreDirector<S>, score: S::Score) -> S::Score {
        self.bound(score, ScoreTrend::OnlyUp, i64::MIN)
    }
}
