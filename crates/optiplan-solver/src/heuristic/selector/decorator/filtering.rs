//! Filtering move selector decorator.

use std::fmt;

use optiplan_core::PlanningSolution;
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::{BoxedMove, Move};
use crate::heuristic::selector::typed_move_selector::MoveSelector;
use crate::scope::SolverRng;

/// Yields only the inner selector's moves accepted by the filter.
pub struct FilteringMoveSelector<Inner, F> {
    inner: Inner,
    filter: F,
}

impl<Inner: fmt::Debug, F> fmt::Debug for FilteringMoveSelector<Inner, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteringMoveSelector")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<Inner, F> FilteringMoveSelector<Inner, F> {
    pub fn new(inner: Inner, filter: F) -> Self {
        Self { inner, filter }
    }
}

impl<S, Inner, F> MoveSelector<S> for FilteringMoveSelector<Inner, F>
where
    S: PlanningSolution,
    Inner: MoveSelector<S>,
    F: Fn(&dyn ScoreDirector<S>, &dyn Move<S>) -> bool + Send,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        Box::new(
            self.inner
                .iter(score_director)
                .filter(move |m| (self.filter)(score_director, m.as_ref())),
        )
    }

    /// Upper bound; the filter is not applied.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.inner.size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        self.inner.is_never_ending()
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.inner.phase_started(score_director, rng)
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.inner.step_started(score_director, rng)
    }

    fn phase_ended(&mut self) {
        self.inner.phase_ended()
    }
}
