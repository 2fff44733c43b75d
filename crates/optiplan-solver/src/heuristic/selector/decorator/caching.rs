//! Caching move selector decorator.

use std::fmt;

use optiplan_config::CacheType;
use optiplan_core::PlanningSolution;
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::BoxedMove;
use crate::heuristic::selector::typed_move_selector::MoveSelector;
use crate::scope::SolverRng;

/// Materializes the inner selector's moves once per phase or once per step
/// and yields clones of the cached moves.
///
/// With [`CacheType::JustInTime`] the decorator is transparent.
pub struct CachingMoveSelector<S: PlanningSolution, Inner> {
    inner: Inner,
    cache_type: CacheType,
    cache: Option<Vec<BoxedMove<S>>>,
}

impl<S: PlanningSolution, Inner: fmt::Debug> fmt::Debug for CachingMoveSelector<S, Inner> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingMoveSelector")
            .field("inner", &self.inner)
            .field("cache_type", &self.cache_type)
            .field("cached", &self.cache.as_ref().map(Vec::len))
            .finish()
    }
}

impl<S: PlanningSolution, Inner: MoveSelector<S>> CachingMoveSelector<S, Inner> {
    pub fn new(inner: Inner, cache_type: CacheType) -> Self {
        Self {
            inner,
            cache_type,
            cache: None,
        }
    }

    pub fn cache_type(&self) -> CacheType {
        self.cache_type
    }

    fn fill(&mut self, score_director: &dyn ScoreDirector<S>) {
        self.cache = Some(self.inner.iter(score_director).collect());
    }
}

impl<S: PlanningSolution, Inner: MoveSelector<S>> MoveSelector<S> for CachingMoveSelector<S, Inner> {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        match &self.cache {
            Some(moves) => Box::new(moves.iter().cloned()),
            None => self.inner.iter(score_director),
        }
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        match &self.cache {
            Some(moves) => moves.len(),
            None => self.inner.size(score_director),
        }
    }

    fn is_never_ending(&self) -> bool {
        self.inner.is_never_ending()
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.inner.phase_started(score_director, rng);
        if self.cache_type == CacheType::Phase {
            self.fill(score_director);
        }
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.inner.step_started(score_director, rng);
        if self.cache_type == CacheType::Step {
            self.fill(score_director);
        }
    }

    fn phase_ended(&mut self) {
        self.cache = None;
        self.inner.phase_ended();
    }
}
