//! Shuffling move selector decorator.
//!
//! Shuffles moves from an inner selector using Fisher-Yates.

use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use optiplan_core::PlanningSolution;
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::BoxedMove;
use crate::heuristic::selector::typed_move_selector::MoveSelector;
use crate::scope::SolverRng;

/// Yields the inner selector's moves in random order, without replacement.
///
/// A fresh seed is drawn from the solver's random generator at every step, so
/// a run with a fixed random seed shuffles identically, while repeated
/// iterations within one step see the same order.
pub struct ShufflingMoveSelector<Inner> {
    inner: Inner,
    seed: u64,
}

impl<Inner: fmt::Debug> fmt::Debug for ShufflingMoveSelector<Inner> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShufflingMoveSelector")
            .field("inner", &self.inner)
            .field("seed", &self.seed)
            .finish()
    }
}

impl<Inner> ShufflingMoveSelector<Inner> {
    pub fn new(inner: Inner) -> Self {
        Self { inner, seed: 0 }
    }
}

impl<S, Inner> MoveSelector<S> for ShufflingMoveSelector<Inner>
where
    S: PlanningSolution,
    Inner: MoveSelector<S>,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        let mut moves: Vec<BoxedMove<S>> = self.inner.iter(score_director).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        moves.shuffle(&mut rng);
        Box::new(moves.into_iter())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.inner.size(score_director)
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.inner.phase_started(score_director, rng);
        self.seed = rng.random();
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.inner.step_started(score_director, rng);
        self.seed = rng.random();
    }

    fn phase_ended(&mut self) {
        self.inner.phase_ended()
    }
}
