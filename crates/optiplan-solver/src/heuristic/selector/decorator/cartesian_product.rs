//! Cartesian product move selector.
//!
//! Combines every move of the left selector with every move of the right
//! selector into a [`CompositeMove`]. The right selector is iterated afresh
//! for each left move, so a right selector replaying a mimic recorder of the
//! left one sees exactly the element the left move was built from.

use std::fmt;

use optiplan_core::PlanningSolution;
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::{BoxedMove, CompositeMove};
use crate::heuristic::selector::typed_move_selector::MoveSelector;
use crate::scope::SolverRng;

pub struct CartesianProductMoveSelector<L, R> {
    left: L,
    right: R,
}

impl<L: fmt::Debug, R: fmt::Debug> fmt::Debug for CartesianProductMoveSelector<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartesianProductMoveSelector")
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

impl<L, R> CartesianProductMoveSelector<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<S, L, R> MoveSelector<S> for CartesianProductMoveSelector<L, R>
where
    S: PlanningSolution,
    L: MoveSelector<S>,
    R: MoveSelector<S>,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        let right = &self.right;
        Box::new(self.left.iter(score_director).flat_map(move |left_move| {
            right.iter(score_director).map(move |right_move| {
                Box::new(CompositeMove::pair(left_move.clone(), right_move)) as BoxedMove<S>
            })
        }))
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.left.size(score_director) * self.right.size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        self.left.is_never_ending() || self.right.is_never_ending()
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.left.phase_started(score_director, rng);
        self.right.phase_started(score_director, rng);
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.left.step_started(score_director, rng);
        self.right.step_started(score_director, rng);
    }

    fn phase_ended(&mut self) {
        self.left.phase_ended();
        self.right.phase_ended();
    }
}
