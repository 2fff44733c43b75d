//! Union move selector combinator.

use std::fmt;

use optiplan_core::PlanningSolution;
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::BoxedMove;
use crate::heuristic::selector::typed_move_selector::MoveSelector;
use crate::scope::SolverRng;

/// Yields all moves of its children, one child after the other.
pub struct UnionMoveSelector<S: PlanningSolution> {
    children: Vec<Box<dyn MoveSelector<S>>>,
}

impl<S: PlanningSolution> fmt::Debug for UnionMoveSelector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionMoveSelector")
            .field("children", &self.children)
            .finish()
    }
}

impl<S: PlanningSolution> UnionMoveSelector<S> {
    pub fn new(children: Vec<Box<dyn MoveSelector<S>>>) -> Self {
        Self { children }
    }

    pub fn with_child(mut self, child: impl MoveSelector<S> + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<S: PlanningSolution> MoveSelector<S> for UnionMoveSelector<S> {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        Box::new(
            self.children
                .iter()
                .flat_map(move |child| child.iter(score_director)),
        )
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.children.iter().map(|c| c.size(score_director)).sum()
    }

    fn is_never_ending(&self) -> bool {
        self.children.iter().any(|c| c.is_never_ending())
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        for child in &mut self.children {
            child.phase_started(score_director, rng);
        }
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        for child in &mut self.children {
            child.step_started(score_director, rng);
        }
    }

    fn phase_ended(&mut self) {
        for child in &mut self.children {
            child.phase_ended();
        }
    }
}
