//! CompositeMove - applies several moves in sequence.

use std::fmt;

use optiplan_core::{PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use smallvec::SmallVec;

use super::{BoxedMove, Move, MoveEntities};

/// Applies its children in order and undoes them in reverse order.
///
/// A child that is not doable once its predecessors have been applied is
/// skipped. The composite is doable if any child is doable on the current
/// state.
pub struct CompositeMove<S: PlanningSolution> {
    moves: Vec<BoxedMove<S>>,
}

impl<S: PlanningSolution> CompositeMove<S> {
    pub fn new(moves: Vec<BoxedMove<S>>) -> Self {
        Self { moves }
    }

    pub fn pair(first: BoxedMove<S>, second: BoxedMove<S>) -> Self {
        Self::new(vec![first, second])
    }

    pub fn moves(&self) -> &[BoxedMove<S>] {
        &self.moves
    }
}

impl<S: PlanningSolution> Clone for CompositeMove<S> {
    fn clone(&self) -> Self {
        Self {
            moves: self.moves.clone(),
        }
    }
}

impl<S: PlanningSolution> fmt::Debug for CompositeMove<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.moves.iter()).finish()
    }
}

impl<S: PlanningSolution> Move<S> for CompositeMove<S> {
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        self.moves.iter().any(|m| m.is_doable(score_director))
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        self.do_move_with_undo(score_director).map(|_| ())
    }

    /// Undo of each child taken on the current state, in reverse order.
    ///
    /// Exact only when the children touch disjoint variables; phases use
    /// [`do_move_with_undo`](Move::do_move_with_undo) instead.
    fn create_undo_move(&self, score_director: &dyn ScoreDirector<S>) -> BoxedMove<S> {
        let undos = self
            .moves
            .iter()
            .rev()
            .map(|m| m.create_undo_move(score_director))
            .collect();
        Box::new(CompositeMove::new(undos))
    }

    fn do_move_with_undo(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<BoxedMove<S>> {
        let mut undos = Vec::with_capacity(self.moves.len());
        for m in &self.moves {
            if m.is_doable(score_director) {
                undos.push(m.do_move_with_undo(score_director)?);
            }
        }
        undos.reverse();
        Ok(Box::new(CompositeMove::new(undos)))
    }

    fn planning_entities(&self) -> MoveEntities {
        let mut entities = MoveEntities::new();
        for entity in self.moves.iter().flat_map(|m| m.planning_entities()) {
            if !entities.contains(&entity) {
                entities.push(entity);
            }
        }
        entities
    }

    fn planning_value_hashes(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        self.moves
            .iter()
            .flat_map(|m| m.planning_value_hashes(score_director))
            .collect()
    }

    fn box_clone(&self) -> BoxedMove<S> {
        Box::new(self.clone())
    }
}
