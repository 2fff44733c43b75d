//! SwapMove - exchanges the values of two entities.

use std::fmt::{self, Debug};
use std::hash::Hash;

use optiplan_core::domain::VariableAccessor;
use optiplan_core::{EntityRef, PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use smallvec::{smallvec, SmallVec};

use super::{value_hash, BoxedMove, Move, MoveEntities};

/// Swaps the values of one basic variable between two entities of the same
/// descriptor. A swap is its own undo.
pub struct SwapMove<S, V> {
    left: EntityRef,
    right: EntityRef,
    variable: &'static str,
    accessor: VariableAccessor<S, V>,
}

impl<S, V> Clone for SwapMove<S, V> {
    fn clone(&self) -> Self {
        Self {
            left: self.left,
            right: self.right,
            variable: self.variable,
            accessor: self.accessor,
        }
    }
}

impl<S, V> Debug for SwapMove<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapMove")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("variable", &self.variable)
            .finish()
    }
}

impl<S, V> SwapMove<S, V> {
    pub fn new(
        left: EntityRef,
        right: EntityRef,
        variable: &'static str,
        accessor: VariableAccessor<S, V>,
    ) -> Self {
        Self {
            left,
            right,
            variable,
            accessor,
        }
    }

    pub fn left(&self) -> EntityRef {
        self.left
    }

    pub fn right(&self) -> EntityRef {
        self.right
    }
}

impl<S, V> Move<S> for SwapMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Debug + Send + Sync + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        if self.left == self.right
            || !score_director.is_movable(self.left)
            || !score_director.is_movable(self.right)
        {
            return false;
        }
        let solution = score_director.working_solution();
        (self.accessor.get)(solution, self.left.entity_index)
            != (self.accessor.get)(solution, self.right.entity_index)
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        let solution = score_director.working_solution();
        let left_value = (self.accessor.get)(solution, self.left.entity_index);
        let right_value = (self.accessor.get)(solution, self.right.entity_index);

        score_director.before_variable_changed(self.left, self.variable)?;
        score_director.before_variable_changed(self.right, self.variable)?;
        let solution = score_director.working_solution_mut();
        (self.accessor.set)(solution, self.left.entity_index, right_value);
        (self.accessor.set)(solution, self.right.entity_index, left_value);
        score_director.after_variable_changed(self.left, self.variable)?;
        score_director.after_variable_changed(self.right, self.variable)?;
        score_director.trigger_variable_listeners()
    }

    fn create_undo_move(&self, _score_director: &dyn ScoreDirector<S>) -> BoxedMove<S> {
        Box::new(SwapMove::new(self.right, self.left, self.variable, self.accessor))
    }

    fn planning_entities(&self) -> MoveEntities {
        smallvec![self.left, self.right]
    }

    fn planning_value_hashes(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        let solution = score_director.working_solution();
        smallvec![
            value_hash(&(self.accessor.get)(solution, self.left.entity_index)),
            value_hash(&(self.accessor.get)(solution, self.right.entity_index))
        ]
    }

    fn box_clone(&self) -> BoxedMove<S> {
        Box::new(self.clone())
    }
}
