//! ChangeMove - assigns a value to a planning variable.
//!
//! The most fundamental move type: it takes a value and assigns it to a basic
//! planning variable of one entity. The undo move assigns the old value back.

use std::fmt::{self, Debug};
use std::hash::Hash;

use optiplan_core::domain::VariableAccessor;
use optiplan_core::{EntityRef, PlanningSolution, Result};
use optiplan_scoring::{change_variable, ScoreDirector};
use smallvec::{smallvec, SmallVec};

use super::{value_hash, BoxedMove, Move, MoveEntities};

/// A move that assigns a value to an entity's variable.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `V` - The variable value type
pub struct ChangeMove<S, V> {
    entity: EntityRef,
    variable: &'static str,
    accessor: VariableAccessor<S, V>,
    to_value: Option<V>,
}

impl<S, V: Clone> Clone for ChangeMove<S, V> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity,
            variable: self.variable,
            accessor: self.accessor,
            to_value: self.to_value.clone(),
        }
    }
}

impl<S, V: Debug> Debug for ChangeMove<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeMove")
            .field("entity", &self.entity)
            .field("variable", &self.variable)
            .field("to_value", &self.to_value)
            .finish()
    }
}

impl<S, V> ChangeMove<S, V> {
    /// `to_value` of `None` unassigns the variable.
    pub fn new(
        entity: EntityRef,
        variable: &'static str,
        accessor: VariableAccessor<S, V>,
        to_value: Option<V>,
    ) -> Self {
        Self {
            entity,
            variable,
            accessor,
            to_value,
        }
    }

    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    pub fn to_value(&self) -> Option<&V> {
        self.to_value.as_ref()
    }
}

impl<S, V> Move<S> for ChangeMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Debug + Send + Sync + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        if !score_director.is_movable(self.entity) {
            return false;
        }
        let current = (self.accessor.get)(score_director.working_solution(), self.entity.entity_index);
        current != self.to_value
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        let set = self.accessor.set;
        let index = self.entity.entity_index;
        let value = self.to_value.clone();
        change_variable(score_director, self.entity, self.variable, |s: &mut S| {
            set(s, index, value)
        })?;
        score_director.trigger_variable_listeners()
    }

    fn create_undo_move(&self, score_director: &dyn ScoreDirector<S>) -> BoxedMove<S> {
        let old = (self.accessor.get)(score_director.working_solution(), self.entity.entity_index);
        Box::new(ChangeMove::new(self.entity, self.variable, self.accessor, old))
    }

    fn planning_entities(&self) -> MoveEntities {
        smallvec![self.entity]
    }

    fn planning_value_hashes(&self, _score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        smallvec![value_hash(&self.to_value)]
    }

    fn box_clone(&self) -> BoxedMove<S> {
        Box::new(self.clone())
    }
}
