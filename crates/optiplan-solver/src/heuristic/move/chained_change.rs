//! ChainedChangeMove - reconnects one entity of a chained variable.
//!
//! Moving entity `e` behind `to` takes three reconnections:
//!
//! ```text
//! before:  old_prev -> e -> t        to -> y
//! after:   old_prev -> t             to -> e -> y
//! ```
//!
//! The entity trailing `e` is reconnected to `e`'s old predecessor, and the
//! entity trailing `to` is reconnected to `e`. The trailing entities are read
//! from the inverse shadow before anything changes.

use std::fmt;

use optiplan_core::domain::ChainedVariableAccessor;
use optiplan_core::{ChainValue, EntityRef, OptiplanError, PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use smallvec::{smallvec, SmallVec};

use super::{value_hash, BoxedMove, Move, MoveEntities};

/// Moves a single entity to a new position in the chains.
///
/// `to_value` of `None` unassigns the entity, closing the gap it leaves;
/// the undo of an insertion is such an unassignment.
pub struct ChainedChangeMove<S> {
    entity: EntityRef,
    variable: &'static str,
    accessor: ChainedVariableAccessor<S>,
    to_value: Option<ChainValue>,
}

impl<S> Clone for ChainedChangeMove<S> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity,
            variable: self.variable,
            accessor: self.accessor,
            to_value: self.to_value,
        }
    }
}

impl<S> fmt::Debug for ChainedChangeMove<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedChangeMove")
            .field("entity", &self.entity)
            .field("variable", &self.variable)
            .field("to_value", &self.to_value)
            .finish()
    }
}

impl<S> ChainedChangeMove<S> {
    pub fn new(
        entity: EntityRef,
        variable: &'static str,
        accessor: ChainedVariableAccessor<S>,
        to_value: Option<ChainValue>,
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

    pub fn to_value(&self) -> Option<ChainValue> {
        self.to_value
    }

    fn previous(&self, solution: &S, entity: usize) -> Option<ChainValue> {
        (self.accessor.previous.get)(solution, entity)
    }

    fn validate(&self, solution: &S) -> std::result::Result<(), String> {
        let own = ChainValue::Entity(self.entity.entity_index);
        let current = self.previous(solution, self.entity.entity_index);
        if current == self.to_value {
            return Err("the entity is already there".to_string());
        }
        match self.to_value {
            Some(value) if value == own => Err("an entity cannot trail itself".to_string()),
            Some(ChainValue::Entity(target)) if self.previous(solution, target).is_none() => {
                Err(format!("entity {} is not in a chain", target))
            }
            Some(ChainValue::Anchor(anchor)) if anchor >= (self.accessor.anchor_count)(solution) => {
                Err(format!("anchor {} does not exist", anchor))
            }
            _ => Ok(()),
        }
    }

    fn set_previous(
        &self,
        score_director: &mut dyn ScoreDirector<S>,
        entity: usize,
        value: Option<ChainValue>,
    ) -> Result<()>
    where
        S: PlanningSolution,
    {
        let entity_ref = EntityRef::new(self.entity.descriptor_index, entity);
        score_director.before_variable_changed(entity_ref, self.variable)?;
        (self.accessor.previous.set)(score_director.working_solution_mut(), entity, value);
        score_director.after_variable_changed(entity_ref, self.variable)
    }
}

impl<S: PlanningSolution> Move<S> for ChainedChangeMove<S> {
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        score_director.is_movable(self.entity)
            && self.validate(score_director.working_solution()).is_ok()
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        let solution = score_director.working_solution();
        self.validate(solution)
            .map_err(|reason| OptiplanError::MoveNotDoable(format!("{:?}: {}", self, reason)))?;

        let index = self.entity.entity_index;
        let old_previous = self.previous(solution, index);
        let old_trailing = (self.accessor.next)(solution, ChainValue::Entity(index));
        let new_trailing = self
            .to_value
            .and_then(|value| (self.accessor.next)(solution, value))
            .filter(|&trailing| trailing != index);

        if let Some(trailing) = old_trailing {
            self.set_previous(score_director, trailing, old_previous)?;
        }
        self.set_previous(score_director, index, self.to_value)?;
        if let Some(trailing) = new_trailing {
            self.set_previous(score_director, trailing, Some(ChainValue::Entity(index)))?;
        }
        score_director.trigger_variable_listeners()
    }

    fn create_undo_move(&self, score_director: &dyn ScoreDirector<S>) -> BoxedMove<S> {
        let old = self.previous(score_director.working_solution(), self.entity.entity_index);
        Box::new(ChainedChangeMove::new(self.entity, self.variable, self.accessor, old))
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
