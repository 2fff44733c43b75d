//! ListChangeMove - relocates an element within or between list variables.
//!
//! The source or the destination may be absent: a move without a source
//! assigns an unassigned element, a move without a destination unassigns one.
//! Positions of the destination are interpreted after the element left its
//! source.

use std::fmt;

use optiplan_core::domain::ListVariableAccessor;
use optiplan_core::{EntityRef, OptiplanError, PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use smallvec::{smallvec, SmallVec};

use super::{value_hash, BoxedMove, Move, MoveEntities};

/// A slot in the list variable of one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListPosition {
    pub owner: usize,
    pub position: usize,
}

impl ListPosition {
    pub const fn new(owner: usize, position: usize) -> Self {
        Self { owner, position }
    }
}

/// Moves `element` from `source` to `destination`.
pub struct ListChangeMove<S> {
    owner_descriptor: usize,
    variable: &'static str,
    accessor: ListVariableAccessor<S>,
    element: usize,
    source: Option<ListPosition>,
    destination: Option<ListPosition>,
}

impl<S> Clone for ListChangeMove<S> {
    fn clone(&self) -> Self {
        Self {
            owner_descriptor: self.owner_descriptor,
            variable: self.variable,
            accessor: self.accessor,
            element: self.element,
            source: self.source,
            destination: self.destination,
        }
    }
}

impl<S> fmt::Debug for ListChangeMove<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListChangeMove")
            .field("variable", &self.variable)
            .field("element", &self.element)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .finish()
    }
}

impl<S> ListChangeMove<S> {
    pub fn new(
        owner_descriptor: usize,
        variable: &'static str,
        accessor: ListVariableAccessor<S>,
        element: usize,
        source: Option<ListPosition>,
        destination: Option<ListPosition>,
    ) -> Self {
        Self {
            owner_descriptor,
            variable,
            accessor,
            element,
            source,
            destination,
        }
    }

    pub fn element(&self) -> usize {
        self.element
    }

    pub fn source(&self) -> Option<ListPosition> {
        self.source
    }

    pub fn destination(&self) -> Option<ListPosition> {
        self.destination
    }

    fn owner_ref(&self, owner: usize) -> EntityRef {
        EntityRef::new(self.owner_descriptor, owner)
    }

    fn validate(&self, solution: &S) -> std::result::Result<(), String> {
        if self.source.is_none() && self.destination.is_none() {
            return Err("neither source nor destination".to_string());
        }
        if self.source == self.destination {
            return Err("source equals destination".to_string());
        }
        if let Some(source) = self.source {
            if source.position >= (self.accessor.len)(solution, source.owner) {
                return Err(format!("no element at {:?}", source));
            }
            if (self.accessor.element)(solution, source.owner, source.position) != self.element {
                return Err(format!("element {} is not at {:?}", self.element, source));
            }
        }
        if let Some(destination) = self.destination {
            let mut len = (self.accessor.len)(solution, destination.owner);
            if self.source.is_some_and(|s| s.owner == destination.owner) {
                len -= 1;
            }
            if destination.position > len {
                return Err(format!("position {:?} is out of bounds", destination));
            }
        }
        Ok(())
    }
}

impl<S: PlanningSolution> Move<S> for ListChangeMove<S> {
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        let owners_movable = self
            .source
            .iter()
            .chain(self.destination.iter())
            .all(|p| score_director.is_movable(self.owner_ref(p.owner)));
        owners_movable && self.validate(score_director.working_solution()).is_ok()
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        self.validate(score_director.working_solution())
            .map_err(|reason| OptiplanError::MoveNotDoable(format!("{:?}: {}", self, reason)))?;

        match (self.source, self.destination) {
            (Some(source), Some(destination)) if source.owner == destination.owner => {
                let owner = self.owner_ref(source.owner);
                let from = source.position.min(destination.position);
                let to = source.position.max(destination.position) + 1;
                score_director.before_list_variable_changed(owner, self.variable, from, to)?;
                let solution = score_director.working_solution_mut();
                let element = (self.accessor.remove)(solution, source.owner, source.position);
                (self.accessor.insert)(solution, destination.owner, destination.position, element);
                score_director.after_list_variable_changed(owner, self.variable, from, to)?;
            }
            (source, destination) => {
                if let Some(source) = source {
                    let owner = self.owner_ref(source.owner);
                    let len = (self.accessor.len)(score_director.working_solution(), source.owner);
                    score_director.before_list_variable_changed(
                        owner,
                        self.variable,
                        source.position,
                        len,
                    )?;
                    (self.accessor.remove)(
                        score_director.working_solution_mut(),
                        source.owner,
                        source.position,
                    );
                    score_director.after_list_variable_changed(
                        owner,
                        self.variable,
                        source.position,
                        source.position,
                    )?;
                    if destination.is_none() {
                        score_director.list_element_unassigned(owner, self.variable, self.element)?;
                    }
                }
                if let Some(destination) = destination {
                    let owner = self.owner_ref(destination.owner);
                    score_director.before_list_variable_changed(
                        owner,
                        self.variable,
                        destination.position,
                        destination.position,
                    )?;
                    (self.accessor.insert)(
                        score_director.working_solution_mut(),
                        destination.owner,
                        destination.position,
                        self.element,
                    );
                    score_director.after_list_variable_changed(
                        owner,
                        self.variable,
                        destination.position,
                        destination.position + 1,
                    )?;
                }
            }
        }
        score_director.trigger_variable_listeners()
    }

    fn create_undo_move(&self, _score_director: &dyn ScoreDirector<S>) -> BoxedMove<S> {
        Box::new(ListChangeMove::new(
            self.owner_descriptor,
            self.variable,
            self.accessor,
            self.element,
            self.destination,
            self.source,
        ))
    }

    fn planning_entities(&self) -> MoveEntities {
        let mut entities: MoveEntities = smallvec![];
        for position in self.source.iter().chain(self.destination.iter()) {
            let owner = self.owner_ref(position.owner);
            if !entities.contains(&owner) {
                entities.push(owner);
            }
        }
        entities
    }

    fn planning_value_hashes(&self, _score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        smallvec![value_hash(&self.element)]
    }

    fn box_clone(&self) -> BoxedMove<S> {
        Box::new(self.clone())
    }
}
