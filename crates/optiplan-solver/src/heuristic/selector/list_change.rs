//! List change move selector for element relocation.
//!
//! Generates `ListChangeMove`s that relocate assigned elements within or
//! between the lists of movable owners. As a placement source it inserts an
//! unassigned element at every position of every movable owner.
//!
//! # Complexity
//!
//! For n owners with average list length m the selector yields O(n² · m²)
//! moves. Use with a forager that quits early on large instances.

use std::fmt;

use optiplan_core::domain::ListVariableAccessor;
use optiplan_core::{EntityRef, PlanningSolution, Result, SolutionDescriptor};
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::{BoxedMove, ListChangeMove, ListPosition};

use super::typed_move_selector::{MoveSelector, PlacementMoves};

pub struct ListChangeMoveSelector<S> {
    owner_descriptor: usize,
    element_descriptor: usize,
    variable: &'static str,
    accessor: ListVariableAccessor<S>,
}

impl<S> fmt::Debug for ListChangeMoveSelector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListChangeMoveSelector")
            .field("owner_descriptor", &self.owner_descriptor)
            .field("element_descriptor", &self.element_descriptor)
            .field("variable", &self.variable)
            .finish()
    }
}

impl<S: PlanningSolution> ListChangeMoveSelector<S> {
    pub fn new(
        owner_descriptor: usize,
        element_descriptor: usize,
        variable: &'static str,
        accessor: ListVariableAccessor<S>,
    ) -> Self {
        Self {
            owner_descriptor,
            element_descriptor,
            variable,
            accessor,
        }
    }

    pub fn from_descriptor(
        descriptor: &SolutionDescriptor<S>,
        owner_descriptor: usize,
        element_descriptor: usize,
        variable: &'static str,
    ) -> Result<Self> {
        Ok(Self::new(
            owner_descriptor,
            element_descriptor,
            variable,
            descriptor.list_accessor(owner_descriptor, variable)?,
        ))
    }

    /// Movable owners, in arena order.
    fn owners(&self, score_director: &dyn ScoreDirector<S>) -> Vec<usize> {
        let count = score_director
            .solution_descriptor()
            .entity_descriptor(self.owner_descriptor)
            .map_or(0, |d| d.entity_count(score_director.working_solution()));
        (0..count)
            .filter(|&owner| {
                score_director.is_movable(EntityRef::new(self.owner_descriptor, owner))
            })
            .collect()
    }

    fn list_move(
        &self,
        element: usize,
        source: Option<ListPosition>,
        destination: ListPosition,
    ) -> BoxedMove<S> {
        Box::new(ListChangeMove::new(
            self.owner_descriptor,
            self.variable,
            self.accessor,
            element,
            source,
            Some(destination),
        ))
    }
}

impl<S: PlanningSolution> MoveSelector<S> for ListChangeMoveSelector<S> {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        let solution = score_director.working_solution();
        let owners = self.owners(score_director);
        let accessor = self.accessor;

        let mut moves = Vec::new();
        for &source_owner in &owners {
            let source_len = (accessor.len)(solution, source_owner);
            for source_position in 0..source_len {
                let element = (accessor.element)(solution, source_owner, source_position);
                let source = ListPosition::new(source_owner, source_position);
                for &destination_owner in &owners {
                    let mut destination_len = (accessor.len)(solution, destination_owner);
                    if destination_owner == source_owner {
                        destination_len -= 1;
                    }
                    for destination_position in 0..=destination_len {
                        let destination = ListPosition::new(destination_owner, destination_position);
                        if destination != source {
                            moves.push(self.list_move(element, Some(source), destination));
                        }
                    }
                }
            }
        }
        Box::new(moves.into_iter())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        let solution = score_director.working_solution();
        let owners = self.owners(score_director);
        let assigned: usize = owners.iter().map(|&o| (self.accessor.len)(solution, o)).sum();
        assigned * (assigned + owners.len())
    }
}

impl<S: PlanningSolution> PlacementMoves<S> for ListChangeMoveSelector<S> {
    fn is_initialized(&self, score_director: &dyn ScoreDirector<S>, entity: EntityRef) -> bool {
        let solution = score_director.working_solution();
        let owner_count = score_director
            .solution_descriptor()
            .entity_descriptor(self.owner_descriptor)
            .map_or(0, |d| d.entity_count(solution));
        (0..owner_count).any(|owner| {
            (0..(self.accessor.len)(solution, owner))
                .any(|position| (self.accessor.element)(solution, owner, position) == entity.entity_index)
        })
    }

    /// Insertions of the element at every position; the element's own
    /// descriptor is the one the placer iterates.
    fn placement_moves(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> Vec<BoxedMove<S>> {
        debug_assert_eq!(entity.descriptor_index, self.element_descriptor);
        let solution = score_director.working_solution();
        self.owners(score_director)
            .into_iter()
            .flat_map(|owner| {
                (0..=(self.accessor.len)(solution, owner))
                    .map(move |position| ListPosition::new(owner, position))
            })
            .map(|destination| self.list_move(entity.entity_index, None, destination))
            .collect()
    }
}
