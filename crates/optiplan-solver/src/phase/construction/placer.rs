//! Entity placers for construction heuristic
//!
//! Placers enumerate the entities that need values assigned and
//! generate candidate moves for each entity.

use std::collections::VecDeque;
use std::fmt;

use optiplan_core::{EntityRef, PlanningSolution};
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::BoxedMove;
use crate::heuristic::selector::{EntitySelector, PlacementMoves};
use crate::scope::SolverRng;

/// An entity that needs a value assigned, along with the candidate moves
/// to assign it.
pub struct Placement<S: PlanningSolution> {
    pub entity: EntityRef,
    pub moves: Vec<BoxedMove<S>>,
}

impl<S: PlanningSolution> Placement<S> {
    pub fn new(entity: EntityRef, moves: Vec<BoxedMove<S>>) -> Self {
        Self { entity, moves }
    }

    /// Returns true if there are no candidate moves.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Takes ownership of the move at `index`.
    pub fn take_move(&mut self, index: usize) -> Option<BoxedMove<S>> {
        (index < self.moves.len()).then(|| self.moves.swap_remove(index))
    }
}

impl<S: PlanningSolution> fmt::Debug for Placement<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placement")
            .field("entity", &self.entity)
            .field("move_count", &self.moves.len())
            .finish()
    }
}

/// Places the uninitialized entities one at a time, in selector order.
///
/// The queue is filled when the phase starts. Entities that became
/// initialized in the meantime are skipped when their turn comes.
pub struct QueuedEntityPlacer<S: PlanningSolution> {
    entity_selector: Box<dyn EntitySelector<S>>,
    move_source: Box<dyn PlacementMoves<S>>,
    queue: VecDeque<EntityRef>,
}

impl<S: PlanningSolution> fmt::Debug for QueuedEntityPlacer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedEntityPlacer")
            .field("entity_selector", &self.entity_selector)
            .field("move_source", &self.move_source)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl<S: PlanningSolution> QueuedEntityPlacer<S> {
    pub fn new(
        entity_selector: Box<dyn EntitySelector<S>>,
        move_source: Box<dyn PlacementMoves<S>>,
    ) -> Self {
        Self {
            entity_selector,
            move_source,
            queue: VecDeque::new(),
        }
    }

    /// Queues every selected entity that still needs a placement.
    pub fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.entity_selector.phase_started(score_director, rng);
        let move_source = &self.move_source;
        self.queue = self
            .entity_selector
            .iter(score_director)
            .filter(|&entity| !move_source.is_initialized(score_director, entity))
            .collect();
    }

    pub fn phase_ended(&mut self) {
        self.entity_selector.phase_ended();
        self.queue.clear();
    }

    /// Entities still waiting for a placement.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// The next uninitialized entity with its doable placement moves.
    ///
    /// The returned placement may be empty if no candidate is doable.
    pub fn next_placement(&mut self, score_director: &dyn ScoreDirector<S>) -> Option<Placement<S>> {
        while let Some(entity) = self.queue.pop_front() {
            if self.move_source.is_initialized(score_director, entity) {
                continue;
            }
            let moves = self
                .move_source
                .placement_moves(score_director, entity)
                .into_iter()
                .filter(|m| m.is_doable(score_director))
                .collect();
            return Some(Placement::new(entity, moves));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::selector::{ChangeMoveSelector, FromSolutionEntitySelector};
    use optiplan_test::nqueens::{boxed_nqueens_director, nqueens_descriptor};
    use optiplan_test::{NQueensSolution, Queen};
    use rand::SeedableRng;

    fn placer() -> QueuedEntityPlacer<NQueensSolution> {
        let moves =
            ChangeMoveSelector::<NQueensSolution, i64, _, _>::from_descriptor(&nqueens_descriptor(), 0, "row")
                .unwrap();
        QueuedEntityPlacer::new(Box::new(FromSolutionEntitySelector::new(0)), Box::new(moves))
    }

    #[test]
    fn test_queues_only_uninitialized_movable_entities() {
        let solution = NQueensSolution::new(vec![
            Queen::assigned(0, 0, 1),
            Queen::unassigned(1, 1),
            Queen::unassigned(2, 2).pinned(),
            Queen::unassigned(3, 3),
        ]);
        let director = boxed_nqueens_director(solution);
        let mut placer = placer();
        placer.phase_started(&*director, &mut SolverRng::seed_from_u64(0));

        assert_eq!(placer.remaining(), 2);
        let first = placer.next_placement(&*director).unwrap();
        assert_eq!(first.entity, EntityRef::new(0, 1));
        assert_eq!(first.moves.len(), 4);
        let second = placer.next_placement(&*director).unwrap();
        assert_eq!(second.entity, EntityRef::new(0, 3));
        assert!(placer.next_placement(&*director).is_none());
    }

    #[test]
    fn test_skips_entities_initialized_after_queueing() {
        let mut director = boxed_nqueens_director(NQueensSolution::unassigned(2));
        let mut placer = placer();
        placer.phase_started(&*director, &mut SolverRng::seed_from_u64(0));

        director.working_solution_mut().queens[0].row = Some(0);
        let placement = placer.next_placement(&*director).unwrap();
        assert_eq!(placement.entity, EntityRef::new(0, 1));
    }

    #[test]
    fn test_take_move() {
        let director = boxed_nqueens_director(NQueensSolution::unassigned(3));
        let mut placer = placer();
        placer.phase_started(&*director, &mut SolverRng::seed_from_u64(0));
        let mut placement = placer.next_placement(&*director).unwrap();
        assert!(!placement.is_empty());
        assert!(placement.take_move(2).is_some());
        assert_eq!(placement.moves.len(), 2);
        assert!(placement.take_move(5).is_none());
    }
}
