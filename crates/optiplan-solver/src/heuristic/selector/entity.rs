//! Entity selectors for iterating over planning entities

use std::fmt::Debug;

use optiplan_core::{EntityRef, PlanningSolution};
use optiplan_scoring::ScoreDirector;

use crate::scope::SolverRng;

/// Trait for selecting entities from a planning solution.
///
/// Entity selectors provide an iteration order over the entities that
/// the solver will consider for moves.
pub trait EntitySelector<S: PlanningSolution>: Send + Debug {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityRef> + 'a>;

    /// Returns the approximate number of entities.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize;

    /// Returns true if this selector may return the same entity multiple times.
    fn is_never_ending(&self) -> bool {
        false
    }

    fn phase_started(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut SolverRng) {}

    fn step_started(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut SolverRng) {}

    fn phase_ended(&mut self) {}
}

impl<S: PlanningSolution> EntitySelector<S> for Box<dyn EntitySelector<S>> {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityRef> + 'a> {
        (**self).iter(score_director)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        (**self).size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        (**self).is_never_ending()
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        (**self).phase_started(score_director, rng)
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        (**self).step_started(score_director, rng)
    }

    fn phase_ended(&mut self) {
        (**self).phase_ended()
    }
}

/// Iterates over the entities of one descriptor in arena order.
///
/// Pinned entities are skipped unless asked otherwise; moves on them would
/// never be doable.
#[derive(Debug, Clone)]
pub struct FromSolutionEntitySelector {
    descriptor_index: usize,
    skip_pinned: bool,
}

impl FromSolutionEntitySelector {
    pub fn new(descriptor_index: usize) -> Self {
        Self {
            descriptor_index,
            skip_pinned: true,
        }
    }

    pub fn with_skip_pinned(mut self, skip: bool) -> Self {
        self.skip_pinned = skip;
        self
    }

    pub fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn count<S: PlanningSolution>(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        score_director
            .solution_descriptor()
            .entity_descriptor(self.descriptor_index)
            .map_or(0, |d| d.entity_count(score_director.working_solution()))
    }
}

impl<S: PlanningSolution> EntitySelector<S> for FromSolutionEntitySelector {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityRef> + 'a> {
        let descriptor_index = self.descriptor_index;
        let skip_pinned = self.skip_pinned;
        Box::new(
            (0..self.count(score_director))
                .map(move |i| EntityRef::new(descriptor_index, i))
                .filter(move |&e| !skip_pinned || score_director.is_movable(e)),
        )
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.count(score_director)
    }
}

/// Iterates over the entities of every descriptor.
#[derive(Debug, Clone, Default)]
pub struct AllEntitiesSelector;

impl AllEntitiesSelector {
    pub fn new() -> Self {
        Self
    }
}

impl<S: PlanningSolution> EntitySelector<S> for AllEntitiesSelector {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityRef> + 'a> {
        Box::new(
            score_director
                .solution_descriptor()
                .entity_refs(score_director.working_solution())
                .into_iter(),
        )
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        score_director.entity_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiplan_test::nqueens::boxed_nqueens_director;
    use optiplan_test::NQueensSolution;

    #[test]
    fn test_from_solution_entity_selector_skips_pinned() {
        let mut solution = NQueensSolution::with_rows(&[0, 1, 2, 3]);
        solution.queens[2].pinned = true;
        let director = boxed_nqueens_director(solution);

        let selector = FromSolutionEntitySelector::new(0);
        let selected: Vec<_> = selector.iter(&*director).map(|e| e.entity_index).collect();
        assert_eq!(selected, vec![0, 1, 3]);
        assert_eq!(EntitySelector::<NQueensSolution>::size(&selector, &*director), 4);

        let all = FromSolutionEntitySelector::new(0).with_skip_pinned(false);
        assert_eq!(all.iter(&*director).count(), 4);
    }

    #[test]
    fn test_all_entities_selector() {
        let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1, 2]));
        let selector = AllEntitiesSelector::new();
        let refs: Vec<_> = selector.iter(&*director).collect();
        assert_eq!(refs, vec![EntityRef::new(0, 0), EntityRef::new(0, 1), EntityRef::new(0, 2)]);
    }
}
