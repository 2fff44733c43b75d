//! Tabu search acceptor.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::marker::PhantomData;

use optiplan_core::{EntityRef, PlanningSolution};

use super::{Acceptor, MoveCandidate, StepOutcome};
use crate::scope::SolverRng;

/// Sliding window of the keys changed by the last `tenure` steps.
#[derive(Debug, Clone)]
struct TabuList<T> {
    tenure: usize,
    steps: VecDeque<Vec<T>>,
}

impl<T: PartialEq + Clone> TabuList<T> {
    fn new(tenure: usize) -> Self {
        Self {
            tenure,
            steps: VecDeque::with_capacity(tenure),
        }
    }

    fn contains_any(&self, keys: &[T]) -> bool {
        self.steps
            .iter()
            .any(|step| keys.iter().any(|k| step.contains(k)))
    }

    fn push_step(&mut self, keys: &[T]) {
        if self.tenure == 0 {
            return;
        }
        if self.steps.len() == self.tenure {
            self.steps.pop_front();
        }
        self.steps.push_back(keys.to_vec());
    }

    fn clear(&mut self) {
        self.steps.clear();
    }
}

/// Tabu search acceptor - forbids moves that touch recently changed
/// entities or reassign recently assigned values.
///
/// Tenures are counted in steps. A step that changed nothing still ages the
/// lists. With aspiration enabled a tabu move is accepted anyway if it
/// improves the best score.
///
/// # Example
///
/// ```
/// use optiplan_solver::phase::localsearch::TabuAcceptor;
/// use optiplan_test::NQueensSolution;
///
/// let acceptor = TabuAcceptor::<NQueensSolution>::new(Some(7), None);
/// assert_eq!(acceptor.entity_tenure(), Some(7));
/// ```
pub struct TabuAcceptor<S> {
    entity_tabu: Option<TabuList<EntityRef>>,
    value_tabu: Option<TabuList<u64>>,
    aspiration_enabled: bool,
    _phantom: PhantomData<fn() -> S>,
}

impl<S> Debug for TabuAcceptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabuAcceptor")
            .field("entity_tenure", &self.entity_tenure())
            .field("value_tenure", &self.value_tenure())
            .field("aspiration_enabled", &self.aspiration_enabled)
            .finish()
    }
}

impl<S> Clone for TabuAcceptor<S> {
    fn clone(&self) -> Self {
        Self {
            entity_tabu: self.entity_tabu.clone(),
            value_tabu: self.value_tabu.clone(),
            aspiration_enabled: self.aspiration_enabled,
            _phantom: PhantomData,
        }
    }
}

impl<S> TabuAcceptor<S> {
    pub fn new(entity_tenure: Option<usize>, value_tenure: Option<usize>) -> Self {
        Self {
            entity_tabu: entity_tenure.map(TabuList::new),
            value_tabu: value_tenure.map(TabuList::new),
            aspiration_enabled: true,
            _phantom: PhantomData,
        }
    }

    pub fn with_aspiration(mut self, enabled: bool) -> Self {
        self.aspiration_enabled = enabled;
        self
    }

    pub fn entity_tenure(&self) -> Option<usize> {
        self.entity_tabu.as_ref().map(|t| t.tenure)
    }

    pub fn value_tenure(&self) -> Option<usize> {
        self.value_tabu.as_ref().map(|t| t.tenure)
    }

    fn is_tabu(&self, entities: &[EntityRef], value_hashes: &[u64]) -> bool {
        self.entity_tabu
            .as_ref()
            .is_some_and(|t| t.contains_any(entities))
            || self
                .value_tabu
                .as_ref()
                .is_some_and(|t| t.contains_any(value_hashes))
    }
}

impl<S: PlanningSolution> Acceptor<S> for TabuAcceptor<S> {
    fn acceptance_weight(
        &mut self,
        candidate: &MoveCandidate<'_, S::Score>,
        _rng: &mut SolverRng,
    ) -> f64 {
        if !self.is_tabu(candidate.entities, candidate.value_hashes) {
            return 1.0;
        }
        if self.aspiration_enabled && candidate.move_score > candidate.best_score {
            return 1.0;
        }
        0.0
    }

    fn phase_started(&mut self, _starting_score: &S::Score) {
        self.phase_ended();
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, S::Score>) {
        if let Some(tabu) = &mut self.entity_tabu {
            tabu.push_step(outcome.entities);
        }
        if let Some(tabu) = &mut self.value_tabu {
            tabu.push_step(outcome.value_hashes);
        }
    }

    fn phase_ended(&mut self) {
        if let Some(tabu) = &mut self.entity_tabu {
            tabu.clear();
        }
        if let Some(tabu) = &mut self.value_tabu {
            tabu.clear();
        }
    }
}
