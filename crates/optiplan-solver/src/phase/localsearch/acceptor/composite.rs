//! Composite acceptor.

use std::fmt::{self, Debug};

use optiplan_core::PlanningSolution;

use super::{Acceptor, MoveCandidate, StepOutcome};
use crate::scope::SolverRng;

/// Combines acceptors by multiplying their weights.
///
/// Evaluation stops at the first part that rejects; later parts are not
/// consulted for that move.
pub struct CompositeAcceptor<S: PlanningSolution> {
    acceptors: Vec<Box<dyn Acceptor<S>>>,
}

impl<S: PlanningSolution> Debug for CompositeAcceptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAcceptor")
            .field("acceptors", &self.acceptors)
            .finish()
    }
}

impl<S: PlanningSolution> CompositeAcceptor<S> {
    pub fn new(acceptors: Vec<Box<dyn Acceptor<S>>>) -> Self {
        Self { acceptors }
    }

    pub fn len(&self) -> usize {
        self.acceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acceptors.is_empty()
    }
}

impl<S: PlanningSolution> Acceptor<S> for CompositeAcceptor<S> {
    fn acceptance_weight(
        &mut self,
        candidate: &MoveCandidate<'_, S::Score>,
        rng: &mut SolverRng,
    ) -> f64 {
        let mut weight = 1.0;
        for acceptor in &mut self.acceptors {
            weight *= acceptor.acceptance_weight(candidate, rng);
            if weight <= 0.0 {
                return 0.0;
            }
        }
        weight
    }

    fn phase_started(&mut self, starting_score: &S::Score) {
        for acceptor in &mut self.acceptors {
            acceptor.phase_started(starting_score);
        }
    }

    fn step_started(&mut self, time_gradient: f64) {
        for acceptor in &mut self.acceptors {
            acceptor.step_started(time_gradient);
        }
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, S::Score>) {
        for acceptor in &mut self.acceptors {
            acceptor.step_ended(outcome);
        }
    }

    fn phase_ended(&mut self) {
        for acceptor in &mut self.acceptors {
            acceptor.phase_ended();
        }
    }
}
