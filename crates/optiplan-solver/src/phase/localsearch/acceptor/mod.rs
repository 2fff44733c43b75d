//! Acceptors for local search move acceptance.
//!
//! An acceptor weighs every evaluated move of a step. A weight of 0 rejects
//! the move, anything above accepts it. Acceptors combine through
//! [`CompositeAcceptor`], which multiplies the weights of its parts.

mod composite;
mod hill_climbing;
mod late_acceptance;
mod simulated_annealing;
mod tabu_search;

use std::fmt::Debug;

use optiplan_core::{EntityRef, PlanningSolution};

use crate::scope::SolverRng;

pub use composite::CompositeAcceptor;
pub use hill_climbing::HillClimbingAcceptor;
pub use late_acceptance::LateAcceptanceAcceptor;
pub use simulated_annealing::SimulatedAnnealingAcceptor;
pub use tabu_search::TabuAcceptor;

/// A scored move waiting for acceptance.
#[derive(Debug, Clone, Copy)]
pub struct MoveCandidate<'a, Sc> {
    pub last_step_score: Sc,
    pub move_score: Sc,
    pub best_score: Sc,
    /// Entities the move changes.
    pub entities: &'a [EntityRef],
    /// Hashes of the values the move assigns.
    pub value_hashes: &'a [u64],
}

/// The result of a finished step.
///
/// `entities` and `value_hashes` are empty if no move was accepted and the
/// working solution did not change.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome<'a, Sc> {
    pub step_score: Sc,
    pub best_score: Sc,
    pub entities: &'a [EntityRef],
    pub value_hashes: &'a [u64],
}

/// Trait for accepting or rejecting moves in local search.
///
/// Acceptors implement different strategies for escaping local optima,
/// such as hill climbing, simulated annealing, or tabu search.
pub trait Acceptor<S: PlanningSolution>: Send + Debug {
    /// Weight of the candidate; 0 rejects it.
    fn acceptance_weight(
        &mut self,
        candidate: &MoveCandidate<'_, S::Score>,
        rng: &mut SolverRng,
    ) -> f64;

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, S::Score>, rng: &mut SolverRng) -> bool {
        self.acceptance_weight(candidate, rng) > 0.0
    }

    /// Called when a phase starts.
    fn phase_started(&mut self, _starting_score: &S::Score) {}

    /// Called when a step starts with the fraction of the time limit used.
    fn step_started(&mut self, _time_gradient: f64) {}

    /// Called when a step ends, whether or not it changed the solution.
    fn step_ended(&mut self, _outcome: &StepOutcome<'_, S::Score>) {}

    /// Called when a phase ends.
    fn phase_ended(&mut self) {}
}

impl<S: PlanningSolution> Acceptor<S> for Box<dyn Acceptor<S>> {
    fn acceptance_weight(
        &mut self,
        candidate: &MoveCandidate<'_, S::Score>,
        rng: &mut SolverRng,
    ) -> f64 {
        (**self).acceptance_weight(candidate, rng)
    }

    fn phase_started(&mut self, starting_score: &S::Score) {
        (**self).phase_started(starting_score)
    }

    fn step_started(&mut self, time_gradient: f64) {
        (**self).step_started(time_gradient)
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, S::Score>) {
        (**self).step_ended(outcome)
    }

    fn phase_ended(&mut self) {
        (**self).phase_ended()
    }
}

#[cfg(test)]
mod tests;
