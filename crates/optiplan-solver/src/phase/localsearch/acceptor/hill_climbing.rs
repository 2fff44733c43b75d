//! Hill climbing acceptor.

use std::fmt::Debug;
use std::marker::PhantomData;

use optiplan_core::PlanningSolution;

use super::{Acceptor, MoveCandidate};
use crate::scope::SolverRng;

/// Accepts moves that do not worsen the last step score.
///
/// Equal scores are accepted so the search can cross plateaus.
pub struct HillClimbingAcceptor<S> {
    _phantom: PhantomData<fn() -> S>,
}

impl<S> Debug for HillClimbingAcceptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HillClimbingAcceptor")
    }
}

impl<S> Clone for HillClimbingAcceptor<S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S> HillClimbingAcceptor<S> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<S> Default for HillClimbingAcceptor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> Acceptor<S> for HillClimbingAcceptor<S> {
    fn acceptance_weight(
        &mut self,
        candidate: &MoveCandidate<'_, S::Score>,
        _rng: &mut SolverRng,
    ) -> f64 {
        if candidate.move_score >= candidate.last_step_score {
            1.0
        } else {
            0.0
        }
    }
}
