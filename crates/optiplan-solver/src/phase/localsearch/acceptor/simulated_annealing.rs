//! Simulated annealing acceptor.

use std::fmt::Debug;
use std::marker::PhantomData;

use optiplan_core::{PlanningSolution, Score};
use rand::Rng;

use super::{Acceptor, MoveCandidate, StepOutcome};
use crate::scope::SolverRng;

/// Simulated annealing acceptor - accepts worse moves with a probability
/// that shrinks as the temperature drops.
///
/// The temperature has one value per score level. A move that does not
/// worsen the last step score is always accepted. Otherwise every level that
/// got worse contributes a factor `exp(delta / temperature)` and the move is accepted
/// if a uniform draw falls below the product.
///
/// Without a cooling rate the temperature follows the time gradient:
/// `starting * (1 - gradient)`. With a cooling rate it is multiplied by the
/// rate after every step.
///
/// # Example
///
/// ```
/// use optiplan_core::HardSoftScore;
/// use optiplan_solver::phase::localsearch::SimulatedAnnealingAcceptor;
/// use optiplan_test::TaskSolution;
///
/// let acceptor =
///     SimulatedAnnealingAcceptor::<TaskSolution>::new(HardSoftScore::of(0, 400));
/// assert_eq!(acceptor.temperature(), &[0.0, 400.0]);
/// ```
pub struct SimulatedAnnealingAcceptor<S> {
    starting_temperature: Vec<f64>,
    temperature: Vec<f64>,
    cooling_rate: Option<f64>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S> Debug for SimulatedAnnealingAcceptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedAnnealingAcceptor")
            .field("starting_temperature", &self.starting_temperature)
            .field("temperature", &self.temperature)
            .field("cooling_rate", &self.cooling_rate)
            .finish()
    }
}

impl<S> Clone for SimulatedAnnealingAcceptor<S> {
    fn clone(&self) -> Self {
        Self {
            starting_temperature: self.starting_temperature.clone(),
            temperature: self.temperature.clone(),
            cooling_rate: self.cooling_rate,
            _phantom: PhantomData,
        }
    }
}

impl<S: PlanningSolution> SimulatedAnnealingAcceptor<S> {
    pub fn new(starting_temperature: S::Score) -> Self {
        let levels: Vec<f64> = starting_temperature
            .to_level_numbers()
            .into_iter()
            .map(|level| level as f64)
            .collect();
        Self {
            temperature: levels.clone(),
            starting_temperature: levels,
            cooling_rate: None,
            _phantom: PhantomData,
        }
    }

    /// Cools by `rate` after every step instead of following the time
    /// gradient.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = Some(rate);
        self
    }

    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    /// Probability of accepting a move from `last` to `candidate`.
    pub fn acceptance_probability(&self, last: &S::Score, candidate: &S::Score) -> f64 {
        if candidate >= last {
            return 1.0;
        }
        let delta = (*candidate - *last).to_level_numbers();
        let mut probability = 1.0;
        for (level, &difference) in delta.iter().enumerate() {
            let temperature = self.temperature.get(level).copied().unwrap_or(0.0);
            let difference = difference as f64;
            // Gains on one level never offset losses on another.
            if difference >= 0.0 {
                continue;
            }
            if temperature <= 0.0 {
                return 0.0;
            }
            probability *= (difference / temperature).exp();
        }
        probability.min(1.0)
    }
}

impl<S: PlanningSolution> Acceptor<S> for SimulatedAnnealingAcceptor<S> {
    fn acceptance_weight(
        &mut self,
        candidate: &MoveCandidate<'_, S::Score>,
        rng: &mut SolverRng,
    ) -> f64 {
        let probability =
            self.acceptance_probability(&candidate.last_step_score, &candidate.move_score);
        if probability >= 1.0 || rng.random::<f64>() < probability {
            1.0
        } else {
            0.0
        }
    }

    fn phase_started(&mut self, _starting_score: &S::Score) {
        self.temperature = self.starting_temperature.clone();
    }

    fn step_started(&mut self, time_gradient: f64) {
        if self.cooling_rate.is_none() {
            let remaining = (1.0 - time_gradient).clamp(0.0, 1.0);
            for (current, start) in self.temperature.iter_mut().zip(&self.starting_temperature) {
                *current = start * remaining;
            }
        }
    }

    fn step_ended(&mut self, _outcome: &StepOutcome<'_, S::Score>) {
        if let Some(rate) = self.cooling_rate {
            for current in &mut self.temperature {
                *current *= rate;
            }
        }
    }
}
