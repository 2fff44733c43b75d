//! Phase-level scope.

use std::time::{Duration, Instant};

use optiplan_config::EnvironmentMode;
use optiplan_core::{PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use tracing::info;

use super::{ScopeSnapshot, SolverRng, SolverScope};
use crate::termination::Termination;

/// Scope for a single phase of solving.
///
/// Borrows the solver scope for the duration of the phase. Step counters
/// advance both the phase and the solver totals.
pub struct PhaseScope<'a, S: PlanningSolution> {
    solver_scope: &'a mut SolverScope<S>,
    phase_index: usize,
    phase_type: &'static str,
    start_time: Instant,
    /// Solver step count when the phase started.
    start_step_count: u64,
    step_count: u64,
    starting_score: S::Score,
    last_step_score: S::Score,
}

impl<'a, S: PlanningSolution> PhaseScope<'a, S> {
    /// Opens the phase: calculates the starting score and notifies the
    /// lifecycle listeners.
    pub fn start(
        solver_scope: &'a mut SolverScope<S>,
        phase_index: usize,
        phase_type: &'static str,
    ) -> Result<Self> {
        let starting_score = solver_scope.calculate_score()?;
        let start_step_count = solver_scope.total_step_count();
        let scope = Self {
            solver_scope,
            phase_index,
            phase_type,
            start_time: Instant::now(),
            start_step_count,
            step_count: 0,
            starting_score,
            last_step_score: starting_score,
        };
        scope.solver_scope.events().fire_phase_started(&scope.snapshot());
        Ok(scope)
    }

    /// Closes the phase, logging its summary.
    pub fn end(self) {
        let snapshot = self.snapshot();
        info!(
            phase = self.phase_type,
            phase_index = self.phase_index,
            steps = self.step_count,
            elapsed_ms = snapshot.elapsed.as_millis() as u64,
            best_score = ?snapshot.best_score,
            "Phase ended"
        );
        self.solver_scope.events().fire_phase_ended(&snapshot);
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn phase_type(&self) -> &'static str {
        self.phase_type
    }

    pub fn starting_score(&self) -> S::Score {
        self.starting_score
    }

    /// Score after the last completed step, or the starting score.
    pub fn last_step_score(&self) -> S::Score {
        self.last_step_score
    }

    pub fn set_last_step_score(&mut self, score: S::Score) {
        self.last_step_score = score;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Advances both the phase and the solver step counters.
    pub fn increment_step_count(&mut self) -> u64 {
        self.step_count += 1;
        self.solver_scope.increment_step_count();
        self.step_count
    }

    pub fn solver_scope(&self) -> &SolverScope<S> {
        self.solver_scope
    }

    pub fn solver_scope_mut(&mut self) -> &mut SolverScope<S> {
        self.solver_scope
    }

    pub fn score_director(&self) -> &dyn ScoreDirector<S> {
        self.solver_scope.score_director()
    }

    pub fn score_director_mut(&mut self) -> &mut dyn ScoreDirector<S> {
        self.solver_scope.score_director_mut()
    }

    pub fn director_and_rng(&mut self) -> (&dyn ScoreDirector<S>, &mut SolverRng) {
        self.solver_scope.director_and_rng()
    }

    pub fn director_mut_and_rng(&mut self) -> (&mut dyn ScoreDirector<S>, &mut SolverRng) {
        self.solver_scope.director_mut_and_rng()
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.solver_scope.environment_mode()
    }

    pub fn calculate_score(&mut self) -> Result<S::Score> {
        self.solver_scope.calculate_score()
    }

    pub fn best_score(&self) -> Option<S::Score> {
        self.solver_scope.best_score()
    }

    /// Offers the working solution to the recaller at the end of a step.
    pub fn update_best_solution(&mut self, score: S::Score) -> bool {
        self.solver_scope.update_best_solution(score)
    }

    /// True if the phase must stop before its next step.
    ///
    /// Pending problem changes stop the phase too, so the solver can apply
    /// them and restart.
    pub fn is_terminated(&mut self, phase_termination: Option<&dyn Termination<S>>) -> bool {
        if self.solver_scope.is_terminate_early()
            || self.solver_scope.poll_problem_changes()
            || self.solver_scope.is_solver_terminated()
        {
            return true;
        }
        phase_termination.is_some_and(|t| t.is_terminated(&self.snapshot()))
    }

    /// Fraction of the available time already used, between 0 and 1.
    ///
    /// Combines the solver and phase terminations; the larger gradient wins.
    pub fn time_gradient(&self, phase_termination: Option<&dyn Termination<S>>) -> f64 {
        let solver = self
            .solver_scope
            .termination()
            .and_then(|t| t.time_gradient(&self.solver_scope.snapshot()));
        let phase = phase_termination.and_then(|t| t.time_gradient(&self.snapshot()));
        match (solver, phase) {
            (Some(a), Some(b)) => a.max(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => 0.0,
        }
        .clamp(0.0, 1.0)
    }

    /// Phase-level counters.
    ///
    /// Unimproved counters start at the phase start if the best solution has
    /// not improved since.
    pub fn snapshot(&self) -> ScopeSnapshot<S::Score> {
        let recaller = self.solver_scope.recaller();
        let elapsed = self.elapsed();
        let total = self.solver_scope.total_step_count();
        let improved_at = recaller.last_improvement_step().max(self.start_step_count);
        let unimproved_time = match recaller.last_improvement_time() {
            Some(t) if t > self.start_time => t.elapsed(),
            _ => elapsed,
        };
        ScopeSnapshot {
            phase_index: Some(self.phase_index),
            elapsed,
            step_count: self.step_count,
            unimproved_step_count: total.saturating_sub(improved_at),
            unimproved_time,
            best_score: recaller.best_score(),
            best_initialized: recaller.is_best_initialized(),
            last_step_score: Some(self.last_step_score),
            calculation_count: self.solver_scope.score_director().calculation_count(),
        }
    }

    pub fn fire_step_started(&self) {
        self.solver_scope.events().fire_step_started(&self.snapshot());
    }

    pub fn fire_step_ended(&self) {
        self.solver_scope.events().fire_step_ended(&self.snapshot());
    }
}
