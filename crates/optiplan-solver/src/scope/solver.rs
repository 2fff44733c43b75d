//! Solver-level scope.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use optiplan_config::EnvironmentMode;
use optiplan_core::{PlanningSolution, Result};
use optiplan_scoring::{ScoreDirector, ScoreDirectorFactory};
use rand::SeedableRng;

use super::{ScopeSnapshot, SolverRng};
use crate::event::SolverEventSupport;
use crate::realtime::{BoxedProblemChange, ProblemChangeReceiver};
use crate::recaller::BestSolutionRecaller;
use crate::termination::Termination;

/// Top-level scope for the entire solving process.
///
/// Owns the score director, the best solution recaller and the random
/// generator; phases borrow it through a [`PhaseScope`](super::PhaseScope).
pub struct SolverScope<S: PlanningSolution> {
    score_director: Box<dyn ScoreDirector<S>>,
    recaller: BestSolutionRecaller<S>,
    events: SolverEventSupport<S>,
    rng: SolverRng,
    environment_mode: EnvironmentMode,
    start_time: Option<Instant>,
    total_step_count: u64,
    termination: Option<Box<dyn Termination<S>>>,
    terminate_early: Arc<AtomicBool>,
    problem_changes: Option<ProblemChangeReceiver<S>>,
    pending_changes: Vec<BoxedProblemChange<S>>,
    move_thread_count: Option<usize>,
    director_factory: Option<Arc<dyn ScoreDirectorFactory<S>>>,
}

impl<S: PlanningSolution> fmt::Debug for SolverScope<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverScope")
            .field("recaller", &self.recaller)
            .field("environment_mode", &self.environment_mode)
            .field("total_step_count", &self.total_step_count)
            .field("termination", &self.termination)
            .field("move_thread_count", &self.move_thread_count)
            .finish()
    }
}

impl<S: PlanningSolution> SolverScope<S> {
    pub fn new(score_director: Box<dyn ScoreDirector<S>>) -> Self {
        Self {
            score_director,
            recaller: BestSolutionRecaller::new(),
            events: SolverEventSupport::new(),
            rng: SolverRng::seed_from_u64(0),
            environment_mode: EnvironmentMode::default(),
            start_time: None,
            total_step_count: 0,
            termination: None,
            terminate_early: Arc::new(AtomicBool::new(false)),
            problem_changes: None,
            pending_changes: Vec::new(),
            move_thread_count: None,
            director_factory: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SolverRng::seed_from_u64(seed);
        self
    }

    /// Seeds from the operating system; runs are not reproducible.
    pub fn with_random_seed(mut self) -> Self {
        self.rng = SolverRng::from_os_rng();
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_terminate_early_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.terminate_early = flag;
        self
    }

    pub fn with_event_support(mut self, events: SolverEventSupport<S>) -> Self {
        self.events = events;
        self
    }

    /// Receives problem changes; the receiver's early-termination flag
    /// replaces the scope's own.
    pub fn with_problem_changes(mut self, receiver: ProblemChangeReceiver<S>) -> Self {
        self.terminate_early = receiver.terminate_early_flag();
        self.problem_changes = Some(receiver);
        self
    }

    /// Evaluates local search moves on `thread_count` workers, each with its
    /// own director built by `factory`.
    pub fn with_partitioned_evaluation(
        mut self,
        factory: Arc<dyn ScoreDirectorFactory<S>>,
        thread_count: usize,
    ) -> Self {
        self.director_factory = Some(factory);
        self.move_thread_count = Some(thread_count);
        self
    }

    /// Resets the counters and takes the working solution as the first best.
    pub fn start_solving(&mut self) -> Result<S::Score> {
        self.start_time = Some(Instant::now());
        self.total_step_count = 0;
        if let Some(receiver) = &self.problem_changes {
            receiver.set_solving(true);
        }
        self.recaller.solving_started(self.score_director.as_mut())
    }

    pub fn end_solving(&mut self) {
        if let Some(receiver) = &self.problem_changes {
            receiver.set_solving(false);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn score_director(&self) -> &dyn ScoreDirector<S> {
        self.score_director.as_ref()
    }

    pub fn score_director_mut(&mut self) -> &mut dyn ScoreDirector<S> {
        self.score_director.as_mut()
    }

    pub fn working_solution(&self) -> &S {
        self.score_director.working_solution()
    }

    pub fn calculate_score(&mut self) -> Result<S::Score> {
        self.score_director.calculate_score()
    }

    pub fn rng(&mut self) -> &mut SolverRng {
        &mut self.rng
    }

    /// Score director and random generator together, for selector lifecycle
    /// calls that need both.
    pub fn director_and_rng(&mut self) -> (&dyn ScoreDirector<S>, &mut SolverRng) {
        (self.score_director.as_ref(), &mut self.rng)
    }

    pub fn director_mut_and_rng(&mut self) -> (&mut dyn ScoreDirector<S>, &mut SolverRng) {
        (self.score_director.as_mut(), &mut self.rng)
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    /// Compares `score` with a from-scratch calculation when the environment
    /// mode asks for assertions.
    pub fn assert_score(&self, score: S::Score, context: &str) -> Result<()> {
        if self.environment_mode.is_asserted() {
            self.score_director
                .assert_working_score_from_scratch(score, context)?;
        }
        Ok(())
    }

    pub fn events(&self) -> &SolverEventSupport<S> {
        &self.events
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.total_step_count += 1;
        self.total_step_count
    }

    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    pub fn recaller(&self) -> &BestSolutionRecaller<S> {
        &self.recaller
    }

    pub fn best_score(&self) -> Option<S::Score> {
        self.recaller.best_score()
    }

    pub fn best_solution(&self) -> Option<&S> {
        self.recaller.best_solution()
    }

    /// The best solution, or the working solution if none was recorded.
    pub fn take_best_or_working_solution(&mut self) -> S {
        self.recaller
            .take_best_solution()
            .unwrap_or_else(|| self.score_director.clone_working_solution())
    }

    /// Offers the working solution to the recaller at the end of a step.
    pub fn update_best_solution(&mut self, score: S::Score) -> bool {
        self.recaller.process_working_solution_during_step(
            self.score_director.as_ref(),
            score,
            self.total_step_count,
            &self.events,
        )
    }

    /// Offers a complete assignment reached while exploring moves.
    pub fn update_best_solution_during_move(&mut self, score: S::Score) -> bool {
        self.recaller.process_working_solution_during_move(
            self.score_director.as_ref(),
            score,
            self.total_step_count,
            &self.events,
        )
    }

    /// Loads a clone of the best solution into the score director.
    ///
    /// Returns the recalculated working score, or `None` if no best solution
    /// was recorded and the working solution was left alone.
    pub fn restore_best_solution(&mut self) -> Result<Option<S::Score>> {
        let Some(best) = self.recaller.best_solution().cloned() else {
            return Ok(None);
        };
        self.score_director.set_working_solution(best)?;
        self.score_director.calculate_score().map(Some)
    }

    pub fn reset_best_to_working_solution(&mut self, score: S::Score) {
        self.recaller.reset_to_working_solution(
            self.score_director.as_ref(),
            score,
            self.total_step_count,
            &self.events,
        );
    }

    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early)
    }

    pub fn is_terminate_early(&self) -> bool {
        self.terminate_early.load(Ordering::SeqCst)
    }

    /// Moves submitted problem changes into the pending buffer.
    ///
    /// Returns true if any change is waiting to be applied.
    pub fn poll_problem_changes(&mut self) -> bool {
        if let Some(receiver) = &self.problem_changes {
            self.pending_changes.extend(receiver.drain_pending());
        }
        !self.pending_changes.is_empty()
    }

    /// Hands the problem change receiver back once solving is over.
    pub fn take_problem_change_receiver(&mut self) -> Option<ProblemChangeReceiver<S>> {
        self.problem_changes.take()
    }

    pub fn take_pending_problem_changes(&mut self) -> Vec<BoxedProblemChange<S>> {
        std::mem::take(&mut self.pending_changes)
    }

    pub fn termination(&self) -> Option<&dyn Termination<S>> {
        self.termination.as_deref()
    }

    /// True if the solver-level termination fired or solving was asked to
    /// stop early.
    pub fn is_solver_terminated(&self) -> bool {
        self.is_terminate_early()
            || self
                .termination
                .as_ref()
                .is_some_and(|t| t.is_terminated(&self.snapshot()))
    }

    pub fn move_thread_count(&self) -> Option<usize> {
        self.move_thread_count
    }

    pub fn director_factory(&self) -> Option<&Arc<dyn ScoreDirectorFactory<S>>> {
        self.director_factory.as_ref()
    }

    /// Solver-level counters.
    pub fn snapshot(&self) -> ScopeSnapshot<S::Score> {
        let elapsed = self.elapsed();
        ScopeSnapshot {
            phase_index: None,
            elapsed,
            step_count: self.total_step_count,
            unimproved_step_count: self
                .total_step_count
                .saturating_sub(self.recaller.last_improvement_step()),
            unimproved_time: self
                .recaller
                .last_improvement_time()
                .map_or(elapsed, |t| t.elapsed()),
            best_score: self.recaller.best_score(),
            best_initialized: self.recaller.is_best_initialized(),
            last_step_score: None,
            calculation_count: self.score_director.calculation_count(),
        }
    }
}
