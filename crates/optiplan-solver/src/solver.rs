//! Solver implementation.
//!
//! A [`Solver`] runs its phases in order over one working solution, stops
//! when the solver termination fires or early termination is requested, and
//! applies queued problem changes between phases before starting over.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use optiplan_config::{EnvironmentMode, SolverConfig};
use optiplan_core::{OptiplanError, ParseableScore, PlanningSolution, Result};
use optiplan_scoring::ScoreDirectorFactory;
use tracing::{debug, info, warn};

use crate::builder::{PhaseBuilder, PhaseComponents, TerminationBuilder};
use crate::event::SolverEventSupport;
use crate::phase::Phase;
use crate::realtime::{apply_problem_changes, ProblemChangeReceiver};
use crate::scope::SolverScope;
use crate::termination::Termination;

/// Result of one call to [`Solver::solve`].
#[derive(Debug)]
pub struct SolverOutcome<S: PlanningSolution> {
    /// Best solution found, or the working solution if nothing was recorded.
    pub solution: S,
    pub score: Option<S::Score>,
    /// Phases that ended because they had nothing to select.
    pub empty_selections: Vec<OptiplanError>,
    pub terminated_early: bool,
    pub step_count: u64,
    pub elapsed: Duration,
    pub calculation_count: u64,
}

/// The main solver that optimizes planning solutions.
///
/// ```
/// use std::sync::Arc;
/// use optiplan_solver::solver::Solver;
/// use optiplan_solver::termination::StepCountTermination;
/// use optiplan_solver::phase::Phase;
/// # use optiplan_solver::scope::SolverScope;
/// # use optiplan_test::nqueens::create_nqueens_factory;
/// # use optiplan_test::NQueensSolution;
/// # #[derive(Debug)]
/// # struct NoOpPhase;
/// # impl Phase<NQueensSolution> for NoOpPhase {
/// #     fn solve(&mut self, _: &mut SolverScope<NQueensSolution>, _: usize) -> optiplan_core::Result<()> { Ok(()) }
/// #     fn phase_type_name(&self) -> &'static str { "NoOp" }
/// # }
///
/// let phases: Vec<Box<dyn Phase<NQueensSolution>>> = vec![Box::new(NoOpPhase)];
/// let mut solver = Solver::new(Arc::new(create_nqueens_factory()), phases)
///     .with_termination(Box::new(StepCountTermination::new(100)))
///     .with_random_seed(7);
/// let outcome = solver.solve(NQueensSolution::with_rows(&[1, 3, 0, 2])).unwrap();
/// assert_eq!(outcome.score, Some(optiplan_core::SimpleScore::of(0)));
/// ```
pub struct Solver<S: PlanningSolution> {
    director_factory: Arc<dyn ScoreDirectorFactory<S>>,
    phases: Vec<Box<dyn Phase<S>>>,
    termination: Option<Arc<dyn Termination<S>>>,
    environment_mode: EnvironmentMode,
    random_seed: Option<u64>,
    move_thread_count: Option<usize>,
    events: SolverEventSupport<S>,
    terminate_early_flag: Arc<AtomicBool>,
    solving: Arc<AtomicBool>,
    problem_changes: Option<ProblemChangeReceiver<S>>,
}

impl<S: PlanningSolution> fmt::Debug for Solver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("phases", &self.phases)
            .field("termination", &self.termination)
            .field("environment_mode", &self.environment_mode)
            .field("random_seed", &self.random_seed)
            .field("move_thread_count", &self.move_thread_count)
            .finish()
    }
}

impl<S: PlanningSolution> Solver<S> {
    pub fn new(
        director_factory: Arc<dyn ScoreDirectorFactory<S>>,
        phases: Vec<Box<dyn Phase<S>>>,
    ) -> Self {
        Self {
            director_factory,
            phases,
            termination: None,
            environment_mode: EnvironmentMode::default(),
            random_seed: None,
            move_thread_count: None,
            events: SolverEventSupport::new(),
            terminate_early_flag: Arc::new(AtomicBool::new(false)),
            solving: Arc::new(AtomicBool::new(false)),
            problem_changes: None,
        }
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(Arc::from(termination));
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Evaluates local search moves on `thread_count` workers.
    pub fn with_move_thread_count(mut self, thread_count: Option<usize>) -> Self {
        self.move_thread_count = thread_count.filter(|&n| n > 1);
        self
    }

    pub fn with_event_support(mut self, events: SolverEventSupport<S>) -> Self {
        self.events = events;
        self
    }

    /// Applies changes submitted through the matching
    /// [`SolverHandle`](crate::realtime::SolverHandle); the handle can also
    /// terminate solving early.
    pub fn with_problem_changes(mut self, receiver: ProblemChangeReceiver<S>) -> Self {
        self.terminate_early_flag = receiver.terminate_early_flag();
        self.problem_changes = Some(receiver);
        self
    }

    pub fn events_mut(&mut self) -> &mut SolverEventSupport<S> {
        &mut self.events
    }

    /// Requests early termination of the solving process.
    ///
    /// Returns false if the solver is not solving.
    pub fn terminate_early(&self) -> bool {
        if self.solving.load(Ordering::SeqCst) {
            self.terminate_early_flag.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// Flag that stops solving at the next step boundary once set, usable
    /// from other threads while [`solve`](Self::solve) runs.
    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early_flag)
    }

    /// Returns true if the solver is currently solving.
    pub fn is_solving(&self) -> bool {
        self.solving.load(Ordering::SeqCst)
    }

    /// Solves `solution` and returns the best solution found.
    ///
    /// Phases that end with an empty selection are reported in the outcome;
    /// any other phase error aborts solving.
    pub fn solve(&mut self, solution: S) -> Result<SolverOutcome<S>> {
        let score_director = self.director_factory.build_score_director(solution)?;
        let mut scope = SolverScope::new(score_director)
            .with_environment_mode(self.environment_mode)
            .with_event_support(self.events.clone())
            .with_terminate_early_flag(Arc::clone(&self.terminate_early_flag));
        scope = match self.random_seed {
            Some(seed) => scope.with_seed(seed),
            None if !self.environment_mode.is_reproducible() => scope.with_random_seed(),
            None => scope,
        };
        if let Some(termination) = &self.termination {
            scope = scope.with_termination(Box::new(Arc::clone(termination)));
        }
        if let Some(thread_count) = self.move_thread_count {
            scope = scope.with_partitioned_evaluation(Arc::clone(&self.director_factory), thread_count);
        }
        if let Some(receiver) = self.problem_changes.take() {
            scope = scope.with_problem_changes(receiver);
        }

        self.terminate_early_flag.store(false, Ordering::SeqCst);
        self.solving.store(true, Ordering::SeqCst);
        let outcome = self.run(&mut scope);
        self.solving.store(false, Ordering::SeqCst);
        scope.end_solving();
        self.problem_changes = scope.take_problem_change_receiver();
        outcome
    }

    fn run(&mut self, scope: &mut SolverScope<S>) -> Result<SolverOutcome<S>> {
        let starting_score = scope.start_solving()?;
        scope
            .events()
            .fire_solving_started(scope.working_solution(), &scope.snapshot());
        info!(
            phases = self.phases.len(),
            environment_mode = ?self.environment_mode,
            move_thread_count = ?self.move_thread_count,
            starting_score = %starting_score,
            "Solving started"
        );

        let mut empty_selections = Vec::new();
        loop {
            let mut restart = false;
            for (phase_index, phase) in self.phases.iter_mut().enumerate() {
                if scope.is_solver_terminated() {
                    break;
                }
                match phase.solve(scope, phase_index) {
                    Ok(()) => {}
                    Err(err @ OptiplanError::EmptySelection { .. }) => {
                        warn!(
                            phase_index,
                            phase = phase.phase_type_name(),
                            error = %err,
                            "Phase had nothing to select"
                        );
                        empty_selections.push(err);
                    }
                    Err(err) => return Err(err),
                }
                if scope.poll_problem_changes() {
                    restart = true;
                    break;
                }
            }
            if !restart {
                break;
            }

            let changes = scope.take_pending_problem_changes();
            let count = changes.len();
            let score = apply_problem_changes(scope.score_director_mut(), changes)?;
            scope.reset_best_to_working_solution(score);
            debug!(changes = count, score = %score, "Restarting phases after problem changes");
        }

        let terminated_early = scope.is_terminate_early();
        let snapshot = scope.snapshot();
        let calculation_count = scope.score_director().calculation_count();
        let score = scope.best_score();
        let solution = scope.take_best_or_working_solution();
        scope
            .events()
            .fire_solving_ended(&solution, terminated_early, &snapshot);
        info!(
            best_score = ?score,
            steps = snapshot.step_count,
            calculations = calculation_count,
            elapsed_ms = snapshot.elapsed.as_millis() as u64,
            terminated_early,
            "Solving ended"
        );

        Ok(SolverOutcome {
            solution,
            score,
            empty_selections,
            terminated_early,
            step_count: snapshot.step_count,
            elapsed: snapshot.elapsed,
            calculation_count,
        })
    }
}

/// Builds solvers from a [`SolverConfig`].
///
/// Validation happens in [`build_solver`](Self::build_solver), so a bad
/// configuration fails before any solving starts.
pub struct SolverFactory<S: PlanningSolution> {
    config: SolverConfig,
    director_factory: Arc<dyn ScoreDirectorFactory<S>>,
    components: PhaseComponents<S>,
}

impl<S: PlanningSolution> fmt::Debug for SolverFactory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverFactory")
            .field("config", &self.config)
            .field("components", &self.components)
            .finish()
    }
}

impl<S> SolverFactory<S>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
{
    pub fn new(
        config: SolverConfig,
        director_factory: Arc<dyn ScoreDirectorFactory<S>>,
        components: PhaseComponents<S>,
    ) -> Self {
        Self {
            config,
            director_factory,
            components,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn build_solver(&self) -> Result<Solver<S>> {
        self.config.validate()?;
        if self.config.phases.is_empty() {
            return Err(OptiplanError::Config("no phases configured".to_string()));
        }

        let termination = match &self.config.termination {
            Some(config) => TerminationBuilder::build::<S>(config)?,
            None => None,
        };
        let mut phases = Vec::with_capacity(self.config.phases.len());
        for (index, phase_config) in self.config.phases.iter().enumerate() {
            let unbounded = matches!(phase_config, optiplan_config::PhaseConfig::LocalSearch(_))
                && phase_config.termination().map_or(true, |t| t.is_empty());
            if unbounded && termination.is_none() {
                return Err(OptiplanError::Config(format!(
                    "local search phase {index} has no termination and neither does the solver"
                )));
            }
            phases.push(PhaseBuilder::build(phase_config, &self.components)?);
        }

        let director_factory = if self.config.constraint_match_enabled() {
            self.director_factory.with_constraint_match_tracking()?
        } else {
            Arc::clone(&self.director_factory)
        };
        let mut solver = Solver::new(director_factory, phases)
            .with_environment_mode(self.config.environment_mode)
            .with_move_thread_count(self.config.move_thread_count.resolve());
        if let Some(seed) = self.config.random_seed {
            solver = solver.with_random_seed(seed);
        }
        if let Some(termination) = termination {
            solver = solver.with_termination(termination);
        }
        Ok(solver)
    }
}
