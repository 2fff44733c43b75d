//! Local search phase implementation.

use std::fmt::Debug;

use optiplan_core::{OptiplanError, PlanningSolution, Result};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::heuristic::r#move::{BoxedMove, MoveArena};
use crate::heuristic::selector::MoveSelector;
use crate::phase::localsearch::{
    Acceptor, LocalSearchForager, MoveCandidate, StepOutcome,
};
use crate::phase::partitioned::PartitionedMoveEvaluator;
use crate::phase::{evaluate_move, MoveEvaluation, Phase};
use crate::scope::{PhaseScope, SolverRng, SolverScope, StepScope};
use crate::termination::Termination;

const PHASE_TYPE: &str = "Local Search";

/// Local search phase that improves an existing solution.
///
/// Every step:
/// 1. Collects the doable moves of the selector into an arena
/// 2. Applies each move on trial, scores it and undoes it
/// 3. Weighs the score with the acceptor and hands accepted moves to the forager
/// 4. Re-applies the forager's winner, if any
///
/// A step in which no move was accepted leaves the working solution as it
/// was. The phase only ends through a termination, so one must be configured
/// on the phase or on the solver.
///
/// With a move thread count and a score director factory on the solver
/// scope, step 2 runs on a [`PartitionedMoveEvaluator`].
pub struct LocalSearchPhase<S: PlanningSolution> {
    move_selector: Box<dyn MoveSelector<S>>,
    acceptor: Box<dyn Acceptor<S>>,
    forager: LocalSearchForager<S::Score>,
    termination: Option<Box<dyn Termination<S>>>,
    arena: MoveArena<BoxedMove<S>>,
    evaluator: Option<PartitionedMoveEvaluator<S>>,
}

impl<S: PlanningSolution> Debug for LocalSearchPhase<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSearchPhase")
            .field("move_selector", &self.move_selector)
            .field("acceptor", &self.acceptor)
            .field("forager", &self.forager)
            .field("termination", &self.termination)
            .field("evaluator", &self.evaluator)
            .finish()
    }
}

impl<S: PlanningSolution> LocalSearchPhase<S> {
    pub fn new(
        move_selector: Box<dyn MoveSelector<S>>,
        acceptor: Box<dyn Acceptor<S>>,
        forager: LocalSearchForager<S::Score>,
    ) -> Self {
        Self {
            move_selector,
            acceptor,
            forager,
            termination: None,
            arena: MoveArena::new(),
            evaluator: None,
        }
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Starts the worker pool once if the solver asks for partitioned
    /// evaluation.
    fn prepare_evaluator(&mut self, solver_scope: &SolverScope<S>) -> Result<()> {
        if self.evaluator.is_some() {
            return Ok(());
        }
        if let (Some(threads), Some(factory)) =
            (solver_scope.move_thread_count(), solver_scope.director_factory())
        {
            if threads > 1 {
                self.evaluator = Some(PartitionedMoveEvaluator::new(factory.clone(), threads)?);
            }
        }
        Ok(())
    }

    /// Weighs one evaluated move. Returns true if the forager wants to stop.
    #[allow(clippy::too_many_arguments)]
    fn consider(
        &mut self,
        rng: &mut SolverRng,
        step_scope: &mut StepScope<S::Score>,
        index: usize,
        evaluation: &MoveEvaluation<S::Score>,
        last_step_score: S::Score,
        best_score: S::Score,
    ) -> bool {
        step_scope.record_selected();
        let Some(mv) = self.arena.get(index) else {
            return false;
        };
        let entities = mv.planning_entities();
        let candidate = MoveCandidate {
            last_step_score,
            move_score: evaluation.score,
            best_score,
            entities: &entities,
            value_hashes: &evaluation.value_hashes,
        };
        if self.acceptor.is_accepted(&candidate, rng) {
            step_scope.record_accepted();
            self.forager.add_move(index, evaluation.score);
        }
        self.forager.is_quit_early()
    }

    fn evaluate_step(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S>,
        step_scope: &mut StepScope<S::Score>,
        last_step_score: S::Score,
        best_score: S::Score,
    ) -> Result<()> {
        let mode = phase_scope.environment_mode();
        if let Some(evaluator) = &self.evaluator {
            let flag = phase_scope.solver_scope().terminate_early_flag();
            let evaluations = evaluator.evaluate(
                phase_scope.score_director().working_solution(),
                self.arena.as_slice(),
                mode,
                &flag,
            )?;
            for (index, evaluation) in evaluations.iter().enumerate() {
                let Some(evaluation) = evaluation else {
                    continue;
                };
                let rng = phase_scope.solver_scope_mut().rng();
                if self.consider(rng, step_scope, index, evaluation, last_step_score, best_score) {
                    break;
                }
            }
            return Ok(());
        }

        for index in 0..self.arena.len() {
            if index > 0 && phase_scope.is_terminated(self.termination.as_deref()) {
                break;
            }
            let Some(mv) = self.arena.get(index) else {
                break;
            };
            let evaluation =
                evaluate_move(phase_scope.score_director_mut(), mv.as_ref(), mode, last_step_score)?;
            let rng = phase_scope.solver_scope_mut().rng();
            if self.consider(rng, step_scope, index, &evaluation, last_step_score, best_score) {
                break;
            }
        }
        Ok(())
    }

    fn run_steps(&mut self, phase_scope: &mut PhaseScope<'_, S>) -> Result<()> {
        loop {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                break;
            }
            let mut step_scope = StepScope::new(phase_scope.step_count());
            phase_scope.fire_step_started();

            let time_gradient = phase_scope.time_gradient(self.termination.as_deref());
            self.acceptor.step_started(time_gradient);
            {
                let (score_director, rng) = phase_scope.director_and_rng();
                self.move_selector.step_started(score_director, rng);
            }

            let last_step_score = phase_scope.last_step_score();
            let best_score = phase_scope.best_score().unwrap_or(last_step_score);
            self.forager.step_started(best_score, last_step_score);

            self.arena.reset();
            {
                let score_director = phase_scope.score_director();
                self.arena.extend(
                    self.move_selector
                        .iter(score_director)
                        .filter(|mv| mv.is_doable(score_director)),
                );
            }
            if self.arena.is_empty() {
                return Err(OptiplanError::EmptySelection {
                    phase: PHASE_TYPE,
                    detail: format!("no doable move at step {}", step_scope.step_index()),
                });
            }

            self.evaluate_step(phase_scope, &mut step_scope, last_step_score, best_score)?;

            let mut entities = SmallVec::new();
            let mut value_hashes = SmallVec::new();
            let step_score = match self.forager.pick_move() {
                Some((index, _)) => {
                    let Some(step_move) = self.arena.take(index) else {
                        break;
                    };
                    step_move.do_move(phase_scope.score_director_mut())?;
                    let score = phase_scope.calculate_score()?;
                    phase_scope
                        .solver_scope()
                        .assert_score(score, "local search step")?;
                    entities = step_move.planning_entities();
                    value_hashes = step_move.planning_value_hashes(phase_scope.score_director());
                    score
                }
                None => last_step_score,
            };

            step_scope.set_score(step_score);
            phase_scope.set_last_step_score(step_score);
            phase_scope.increment_step_count();
            phase_scope.update_best_solution(step_score);
            let best_score = phase_scope.best_score().unwrap_or(step_score);
            self.acceptor.step_ended(&StepOutcome {
                step_score,
                best_score,
                entities: &entities,
                value_hashes: &value_hashes,
            });
            debug!(
                step = step_scope.step_index(),
                score = ?step_score,
                best_score = ?best_score,
                selected = step_scope.selected_move_count(),
                accepted = step_scope.accepted_move_count(),
                "Local search step"
            );
            phase_scope.fire_step_ended();
        }
        Ok(())
    }
}

impl<S: PlanningSolution> Phase<S> for LocalSearchPhase<S> {
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<()> {
        if self.termination.is_none() && solver_scope.termination().is_none() {
            return Err(OptiplanError::Config(
                "a local search phase needs a phase or solver termination".to_string(),
            ));
        }
        if self.move_selector.is_never_ending() {
            return Err(OptiplanError::Config(
                "local search cannot collect the moves of a never-ending selector".to_string(),
            ));
        }
        self.prepare_evaluator(solver_scope)?;

        let mut phase_scope = PhaseScope::start(solver_scope, phase_index, PHASE_TYPE)?;
        {
            let (score_director, rng) = phase_scope.director_and_rng();
            self.move_selector.phase_started(score_director, rng);
        }
        self.acceptor.phase_started(&phase_scope.starting_score());
        info!(
            phase_index,
            acceptor = ?self.acceptor,
            threads = self.evaluator.as_ref().map_or(1, |e| e.thread_count()),
            "Local search started"
        );

        let result = self.run_steps(&mut phase_scope);
        self.move_selector.phase_ended();
        self.acceptor.phase_ended();
        self.arena.reset();
        phase_scope.end();
        result
    }

    fn phase_type_name(&self) -> &'static str {
        PHASE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::localsearch::{
        HillClimbingAcceptor, LateAcceptanceAcceptor, SimulatedAnnealingAcceptor, TabuAcceptor,
    };
    use crate::termination::{BestScoreTermination, OrTermination, StepCountTermination};
    use crate::test_utils::{nqueens_factory, nqueens_scope, queen_change_selector};
    use optiplan_config::{EnvironmentMode, LocalSearchPickEarlyType};
    use optiplan_core::SimpleScore;
    use optiplan_test::nqueens::calculate_conflicts;
    use optiplan_test::NQueensSolution;

    fn phase(acceptor: Box<dyn Acceptor<NQueensSolution>>, steps: u64) -> LocalSearchPhase<NQueensSolution> {
        LocalSearchPhase::new(
            Box::new(queen_change_selector()),
            acceptor,
            LocalSearchForager::new(None, LocalSearchPickEarlyType::Never),
        )
        .with_termination(Box::new(OrTermination::new((
            StepCountTermination::new(steps),
            BestScoreTermination::new(SimpleScore::of(0)),
        ))))
    }

    #[test]
    fn test_hill_climbing_solves_four_queens() {
        let mut scope = nqueens_scope(&[0, 0, 0, 0]);
        scope.start_solving().unwrap();
        phase(Box::new(HillClimbingAcceptor::new()), 50)
            .solve(&mut scope, 0)
            .unwrap();
        let best = scope.best_solution().unwrap();
        assert!(scope.best_score().unwrap() > SimpleScore::of(-6));
        assert_eq!(scope.best_score(), Some(SimpleScore::of(-calculate_conflicts(best))));
    }

    #[test]
    fn test_tabu_search_improves_and_tracks_best() {
        let mut scope = nqueens_scope(&[0, 0, 0, 0, 0, 0]);
        let starting = scope.start_solving().unwrap();
        phase(Box::new(TabuAcceptor::new(Some(3), None)), 100)
            .solve(&mut scope, 0)
            .unwrap();
        let best = scope.best_score().unwrap();
        assert!(best > starting);
        assert_eq!(best, SimpleScore::of(-calculate_conflicts(scope.best_solution().unwrap())));
    }

    #[test]
    fn test_full_assert_checks_every_move() {
        let mut scope = nqueens_scope(&[0, 1, 0, 1, 0]).with_environment_mode(EnvironmentMode::FullAssert);
        scope.start_solving().unwrap();
        phase(Box::new(LateAcceptanceAcceptor::new(3)), 10)
            .solve(&mut scope, 0)
            .unwrap();
        assert!(scope.total_step_count() <= 10);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let mut scope = nqueens_scope(&[0, 0, 0, 0, 0, 0, 0]);
            scope.start_solving().unwrap();
            phase(Box::new(SimulatedAnnealingAcceptor::new(SimpleScore::of(2)).with_cooling_rate(0.9)), 30)
                .solve(&mut scope, 0)
                .unwrap();
            (scope.working_solution().rows(), scope.best_score())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_partitioned_evaluation_matches_sequential() {
        let run = |threads: Option<usize>| {
            let mut scope = nqueens_scope(&[0, 0, 0, 0, 0, 0]);
            if let Some(threads) = threads {
                scope = scope.with_partitioned_evaluation(nqueens_factory(), threads);
            }
            scope.start_solving().unwrap();
            phase(Box::new(TabuAcceptor::new(Some(2), None)), 15)
                .solve(&mut scope, 0)
                .unwrap();
            (scope.working_solution().rows(), scope.total_step_count())
        };
        assert_eq!(run(None), run(Some(3)));
    }

    /// Rejects every move.
    #[derive(Debug)]
    struct RejectingAcceptor;

    impl Acceptor<NQueensSolution> for RejectingAcceptor {
        fn acceptance_weight(
            &mut self,
            _candidate: &MoveCandidate<'_, SimpleScore>,
            _rng: &mut SolverRng,
        ) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_unaccepted_step_keeps_solution() {
        let mut scope = nqueens_scope(&[1, 3, 0, 2]);
        scope.start_solving().unwrap();
        let mut local_search = LocalSearchPhase::new(
            Box::new(queen_change_selector()),
            Box::new(RejectingAcceptor),
            LocalSearchForager::new(None, LocalSearchPickEarlyType::Never),
        )
        .with_termination(Box::new(StepCountTermination::new(3)));
        local_search.solve(&mut scope, 0).unwrap();
        assert_eq!(scope.working_solution().rows(), vec![Some(1), Some(3), Some(0), Some(2)]);
        assert_eq!(scope.total_step_count(), 3);
    }

    #[test]
    fn test_missing_termination_is_config_error() {
        let mut scope = nqueens_scope(&[0, 1]);
        scope.start_solving().unwrap();
        let mut local_search = LocalSearchPhase::new(
            Box::new(queen_change_selector()),
            Box::new(HillClimbingAcceptor::new()),
            LocalSearchForager::new(None, LocalSearchPickEarlyType::Never),
        );
        let error = local_search.solve(&mut scope, 0).unwrap_err();
        assert!(error.is_config());
    }

    #[test]
    fn test_no_doable_move_is_empty_selection() {
        let mut solution = NQueensSolution::with_rows(&[0, 1]);
        solution.queens.iter_mut().for_each(|q| q.pinned = true);
        let mut scope = crate::test_utils::nqueens_scope_for(solution);
        scope.start_solving().unwrap();
        let error = phase(Box::new(HillClimbingAcceptor::new()), 5)
            .solve(&mut scope, 0)
            .unwrap_err();
        assert!(matches!(error, OptiplanError::EmptySelection { .. }));
    }
}
