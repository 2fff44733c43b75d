//! ConstructionHeuristicPhase - greedy initialization of the working solution.

use std::fmt;

use optiplan_core::{OptiplanError, PlanningSolution, Result};
use tracing::{debug, info};

use super::{ConstructionForager, QueuedEntityPlacer};
use crate::phase::Phase;
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

const PHASE_TYPE: &str = "Construction Heuristic";

/// Construction heuristic phase that builds an initial solution.
///
/// Every step takes the next uninitialized entity from the placer, lets the
/// forager pick one of its placement moves and applies it for good.
pub struct ConstructionHeuristicPhase<S: PlanningSolution> {
    placer: QueuedEntityPlacer<S>,
    forager: ConstructionForager,
    termination: Option<Box<dyn Termination<S>>>,
}

impl<S: PlanningSolution> fmt::Debug for ConstructionHeuristicPhase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionHeuristicPhase")
            .field("placer", &self.placer)
            .field("forager", &self.forager)
            .field("termination", &self.termination)
            .finish()
    }
}

impl<S: PlanningSolution> ConstructionHeuristicPhase<S> {
    pub fn new(placer: QueuedEntityPlacer<S>, forager: ConstructionForager) -> Self {
        Self {
            placer,
            forager,
            termination: None,
        }
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    fn run_steps(&mut self, phase_scope: &mut PhaseScope<'_, S>) -> Result<()> {
        loop {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                break;
            }
            let Some(mut placement) = self.placer.next_placement(phase_scope.score_director())
            else {
                break;
            };

            let mut step_scope = StepScope::new(phase_scope.step_count());
            phase_scope.fire_step_started();

            let last_step_score = phase_scope.last_step_score();
            let mode = phase_scope.environment_mode();
            let pick = self.forager.pick(
                phase_scope.score_director_mut(),
                &placement,
                last_step_score,
                mode,
            )?;
            let Some(pick) = pick else {
                return Err(OptiplanError::EmptySelection {
                    phase: PHASE_TYPE,
                    detail: format!("no doable placement for {:?}", placement.entity),
                });
            };
            for _ in 0..pick.evaluated_count {
                step_scope.record_selected();
            }
            step_scope.record_accepted();

            let Some(step_move) = placement.take_move(pick.index) else {
                break;
            };
            step_move.do_move(phase_scope.score_director_mut())?;
            let score = phase_scope.calculate_score()?;
            phase_scope
                .solver_scope()
                .assert_score(score, "construction heuristic step")?;

            step_scope.set_score(score);
            phase_scope.set_last_step_score(score);
            phase_scope.increment_step_count();
            phase_scope.update_best_solution(score);
            debug!(
                step = step_scope.step_index(),
                entity = ?placement.entity,
                score = ?score,
                selected = step_scope.selected_move_count(),
                "Construction step"
            );
            phase_scope.fire_step_ended();
        }
        Ok(())
    }
}

impl<S: PlanningSolution> Phase<S> for ConstructionHeuristicPhase<S> {
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<()> {
        let mut phase_scope = PhaseScope::start(solver_scope, phase_index, PHASE_TYPE)?;
        {
            let (score_director, rng) = phase_scope.director_and_rng();
            self.placer.phase_started(score_director, rng);
        }
        info!(
            phase_index,
            entities = self.placer.remaining(),
            pick_early = ?self.forager.pick_early_type(),
            "Construction heuristic started"
        );

        let result = self.run_steps(&mut phase_scope);
        self.placer.phase_ended();
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
    use crate::event::{CountingEventListener, SolverEventSupport};
    use crate::heuristic::selector::FromSolutionEntitySelector;
    use crate::test_utils::{nqueens_scope_for, queen_change_selector, task_list_selector, task_scope};
    use crate::termination::StepCountTermination;
    use optiplan_config::ConstructionPickEarlyType;
    use optiplan_core::{HardSoftScore, SimpleScore};
    use optiplan_test::nqueens::calculate_conflicts;
    use optiplan_test::task::TASK;
    use optiplan_test::{NQueensSolution, Queen, TaskSolution};
    use std::sync::Arc;

    fn nqueens_phase(pick_early: ConstructionPickEarlyType) -> ConstructionHeuristicPhase<NQueensSolution> {
        let placer = QueuedEntityPlacer::new(
            Box::new(FromSolutionEntitySelector::new(0)),
            Box::new(queen_change_selector()),
        );
        ConstructionHeuristicPhase::new(placer, ConstructionForager::new(pick_early))
    }

    #[test]
    fn test_initializes_every_queen() {
        let mut scope = nqueens_scope_for(NQueensSolution::unassigned(4));
        scope.start_solving().unwrap();
        let mut phase = nqueens_phase(ConstructionPickEarlyType::Never);
        phase.solve(&mut scope, 0).unwrap();

        let solution = scope.working_solution();
        assert!(solution.queens.iter().all(|q| q.row.is_some()));
        assert_eq!(scope.total_step_count(), 4);
        assert_eq!(scope.score_director().uninitialized_variable_count(), 0);
        let best = scope.best_solution().unwrap();
        assert!(best.queens.iter().all(|q| q.row.is_some()));
        assert_eq!(
            scope.best_score(),
            Some(SimpleScore::of(-calculate_conflicts(best)))
        );
    }

    #[test]
    fn test_same_input_same_output() {
        let run = || {
            let mut scope = nqueens_scope_for(NQueensSolution::unassigned(6));
            scope.start_solving().unwrap();
            nqueens_phase(ConstructionPickEarlyType::FirstNonDeterioratingScore)
                .solve(&mut scope, 0)
                .unwrap();
            scope.working_solution().rows()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_ties_go_to_first_value() {
        let mut scope = nqueens_scope_for(NQueensSolution::unassigned(4));
        scope.start_solving().unwrap();
        nqueens_phase(ConstructionPickEarlyType::Never)
            .solve(&mut scope, 0)
            .unwrap();
        // Every row scores 0 for the first queen.
        assert_eq!(scope.working_solution().queens[0].row, Some(0));
    }

    #[test]
    fn test_pinned_queens_stay_unassigned() {
        let solution = NQueensSolution::new(vec![
            Queen::unassigned(0, 0).pinned(),
            Queen::unassigned(1, 1),
        ]);
        let mut scope = nqueens_scope_for(solution);
        scope.start_solving().unwrap();
        nqueens_phase(ConstructionPickEarlyType::Never)
            .solve(&mut scope, 0)
            .unwrap();
        assert_eq!(scope.working_solution().queens[0].row, None);
        assert!(scope.working_solution().queens[1].row.is_some());
    }

    #[test]
    fn test_phase_termination_stops_early() {
        let mut scope = nqueens_scope_for(NQueensSolution::unassigned(5));
        scope.start_solving().unwrap();
        let mut phase = nqueens_phase(ConstructionPickEarlyType::Never)
            .with_termination(Box::new(StepCountTermination::new(2)));
        phase.solve(&mut scope, 0).unwrap();
        let assigned = scope
            .working_solution()
            .queens
            .iter()
            .filter(|q| q.row.is_some())
            .count();
        assert_eq!(assigned, 2);
    }

    #[test]
    fn test_fires_step_events() {
        let listener = Arc::new(CountingEventListener::new());
        let mut events = SolverEventSupport::new();
        events.add_phase_listener(listener.clone());
        let mut scope = nqueens_scope_for(NQueensSolution::unassigned(3)).with_event_support(events);
        scope.start_solving().unwrap();
        nqueens_phase(ConstructionPickEarlyType::Never)
            .solve(&mut scope, 0)
            .unwrap();
        assert_eq!(listener.phase_started_count(), 1);
        assert_eq!(listener.step_ended_count(), 3);
        assert_eq!(listener.phase_ended_count(), 1);
    }

    fn task_phase(pick_early: ConstructionPickEarlyType) -> ConstructionHeuristicPhase<TaskSolution> {
        let placer = QueuedEntityPlacer::new(
            Box::new(FromSolutionEntitySelector::new(TASK)),
            Box::new(task_list_selector()),
        );
        ConstructionHeuristicPhase::new(placer, ConstructionForager::new(pick_early))
    }

    #[test]
    fn test_first_feasible_picks_second_of_three_without_evaluating_third() {
        // Only the second employee can take the task without exceeding capacity.
        let mut scope = task_scope(TaskSolution::new(&[2, 10, 3], &[5]));
        scope.start_solving().unwrap();

        let mut placer = QueuedEntityPlacer::new(
            Box::new(FromSolutionEntitySelector::new(TASK)),
            Box::new(task_list_selector()),
        );
        {
            let (score_director, rng) = scope.director_and_rng();
            placer.phase_started(score_director, rng);
        }
        let placement = placer.next_placement(scope.score_director()).unwrap();
        assert_eq!(placement.moves.len(), 3);

        let forager = ConstructionForager::new(ConstructionPickEarlyType::FirstFeasibleScore);
        let last = scope.calculate_score().unwrap();
        let mode = scope.environment_mode();
        let pick = forager
            .pick(scope.score_director_mut(), &placement, last, mode)
            .unwrap()
            .unwrap();
        assert_eq!(pick.index, 1);
        assert_eq!(pick.evaluated_count, 2);
        assert_eq!(pick.score, HardSoftScore::of(0, 0));

        let mut scope = task_scope(TaskSolution::new(&[2, 10, 3], &[5]));
        scope.start_solving().unwrap();
        task_phase(ConstructionPickEarlyType::FirstFeasibleScore)
            .solve(&mut scope, 0)
            .unwrap();
        assert_eq!(scope.working_solution().employees[1].tasks, vec![0]);
    }

    #[test]
    fn test_never_evaluates_every_candidate() {
        let mut scope = task_scope(TaskSolution::new(&[2, 10, 3], &[5]));
        scope.start_solving().unwrap();
        let mut placer = QueuedEntityPlacer::new(
            Box::new(FromSolutionEntitySelector::new(TASK)),
            Box::new(task_list_selector()),
        );
        {
            let (score_director, rng) = scope.director_and_rng();
            placer.phase_started(score_director, rng);
        }
        let placement = placer.next_placement(scope.score_director()).unwrap();
        let last = scope.calculate_score().unwrap();
        let mode = scope.environment_mode();
        let pick = ConstructionForager::new(ConstructionPickEarlyType::Never)
            .pick(scope.score_director_mut(), &placement, last, mode)
            .unwrap()
            .unwrap();
        assert_eq!(pick.index, 1);
        assert_eq!(pick.evaluated_count, 3);
    }

    #[test]
    fn test_empty_placement_is_empty_selection() {
        // No employees: the task has nowhere to go.
        let mut scope = task_scope(TaskSolution::new(&[], &[5]));
        scope.start_solving().unwrap();
        let error = task_phase(ConstructionPickEarlyType::Never)
            .solve(&mut scope, 0)
            .unwrap_err();
        assert!(matches!(error, OptiplanError::EmptySelection { .. }));
        assert!(error.is_recoverable());
    }
}
