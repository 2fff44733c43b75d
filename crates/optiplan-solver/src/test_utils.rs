//! Test utilities for optiplan-solver
//!
//! Builds solver scopes and selectors over the shared `optiplan-test`
//! fixtures.

use std::sync::Arc;

use optiplan_scoring::ScoreDirectorFactory;
use optiplan_test::nqueens::{boxed_nqueens_director, create_nqueens_factory, nqueens_descriptor};
use optiplan_test::task::{create_task_factory, task_descriptor, EMPLOYEE, TASK};
use optiplan_test::{NQueensSolution, TaskSolution};

use crate::heuristic::selector::{
    ChangeMoveSelector, FromSolutionEntitySelector, FromValueRangeSelector, ListChangeMoveSelector,
};
use crate::scope::SolverScope;

pub type QueenChangeSelector = ChangeMoveSelector<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    FromValueRangeSelector<NQueensSolution, i64>,
>;

/// Seeded solver scope over an N-Queens board with the given rows.
pub fn nqueens_scope(rows: &[i64]) -> SolverScope<NQueensSolution> {
    nqueens_scope_for(NQueensSolution::with_rows(rows))
}

pub fn nqueens_scope_for(solution: NQueensSolution) -> SolverScope<NQueensSolution> {
    SolverScope::new(boxed_nqueens_director(solution)).with_seed(42)
}

pub fn nqueens_factory() -> Arc<dyn ScoreDirectorFactory<NQueensSolution>> {
    Arc::new(create_nqueens_factory())
}

/// Change moves over every movable queen and every row.
pub fn queen_change_selector() -> QueenChangeSelector {
    ChangeMoveSelector::from_descriptor(&nqueens_descriptor(), 0, "row")
        .expect("row variable exists")
}

pub fn task_scope(solution: TaskSolution) -> SolverScope<TaskSolution> {
    let director = create_task_factory()
        .build_score_director(solution)
        .expect("task director");
    SolverScope::new(director).with_seed(42)
}

/// List change moves relocating tasks between employees.
pub fn task_list_selector() -> ListChangeMoveSelector<TaskSolution> {
    ListChangeMoveSelector::from_descriptor(&task_descriptor(), EMPLOYEE, TASK, "tasks")
        .expect("tasks variable exists")
}
