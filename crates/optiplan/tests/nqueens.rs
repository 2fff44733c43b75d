//! End-to-end solving through the facade crate.

use std::sync::Arc;

use optiplan::config::{
    AcceptorConfig, ConstructionHeuristicConfig, ExhaustiveSearchConfig, LocalSearchConfig,
    PhaseConfig, TerminationConfig,
};
use optiplan::prelude::*;
use optiplan_test::nqueens::{calculate_conflicts, create_nqueens_factory, nqueens_descriptor};
use optiplan_test::NQueensSolution;

type QueenSelector = ChangeMoveSelector<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    optiplan::solver::FromValueRangeSelector<NQueensSolution, i64>,
>;

fn queen_selector() -> optiplan::Result<QueenSelector> {
    ChangeMoveSelector::from_descriptor(&nqueens_descriptor(), 0, "row")
}

fn components() -> PhaseComponents<NQueensSolution> {
    PhaseComponents::new(
        || Ok(Box::new(FromSolutionEntitySelector::new(0)) as Box<dyn EntitySelector<NQueensSolution>>),
        || Ok(Box::new(queen_selector()?) as Box<dyn PlacementMoves<NQueensSolution>>),
    )
    .with_move_selector(|| Ok(Box::new(queen_selector()?) as Box<dyn MoveSelector<NQueensSolution>>))
}

fn factory() -> Arc<dyn ScoreDirectorFactory<NQueensSolution>> {
    Arc::new(create_nqueens_factory())
}

#[test]
fn construction_then_tabu_search_keeps_score_consistent() {
    let config = SolverConfig::new()
        .with_random_seed(5)
        .with_termination(TerminationConfig {
            best_score_limit: Some("0".to_string()),
            step_count_limit: Some(300),
            ..TerminationConfig::default()
        })
        .with_phase(PhaseConfig::ConstructionHeuristic(ConstructionHeuristicConfig::default()))
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig {
            acceptor: Some(AcceptorConfig {
                entity_tabu_size: Some(3),
                ..AcceptorConfig::default()
            }),
            ..LocalSearchConfig::default()
        }));
    let mut solver = SolverFactory::new(config, factory(), components())
        .build_solver()
        .unwrap();

    let outcome = solver.solve(NQueensSolution::unassigned(8)).unwrap();

    assert!(outcome.solution.rows().iter().all(Option::is_some));
    assert_eq!(
        outcome.score,
        Some(SimpleScore::of(-calculate_conflicts(&outcome.solution)))
    );
    assert!(outcome.step_count <= 300 + 8);
    assert!(outcome.empty_selections.is_empty());
}

#[test]
fn same_seed_gives_same_result() {
    let config = SolverConfig::new()
        .with_random_seed(99)
        .with_termination(TerminationConfig {
            step_count_limit: Some(50),
            ..TerminationConfig::default()
        })
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig {
            acceptor: Some(AcceptorConfig {
                simulated_annealing_starting_temperature: Some("2".to_string()),
                ..AcceptorConfig::default()
            }),
            ..LocalSearchConfig::default()
        }));
    let solver_factory = SolverFactory::new(config, factory(), components());
    let start = NQueensSolution::with_rows(&[0, 0, 0, 0, 0, 0]);

    let first = solver_factory.build_solver().unwrap().solve(start.clone()).unwrap();
    let second = solver_factory.build_solver().unwrap().solve(start).unwrap();

    assert_eq!(first.score, second.score);
    assert_eq!(first.solution.rows(), second.solution.rows());
}

#[test]
fn exhaustive_search_proves_five_queens_solvable() {
    let config = SolverConfig::new()
        .with_phase(PhaseConfig::ExhaustiveSearch(ExhaustiveSearchConfig::default()));
    let mut solver = SolverFactory::new(config, factory(), components())
        .build_solver()
        .unwrap();

    let outcome = solver.solve(NQueensSolution::unassigned(5)).unwrap();

    assert_eq!(outcome.score, Some(SimpleScore::of(0)));
    assert_eq!(calculate_conflicts(&outcome.solution), 0);
}
