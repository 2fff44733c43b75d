//! Tests for move selector decorators.

use optiplan_config::CacheType;
use optiplan_scoring::ScoreDirector;
use optiplan_test::nqueens::{boxed_nqueens_director, row_accessor};
use optiplan_test::NQueensSolution;
use rand::SeedableRng;

use super::*;
use crate::heuristic::r#move::Move;
use crate::heuristic::selector::entity::FromSolutionEntitySelector;
use crate::heuristic::selector::typed_move_selector::{ChangeMoveSelector, MoveSelector, SwapMoveSelector};
use crate::heuristic::selector::typed_value::StaticTypedValueSelector;
use crate::scope::SolverRng;

type Selector = ChangeMoveSelector<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    StaticTypedValueSelector<i64>,
>;

fn change_selector() -> Selector {
    ChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        StaticTypedValueSelector::new(vec![0, 1, 2, 3]),
        "row",
        row_accessor(),
    )
}

fn debug_strings<'a>(
    moves: impl Iterator<Item = crate::heuristic::r#move::BoxedMove<NQueensSolution>> + 'a,
) -> Vec<String> {
    moves.map(|m| format!("{:?}", m)).collect()
}

#[test]
fn test_filtering_keeps_doable_moves() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1, 2, 3]));
    let selector = FilteringMoveSelector::new(
        change_selector(),
        |sd: &dyn ScoreDirector<NQueensSolution>, m: &dyn Move<NQueensSolution>| m.is_doable(sd),
    );
    assert_eq!(selector.iter(&*director).count(), 12);
    assert_eq!(selector.size(&*director), 16);
}

#[test]
fn test_phase_cache_survives_steps() {
    let mut director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1]));
    let mut rng = SolverRng::seed_from_u64(1);
    let mut selector = CachingMoveSelector::new(change_selector(), CacheType::Phase);

    selector.phase_started(&*director, &mut rng);
    selector.step_started(&*director, &mut rng);
    let before = debug_strings(selector.iter(&*director));

    // Changing the board does not refresh a phase cache.
    director.working_solution_mut().queens.pop();
    selector.step_started(&*director, &mut rng);
    assert_eq!(debug_strings(selector.iter(&*director)), before);
    assert_eq!(selector.size(&*director), 8);

    selector.phase_ended();
    assert_eq!(selector.iter(&*director).count(), 4);
}

#[test]
fn test_step_cache_refreshes_every_step() {
    let mut director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1]));
    let mut rng = SolverRng::seed_from_u64(1);
    let mut selector = CachingMoveSelector::new(change_selector(), CacheType::Step);

    selector.phase_started(&*director, &mut rng);
    selector.step_started(&*director, &mut rng);
    assert_eq!(selector.iter(&*director).count(), 8);

    director.working_solution_mut().queens.pop();
    selector.step_started(&*director, &mut rng);
    assert_eq!(selector.iter(&*director).count(), 4);
}

#[test]
fn test_shuffling_is_a_seeded_permutation() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1, 2, 3]));
    let original = debug_strings(change_selector().iter(&*director));

    let mut first = ShufflingMoveSelector::new(change_selector());
    let mut second = ShufflingMoveSelector::new(change_selector());
    let mut first_rng = SolverRng::seed_from_u64(42);
    let mut second_rng = SolverRng::seed_from_u64(42);
    first.phase_started(&*director, &mut first_rng);
    second.phase_started(&*director, &mut second_rng);
    first.step_started(&*director, &mut first_rng);
    second.step_started(&*director, &mut second_rng);

    let shuffled = debug_strings(first.iter(&*director));
    assert_eq!(shuffled, debug_strings(second.iter(&*director)));
    // Same order while the step lasts.
    assert_eq!(shuffled, debug_strings(first.iter(&*director)));

    let mut sorted = shuffled.clone();
    sorted.sort();
    let mut expected = original.clone();
    expected.sort();
    assert_eq!(sorted, expected);
    assert_ne!(shuffled, original);
}

#[test]
fn test_union_chains_children() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1, 2]));
    let union = UnionMoveSelector::new(Vec::new())
        .with_child(change_selector())
        .with_child(SwapMoveSelector::new(FromSolutionEntitySelector::new(0), "row", row_accessor()));

    assert_eq!(union.len(), 2);
    assert_eq!(union.size(&*director), 12 + 3);
    let moves = debug_strings(union.iter(&*director));
    assert_eq!(moves.len(), 15);
    assert!(moves[0].starts_with("ChangeMove"));
    assert!(moves[14].starts_with("SwapMove"));
}

#[test]
fn test_cartesian_product_pairs_every_move() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1]));
    let product = CartesianProductMoveSelector::new(
        change_selector(),
        SwapMoveSelector::new(FromSolutionEntitySelector::new(0), "row", row_accessor()),
    );
    assert_eq!(product.iter(&*director).count(), 8);
    assert_eq!(product.size(&*director), 8);
}
