//! Tests for change, swap and chained change move selectors.

use optiplan_core::EntityRef;
use optiplan_scoring::ScoreDirector;
use optiplan_test::nqueens::{boxed_nqueens_director, nqueens_descriptor, row_accessor};
use optiplan_test::routing::{create_routing_factory, routing_descriptor};
use optiplan_test::{NQueensSolution, RoutingSolution};

use crate::heuristic::selector::entity::FromSolutionEntitySelector;
use crate::heuristic::selector::typed_move_selector::{
    ChainedChangeMoveSelector, ChangeMoveSelector, MoveSelector, PlacementMoves, SwapMoveSelector,
};
use crate::heuristic::selector::typed_value::StaticTypedValueSelector;

#[test]
fn test_change_move_selector_yields_entity_major_order() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1]));
    let selector = ChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        StaticTypedValueSelector::new(vec![0i64, 1, 2]),
        "row",
        row_accessor(),
    );

    let moves: Vec<_> = selector.iter(&*director).collect();
    assert_eq!(moves.len(), 6);
    assert_eq!(selector.size(&*director), 6);
    assert_eq!(moves[0].planning_entities()[0], EntityRef::new(0, 0));
    assert_eq!(moves[3].planning_entities()[0], EntityRef::new(0, 1));

    let doable = moves.iter().filter(|m| m.is_doable(&*director)).count();
    assert_eq!(doable, 4);
}

#[test]
fn test_change_move_selector_from_descriptor() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1, 2, 3]));
    let selector =
        ChangeMoveSelector::<NQueensSolution, i64, _, _>::from_descriptor(&nqueens_descriptor(), 0, "row")
            .unwrap();
    assert_eq!(selector.iter(&*director).count(), 16);
}

#[test]
fn test_nullable_change_selector_offers_unassignment() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0]));
    let selector = ChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        StaticTypedValueSelector::new(vec![1i64]),
        "row",
        row_accessor(),
    )
    .with_nullable(true);
    assert_eq!(selector.iter(&*director).count(), 2);
    assert_eq!(selector.size(&*director), 2);
}

#[test]
fn test_change_selector_placement() {
    let mut solution = NQueensSolution::unassigned(3);
    solution.queens[0].row = Some(2);
    let director = boxed_nqueens_director(solution);
    let selector =
        ChangeMoveSelector::<NQueensSolution, i64, _, _>::from_descriptor(&nqueens_descriptor(), 0, "row")
            .unwrap();

    assert!(selector.is_initialized(&*director, EntityRef::new(0, 0)));
    assert!(!selector.is_initialized(&*director, EntityRef::new(0, 1)));
    assert_eq!(selector.placement_moves(&*director, EntityRef::new(0, 1)).len(), 3);
}

#[test]
fn test_swap_move_selector_pairs() {
    let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1, 2, 3]));
    let selector = SwapMoveSelector::new(FromSolutionEntitySelector::new(0), "row", row_accessor());

    let moves: Vec<_> = selector.iter(&*director).collect();
    assert_eq!(moves.len(), 6);
    assert_eq!(selector.size(&*director), 6);
    for m in &moves {
        let entities = m.planning_entities();
        assert!(entities[0] < entities[1]);
    }
}

#[test]
fn test_swap_selector_skips_pinned() {
    let mut solution = NQueensSolution::with_rows(&[0, 1, 2]);
    solution.queens[1].pinned = true;
    let director = boxed_nqueens_director(solution);
    let selector =
        SwapMoveSelector::<NQueensSolution, i64, _>::from_descriptor(&nqueens_descriptor(), 0, "row")
            .unwrap();
    assert_eq!(selector.iter(&*director).count(), 1);
}

#[test]
fn test_chained_selector_skips_self_and_places() {
    let solution = RoutingSolution::new(&[0, 100], &[10, 20, 30]).with_routes(&[vec![0], vec![1]]);
    let mut director = create_routing_factory().build(solution).unwrap();
    director.calculate_score().unwrap();

    let selector = ChainedChangeMoveSelector::from_descriptor(&routing_descriptor(), 0, "previous").unwrap();
    // 3 customers x (2 anchors + 3 customers - itself)
    assert_eq!(selector.iter(&director).count(), 12);

    assert!(selector.is_initialized(&director, EntityRef::new(0, 0)));
    assert!(!selector.is_initialized(&director, EntityRef::new(0, 2)));

    let placements = selector.placement_moves(&director, EntityRef::new(0, 2));
    let doable: Vec<_> = placements.iter().filter(|m| m.is_doable(&director)).collect();
    // Behind either anchor or either assigned customer.
    assert_eq!(doable.len(), 4);

    // Values come in range order: both anchors, then customers 0 and 1.
    placements[3].do_move(&mut director).unwrap();
    assert_eq!(director.working_solution().route(1), vec![1, 2]);
}
