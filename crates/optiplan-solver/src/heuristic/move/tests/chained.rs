use super::*;
use optiplan_scoring::DefaultScoreDirector;
use optiplan_test::routing::{chain_accessor, create_routing_factory, total_distance, RoutingBackend};
use optiplan_test::RoutingSolution;

type RoutingDirector = DefaultScoreDirector<RoutingSolution, RoutingBackend>;

fn routes(routes: &[Vec<usize>]) -> RoutingDirector {
    let solution = RoutingSolution::new(&[0, 100], &[10, 20, 30, 90]).with_routes(routes);
    create_routing_factory().build(solution).unwrap()
}

fn reconnect(customer: usize, to: Option<ChainValue>) -> ChainedChangeMove<RoutingSolution> {
    ChainedChangeMove::new(EntityRef::new(0, customer), "previous", chain_accessor(), to)
}

#[test]
fn test_move_to_end_of_other_chain_updates_trailing_shadows() {
    // vehicle 0 -> c0 -> c1 -> c2, vehicle 1 -> c3
    let mut director = routes(&[vec![0, 1, 2], vec![3]]);
    director.calculate_score().unwrap();

    reconnect(2, Some(ChainValue::Entity(3)))
        .do_move(&mut director)
        .unwrap();
    let score = director.calculate_score().unwrap();

    let solution = director.working_solution();
    assert_eq!(solution.customers[1].next, None);
    assert_eq!(solution.customers[3].next, Some(2));
    assert_eq!(solution.customers[2].vehicle, Some(1));
    assert_eq!(solution.route(0), vec![0, 1]);
    assert_eq!(solution.route(1), vec![3, 2]);
    assert_eq!(score.soft(), -total_distance(solution));
    assert_eq!(score, director.calculate_score_from_scratch());
}

#[test]
fn test_move_out_of_middle_closes_gap_and_undoes() {
    let mut director = routes(&[vec![0, 1, 2], vec![3]]);
    let before = director.calculate_score().unwrap();

    let undo = reconnect(1, Some(ChainValue::Anchor(1)))
        .do_move_with_undo(&mut director)
        .unwrap();
    director.calculate_score().unwrap();
    assert_eq!(director.working_solution().route(0), vec![0, 2]);
    assert_eq!(director.working_solution().route(1), vec![1, 3]);
    assert_eq!(director.working_solution().customers[3].vehicle, Some(1));

    undo.do_move(&mut director).unwrap();
    assert_eq!(director.calculate_score().unwrap(), before);
    assert_eq!(director.working_solution().route(0), vec![0, 1, 2]);
    assert_eq!(director.working_solution().route(1), vec![3]);
}

#[test]
fn test_move_behind_own_trailing_entity() {
    let mut director = routes(&[vec![0, 1, 2], vec![3]]);
    let undo = reconnect(0, Some(ChainValue::Entity(1)))
        .do_move_with_undo(&mut director)
        .unwrap();
    assert_eq!(director.working_solution().route(0), vec![1, 0, 2]);
    undo.do_move(&mut director).unwrap();
    assert_eq!(director.working_solution().route(0), vec![0, 1, 2]);
}

#[test]
fn test_insert_unassigned_and_undo_unassigns() {
    let mut director = routes(&[vec![0, 2], vec![3]]);
    assert_eq!(director.uninitialized_variable_count(), 1);

    let m = reconnect(1, Some(ChainValue::Entity(0)));
    assert!(m.is_doable(&director));
    let undo = m.do_move_with_undo(&mut director).unwrap();
    assert_eq!(director.working_solution().route(0), vec![0, 1, 2]);
    assert_eq!(director.uninitialized_variable_count(), 0);

    undo.do_move(&mut director).unwrap();
    assert_eq!(director.working_solution().route(0), vec![0, 2]);
    assert_eq!(director.working_solution().customers[1].vehicle, None);
    assert_eq!(
        director.calculate_score().unwrap(),
        director.calculate_score_from_scratch()
    );
}

#[test]
fn test_not_doable_moves() {
    let mut director = routes(&[vec![0, 1], vec![]]);
    // Already there, trailing itself, behind an unassigned entity.
    assert!(!reconnect(1, Some(ChainValue::Entity(0))).is_doable(&director));
    assert!(!reconnect(1, Some(ChainValue::Entity(1))).is_doable(&director));
    assert!(!reconnect(0, Some(ChainValue::Entity(3))).is_doable(&director));

    let err = reconnect(1, Some(ChainValue::Entity(1)))
        .do_move(&mut director)
        .unwrap_err();
    assert!(matches!(err, OptiplanError::MoveNotDoable(_)));
}
