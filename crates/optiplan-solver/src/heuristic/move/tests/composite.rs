use super::*;

#[test]
fn test_composite_undo_runs_in_reverse() {
    let mut director = board(&[0, 0, 0, 0]);
    let before = director.calculate_score().unwrap();

    // Both children touch queen 1; only a reverse-order undo restores row 0.
    let composite = CompositeMove::pair(Box::new(change_row(1, 2)), Box::new(change_row(1, 3)));
    let undo = composite.do_move_with_undo(&mut *director).unwrap();
    assert_eq!(director.working_solution().queens[1].row, Some(3));
    assert_eq!(
        director.calculate_score().unwrap(),
        director.calculate_score_from_scratch()
    );

    undo.do_move(&mut *director).unwrap();
    assert_eq!(director.working_solution().rows(), vec![Some(0); 4]);
    assert_eq!(director.calculate_score().unwrap(), before);
}

#[test]
fn test_composite_skips_children_that_became_no_ops() {
    let mut director = board(&[0, 1, 2, 3]);
    let composite = CompositeMove::pair(Box::new(change_row(0, 2)), Box::new(change_row(0, 2)));
    assert!(composite.is_doable(&*director));
    let undo = composite.do_move_with_undo(&mut *director).unwrap();
    undo.do_move(&mut *director).unwrap();
    assert_eq!(director.working_solution().queens[0].row, Some(0));
}

#[test]
fn test_composite_of_no_ops_is_not_doable() {
    let director = board(&[0, 1]);
    let composite = CompositeMove::pair(Box::new(change_row(0, 0)), Box::new(change_row(1, 1)));
    assert!(!composite.is_doable(&*director));
}

#[test]
fn test_composite_entities_are_deduplicated() {
    let composite: CompositeMove<NQueensSolution> = CompositeMove::new(vec![
        Box::new(change_row(0, 1)),
        Box::new(change_row(0, 2)),
        Box::new(change_row(3, 2)),
    ]);
    assert_eq!(composite.planning_entities().as_slice(), &[queen(0), queen(3)]);
    let cloned = composite.clone();
    assert_eq!(cloned.moves().len(), 3);
}
