use super::*;

#[test]
fn test_change_move_is_doable() {
    let director = board(&[0, 1, 2, 3]);
    assert!(change_row(0, 3).is_doable(&*director));
    assert!(!change_row(0, 0).is_doable(&*director));
}

#[test]
fn test_change_move_pinned_entity_is_not_doable() {
    let mut solution = NQueensSolution::with_rows(&[0, 1, 2, 3]);
    solution.queens[0].pinned = true;
    let director = boxed_nqueens_director(solution);
    assert!(!change_row(0, 3).is_doable(&*director));
}

#[test]
fn test_change_move_do_and_undo() {
    let mut director = board(&[0, 0, 0, 0]);
    let before = director.calculate_score().unwrap();
    assert_eq!(before, SimpleScore::of(-6));

    let m = change_row(1, 2);
    let undo = m.do_move_with_undo(&mut *director).unwrap();
    assert_eq!(director.working_solution().queens[1].row, Some(2));
    let after = director.calculate_score().unwrap();
    assert_eq!(after, director.calculate_score_from_scratch());
    assert!(after > before);

    undo.do_move(&mut *director).unwrap();
    assert_eq!(director.working_solution().rows(), vec![Some(0); 4]);
    assert_eq!(director.calculate_score().unwrap(), before);
}

#[test]
fn test_change_move_to_none_unassigns() {
    let mut director = board(&[0, 1, 2, 3]);
    let m = ChangeMove::new(queen(2), "row", row_accessor(), None);
    assert!(m.is_doable(&*director));
    m.do_move(&mut *director).unwrap();
    assert_eq!(director.working_solution().queens[2].row, None);
    assert_eq!(director.uninitialized_variable_count(), 1);
}

#[test]
fn test_change_move_value_hashes_follow_value() {
    let director = board(&[0, 1]);
    let a = change_row(0, 1).planning_value_hashes(&*director);
    let b = change_row(1, 1).planning_value_hashes(&*director);
    let c = change_row(1, 0).planning_value_hashes(&*director);
    assert_eq!(a, b);
    assert_ne!(a, c);
}
