//! Tests for the list change move selector.

use optiplan_core::EntityRef;
use optiplan_scoring::ScoreDirector;
use optiplan_test::task::{create_task_factory, task_descriptor, EMPLOYEE, TASK};
use optiplan_test::TaskSolution;

use crate::heuristic::selector::list_change::ListChangeMoveSelector;
use crate::heuristic::selector::typed_move_selector::{MoveSelector, PlacementMoves};

fn selector() -> ListChangeMoveSelector<TaskSolution> {
    ListChangeMoveSelector::from_descriptor(&task_descriptor(), EMPLOYEE, TASK, "tasks").unwrap()
}

#[test]
fn test_relocations_are_all_doable() {
    let solution = TaskSolution::new(&[10, 10], &[1, 2, 3]).with_assignment(&[vec![0, 1], vec![2]]);
    let director = create_task_factory().build(solution).unwrap();
    let selector = selector();

    let moves: Vec<_> = selector.iter(&director).collect();
    // Task 0 and 1: one other slot at home, two slots at the other employee.
    // Task 2: none at home, three slots at the first employee.
    assert_eq!(moves.len(), 9);
    assert!(moves.iter().all(|m| m.is_doable(&director)));
}

#[test]
fn test_relocation_updates_indexes() {
    let solution = TaskSolution::new(&[10, 10], &[1, 2, 3]).with_assignment(&[vec![0, 1], vec![2]]);
    let mut director = create_task_factory().build(solution).unwrap();
    director.calculate_score().unwrap();
    let selector = selector();

    let moves: Vec<_> = selector.iter(&director).collect();
    // First move relocates task 0 behind task 1.
    moves[0].do_move(&mut director).unwrap();
    let working = director.working_solution();
    assert_eq!(working.employees[0].tasks, vec![1, 0]);
    assert_eq!(working.tasks[0].index, Some(1));
    assert_eq!(working.tasks[1].index, Some(0));
}

#[test]
fn test_placement_of_unassigned_task() {
    let solution = TaskSolution::new(&[10, 10], &[1, 2, 3]).with_assignment(&[vec![0], vec![]]);
    let director = create_task_factory().build(solution).unwrap();
    let selector = selector();

    assert!(selector.is_initialized(&director, EntityRef::new(TASK, 0)));
    assert!(!selector.is_initialized(&director, EntityRef::new(TASK, 1)));
    // Two slots at the first employee, one at the second.
    assert_eq!(selector.placement_moves(&director, EntityRef::new(TASK, 1)).len(), 3);
}
