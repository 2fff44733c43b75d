use super::*;
use optiplan_scoring::DefaultScoreDirector;
use optiplan_test::task::{create_task_factory, tasks_accessor, TaskBackend, EMPLOYEE};
use optiplan_test::TaskSolution;

type TaskDirector = DefaultScoreDirector<TaskSolution, TaskBackend>;

fn assignment(lists: &[Vec<usize>]) -> TaskDirector {
    let solution = TaskSolution::new(&[5, 5], &[2, 3, 4, 1]).with_assignment(lists);
    create_task_factory().build(solution).unwrap()
}

fn relocate(
    element: usize,
    source: Option<(usize, usize)>,
    destination: Option<(usize, usize)>,
) -> ListChangeMove<TaskSolution> {
    let position = |(owner, position)| ListPosition::new(owner, position);
    ListChangeMove::new(
        EMPLOYEE,
        "tasks",
        tasks_accessor(),
        element,
        source.map(position),
        destination.map(position),
    )
}

fn indices(director: &TaskDirector) -> Vec<Option<usize>> {
    director.working_solution().tasks.iter().map(|t| t.index).collect()
}

#[test]
fn test_relocate_within_list() {
    let mut director = assignment(&[vec![0, 1, 2], vec![3]]);
    let before = director.calculate_score().unwrap();

    let undo = relocate(0, Some((0, 0)), Some((0, 2)))
        .do_move_with_undo(&mut director)
        .unwrap();
    assert_eq!(director.working_solution().employees[0].tasks, vec![1, 2, 0]);
    assert_eq!(indices(&director), vec![Some(2), Some(0), Some(1), Some(0)]);
    assert_eq!(
        director.calculate_score().unwrap(),
        director.calculate_score_from_scratch()
    );

    undo.do_move(&mut director).unwrap();
    assert_eq!(director.working_solution().employees[0].tasks, vec![0, 1, 2]);
    assert_eq!(director.calculate_score().unwrap(), before);
}

#[test]
fn test_relocate_between_lists() {
    let mut director = assignment(&[vec![0, 1, 2], vec![3]]);
    let before = director.calculate_score().unwrap();
    assert_eq!(before.hard(), -4);

    let undo = relocate(2, Some((0, 2)), Some((1, 0)))
        .do_move_with_undo(&mut director)
        .unwrap();
    let score = director.calculate_score().unwrap();
    assert_eq!(director.working_solution().employees[1].tasks, vec![2, 3]);
    assert_eq!(indices(&director), vec![Some(0), Some(1), Some(0), Some(1)]);
    assert_eq!(score.hard(), 0);
    assert_eq!(score, director.calculate_score_from_scratch());

    undo.do_move(&mut director).unwrap();
    assert_eq!(director.calculate_score().unwrap(), before);
}

#[test]
fn test_assign_and_unassign() {
    let mut director = assignment(&[vec![0], vec![]]);
    assert_eq!(director.uninitialized_variable_count(), 3);

    relocate(1, None, Some((0, 0))).do_move(&mut director).unwrap();
    assert_eq!(director.working_solution().employees[0].tasks, vec![1, 0]);
    assert_eq!(indices(&director)[0], Some(1));
    assert_eq!(director.uninitialized_variable_count(), 2);

    relocate(0, Some((0, 1)), None).do_move(&mut director).unwrap();
    assert_eq!(indices(&director)[0], None);
    assert_eq!(director.uninitialized_variable_count(), 3);
    assert_eq!(
        director.calculate_score().unwrap(),
        director.calculate_score_from_scratch()
    );
}

#[test]
fn test_invalid_positions_are_not_doable() {
    let mut director = assignment(&[vec![0, 1], vec![]]);
    assert!(!relocate(0, Some((0, 0)), Some((0, 0))).is_doable(&director));
    assert!(!relocate(0, Some((0, 0)), Some((1, 1))).is_doable(&director));
    assert!(!relocate(1, Some((0, 0)), Some((1, 0))).is_doable(&director));
    assert!(relocate(0, Some((0, 0)), Some((1, 0))).is_doable(&director));

    let err = relocate(0, Some((0, 5)), Some((1, 0)))
        .do_move(&mut director)
        .unwrap_err();
    assert!(matches!(err, OptiplanError::MoveNotDoable(_)));
}
