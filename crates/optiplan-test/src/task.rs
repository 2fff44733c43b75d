//! List-variable task assignment fixtures.
//!
//! Employees own an ordered list of tasks. Each task knows its position in
//! that list through an index shadow. Waiting time (index × duration) is soft,
//! exceeding an employee's capacity is hard.

use optiplan_core::domain::listener::{IndexVariableListener, VariableListenerGraph};
use optiplan_core::domain::{
    EntityDescriptor, ListVariableAccessor, ShadowKind, VariableAccessor, VariableDescriptor,
};
use optiplan_core::{HardSoftScore, PlanningSolution, Result, SolutionDescriptor};
use optiplan_scoring::{ConstraintSetBackend, DefaultScoreDirectorFactory, UniConstraint};

pub const EMPLOYEE: usize = 0;
pub const TASK: usize = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct Employee {
    pub id: u64,
    pub capacity: i64,
    pub tasks: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: u64,
    pub duration: i64,
    /// Shadow: position in the owning employee's list.
    pub index: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct TaskSolution {
    pub employees: Vec<Employee>,
    pub tasks: Vec<Task>,
    pub score: Option<HardSoftScore>,
}

impl TaskSolution {
    /// Employees with the given capacities and unassigned tasks with the
    /// given durations.
    pub fn new(capacities: &[i64], durations: &[i64]) -> Self {
        Self {
            employees: capacities
                .iter()
                .enumerate()
                .map(|(i, &capacity)| Employee {
                    id: i as u64,
                    capacity,
                    tasks: Vec::new(),
                })
                .collect(),
            tasks: durations
                .iter()
                .enumerate()
                .map(|(i, &duration)| Task {
                    id: i as u64,
                    duration,
                    index: None,
                })
                .collect(),
            score: None,
        }
    }

    pub fn with_assignment(mut self, assignment: &[Vec<usize>]) -> Self {
        for (employee, tasks) in assignment.iter().enumerate() {
            self.employees[employee].tasks = tasks.clone();
        }
        self
    }

    pub fn load(&self, employee: usize) -> i64 {
        self.employees[employee]
            .tasks
            .iter()
            .map(|&t| self.tasks[t].duration)
            .sum()
    }
}

impl PlanningSolution for TaskSolution {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

fn employee_count(s: &TaskSolution) -> usize {
    s.employees.len()
}

fn task_count(s: &TaskSolution) -> usize {
    s.tasks.len()
}

pub fn tasks_accessor() -> ListVariableAccessor<TaskSolution> {
    ListVariableAccessor {
        len: |s: &TaskSolution, owner| s.employees[owner].tasks.len(),
        element: |s: &TaskSolution, owner, position| s.employees[owner].tasks[position],
        insert: |s: &mut TaskSolution, owner, position, element| {
            s.employees[owner].tasks.insert(position, element)
        },
        remove: |s: &mut TaskSolution, owner, position| s.employees[owner].tasks.remove(position),
        element_count: task_count,
    }
}

pub fn task_descriptor() -> SolutionDescriptor<TaskSolution> {
    SolutionDescriptor::new("TaskSolution")
        .with_entity(
            EntityDescriptor::new::<Employee>("Employee", employee_count)
                .with_planning_id(|s: &TaskSolution, i| s.employees[i].id)
                .with_variable(VariableDescriptor::list("tasks", tasks_accessor())),
        )
        .with_entity(
            EntityDescriptor::new::<Task>("Task", task_count)
                .with_planning_id(|s: &TaskSolution, i| s.tasks[i].id)
                .with_variable(
                    VariableDescriptor::shadow("index", "tasks", ShadowKind::Index)
                        .with_shadow_accessor(VariableAccessor::new(
                            |s: &TaskSolution, i| s.tasks[i].index,
                            |s: &mut TaskSolution, i, v| s.tasks[i].index = v,
                        )),
                ),
        )
}

pub fn task_listeners(
    descriptor: &SolutionDescriptor<TaskSolution>,
) -> Result<VariableListenerGraph<TaskSolution>> {
    Ok(VariableListenerGraph::new().with_listener(IndexVariableListener::new(
        descriptor, EMPLOYEE, "tasks", TASK, "index",
    )?))
}

fn waiting_time(s: &TaskSolution, t: usize) -> HardSoftScore {
    let task = &s.tasks[t];
    task.index
        .map_or(HardSoftScore::ZERO, |index| {
            HardSoftScore::of_soft(-(index as i64) * task.duration)
        })
}

fn over_capacity(s: &TaskSolution, e: usize) -> HardSoftScore {
    let excess = s.load(e) - s.employees[e].capacity;
    if excess > 0 {
        HardSoftScore::of_hard(-excess)
    } else {
        HardSoftScore::ZERO
    }
}

pub type TaskBackend = ConstraintSetBackend<
    TaskSolution,
    (
        UniConstraint<TaskSolution, HardSoftScore>,
        UniConstraint<TaskSolution, HardSoftScore>,
    ),
>;

pub fn task_backend() -> TaskBackend {
    ConstraintSetBackend::new((
        UniConstraint::new("over capacity", EMPLOYEE, employee_count, over_capacity),
        UniConstraint::new("waiting time", TASK, task_count, waiting_time),
    ))
}

pub fn create_task_factory() -> DefaultScoreDirectorFactory<TaskSolution, TaskBackend> {
    DefaultScoreDirectorFactory::new(task_descriptor(), task_backend)
        .expect("task descriptor is valid")
        .with_listeners(task_listeners)
}
