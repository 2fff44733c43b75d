//! N-Queens problem test fixtures.
//!
//! Places N queens on an N×N board, one per column; the planning variable is
//! the row of each queen. Two queens conflict when they share a row or a
//! diagonal.
//!
//! # Example
//!
//! ```
//! use optiplan_core::SimpleScore;
//! use optiplan_scoring::ScoreDirector;
//! use optiplan_test::nqueens::create_nqueens_director;
//!
//! let mut director = create_nqueens_director(&[0, 2, 1, 3]);
//! assert_eq!(director.calculate_score().unwrap(), SimpleScore::of(-2));
//! ```

use std::sync::Arc;

use optiplan_core::domain::{EntityDescriptor, VariableAccessor, VariableDescriptor};
use optiplan_core::{PlanningSolution, SimpleScore, SolutionDescriptor, ValueRange};
use optiplan_scoring::{
    BiConstraint, ConstraintSetBackend, DefaultScoreDirector, DefaultScoreDirectorFactory,
    ScoreDirector,
};

/// A queen entity in the N-Queens problem.
///
/// `column` is a problem fact, `row` is the planning variable. Pinned queens
/// are never moved by the solver.
#[derive(Clone, Debug, PartialEq)]
pub struct Queen {
    pub id: u64,
    pub column: i64,
    pub row: Option<i64>,
    pub pinned: bool,
}

impl Queen {
    pub fn new(id: u64, column: i64, row: Option<i64>) -> Self {
        Self {
            id,
            column,
            row,
            pinned: false,
        }
    }

    pub fn assigned(id: u64, column: i64, row: i64) -> Self {
        Self::new(id, column, Some(row))
    }

    pub fn unassigned(id: u64, column: i64) -> Self {
        Self::new(id, column, None)
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// N-Queens planning solution.
#[derive(Clone, Debug)]
pub struct NQueensSolution {
    pub n: usize,
    pub queens: Vec<Queen>,
    pub score: Option<SimpleScore>,
}

impl NQueensSolution {
    /// A board of size `queens.len()`.
    pub fn new(queens: Vec<Queen>) -> Self {
        Self {
            n: queens.len(),
            queens,
            score: None,
        }
    }

    /// One queen per column, rows taken from `rows`.
    pub fn with_rows(rows: &[i64]) -> Self {
        Self::new(
            rows.iter()
                .enumerate()
                .map(|(i, &row)| Queen::assigned(i as u64, i as i64, row))
                .collect(),
        )
    }

    /// `n` queens with no row assigned.
    pub fn unassigned(n: usize) -> Self {
        Self::new(
            (0..n)
                .map(|i| Queen::unassigned(i as u64, i as i64))
                .collect(),
        )
    }

    pub fn rows(&self) -> Vec<Option<i64>> {
        self.queens.iter().map(|q| q.row).collect()
    }
}

impl PlanningSolution for NQueensSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

pub fn get_queen_row(solution: &NQueensSolution, index: usize) -> Option<i64> {
    solution.queens.get(index).and_then(|q| q.row)
}

pub fn set_queen_row(solution: &mut NQueensSolution, index: usize, row: Option<i64>) {
    if let Some(queen) = solution.queens.get_mut(index) {
        queen.row = row;
    }
}

pub fn row_accessor() -> VariableAccessor<NQueensSolution, i64> {
    VariableAccessor::new(get_queen_row, set_queen_row)
}

fn queen_count(solution: &NQueensSolution) -> usize {
    solution.queens.len()
}

fn row_range(solution: &NQueensSolution) -> Vec<i64> {
    (0..solution.n as i64).collect()
}

/// Solution descriptor with a single `Queen` entity and its `row` variable.
pub fn nqueens_descriptor() -> SolutionDescriptor<NQueensSolution> {
    SolutionDescriptor::new("NQueensSolution").with_entity(
        EntityDescriptor::new::<Queen>("Queen", queen_count)
            .with_movable_filter(|s: &NQueensSolution, i| !s.queens[i].pinned)
            .with_planning_id(|s: &NQueensSolution, i| s.queens[i].id)
            .with_variable(
                VariableDescriptor::genuine("row", row_accessor())
                    .with_value_range(ValueRange::computed(row_range)),
            ),
    )
}

/// Conflict weight of one pair of queens.
pub fn queen_conflict(solution: &NQueensSolution, a: usize, b: usize) -> SimpleScore {
    let (qa, qb) = (&solution.queens[a], &solution.queens[b]);
    match (qa.row, qb.row) {
        (Some(ra), Some(rb)) => {
            let column_distance = (qa.column - qb.column).abs();
            if ra == rb || (ra - rb).abs() == column_distance {
                SimpleScore::of(-1)
            } else {
                SimpleScore::ZERO
            }
        }
        _ => SimpleScore::ZERO,
    }
}

/// Number of conflicting pairs, calculated from scratch.
pub fn calculate_conflicts(solution: &NQueensSolution) -> i64 {
    let n = solution.queens.len();
    let mut conflicts = 0;
    for a in 0..n {
        for b in (a + 1)..n {
            if queen_conflict(solution, a, b) != SimpleScore::ZERO {
                conflicts += 1;
            }
        }
    }
    conflicts
}

pub type NQueensBackend =
    ConstraintSetBackend<NQueensSolution, (BiConstraint<NQueensSolution, SimpleScore>,)>;

pub fn nqueens_backend() -> NQueensBackend {
    ConstraintSetBackend::new((BiConstraint::new(
        "queen conflict",
        0,
        queen_count,
        queen_conflict,
    ),))
}

pub fn create_nqueens_factory() -> DefaultScoreDirectorFactory<NQueensSolution, NQueensBackend> {
    DefaultScoreDirectorFactory::new(nqueens_descriptor(), nqueens_backend)
        .expect("n-queens descriptor is valid")
}

/// Director over a board with the given rows.
pub fn create_nqueens_director(
    rows: &[i64],
) -> DefaultScoreDirector<NQueensSolution, NQueensBackend> {
    create_director_for(NQueensSolution::with_rows(rows))
}

pub fn create_director_for(
    solution: NQueensSolution,
) -> DefaultScoreDirector<NQueensSolution, NQueensBackend> {
    DefaultScoreDirector::new(solution, Arc::new(nqueens_descriptor()), nqueens_backend())
        .expect("n-queens director")
}

/// Boxed director, the form phases and moves work with.
pub fn boxed_nqueens_director(solution: NQueensSolution) -> Box<dyn ScoreDirector<NQueensSolution>> {
    Box::new(create_director_for(solution))
}
