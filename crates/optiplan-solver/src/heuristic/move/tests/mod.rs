//! Tests for the move module.

use super::*;
use optiplan_core::{ChainValue, EntityRef, OptiplanError, SimpleScore};
use optiplan_scoring::ScoreDirector;
use optiplan_test::nqueens::{boxed_nqueens_director, row_accessor};
use optiplan_test::NQueensSolution;

mod chained;
mod change;
mod composite;
mod list_change;

fn queen(index: usize) -> EntityRef {
    EntityRef::new(0, index)
}

fn change_row(index: usize, row: i64) -> ChangeMove<NQueensSolution, i64> {
    ChangeMove::new(queen(index), "row", row_accessor(), Some(row))
}

fn board(rows: &[i64]) -> Box<dyn ScoreDirector<NQueensSolution>> {
    boxed_nqueens_director(NQueensSolution::with_rows(rows))
}
