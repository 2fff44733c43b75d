//! Solver phases for different solving strategies
//!
//! Phases are the main building blocks of solving:
//! - ConstructionHeuristicPhase: Builds an initial solution
//! - LocalSearchPhase: Improves an existing solution
//! - ExhaustiveSearchPhase: Explores the entire solution space
//!
//! Local search may hand its move evaluation to the [`partitioned`] workers.

pub mod construction;
pub mod exhaustive;
pub mod localsearch;
pub mod partitioned;

use std::fmt::Debug;

use optiplan_config::EnvironmentMode;
use optiplan_core::{OptiplanError, PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use smallvec::SmallVec;
use tracing::trace;

use crate::heuristic::r#move::Move;
use crate::scope::SolverScope;

/// A phase of the solving process.
///
/// Phases are executed in sequence by the solver. Each phase has its own
/// strategy for exploring or constructing solutions.
pub trait Phase<S: PlanningSolution>: Send + Debug {
    /// Executes this phase.
    ///
    /// The phase modifies the working solution in the solver scope and
    /// offers every step result to the best solution recaller. A phase that
    /// finds nothing to select returns [`OptiplanError::EmptySelection`].
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<()>;

    /// Returns the name of this phase type.
    fn phase_type_name(&self) -> &'static str;
}

impl<S: PlanningSolution> Phase<S> for Box<dyn Phase<S>> {
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<()> {
        (**self).solve(solver_scope, phase_index)
    }

    fn phase_type_name(&self) -> &'static str {
        (**self).phase_type_name()
    }
}

/// Outcome of applying a move on trial and undoing it again.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEvaluation<Sc> {
    /// Working score while the move was applied.
    pub score: Sc,
    /// Values the move assigned, read while it was applied.
    pub value_hashes: SmallVec<[u64; 2]>,
}

/// Applies `mv`, scores it and undoes it.
///
/// `before_score` is the working score before the trial. Under
/// [`EnvironmentMode::FullAssert`] both the trial score and the restored
/// score are compared with a from-scratch calculation.
pub fn evaluate_move<S: PlanningSolution>(
    score_director: &mut dyn ScoreDirector<S>,
    mv: &dyn Move<S>,
    environment_mode: EnvironmentMode,
    before_score: S::Score,
) -> Result<MoveEvaluation<S::Score>> {
    let undo = mv.do_move_with_undo(score_director)?;
    let score = score_director.calculate_score()?;
    if environment_mode.is_fully_asserted() {
        score_director.assert_working_score_from_scratch(score, &format!("trial of {mv:?}"))?;
    }
    let value_hashes = mv.planning_value_hashes(score_director);
    trace!(?score, move_ = ?mv, "Move evaluated");

    undo.do_move(score_director)?;
    if environment_mode.is_fully_asserted() {
        let restored = score_director.calculate_score()?;
        if restored != before_score {
            return Err(OptiplanError::ScoreCorruption {
                working_score: format!("{restored:?}"),
                uncorrupted_score: format!("{before_score:?}"),
                context: format!("undo of {mv:?}"),
                analysis: format!("undo move {undo:?} did not restore the score"),
            });
        }
    }
    Ok(MoveEvaluation { score, value_hashes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::r#move::ChangeMove;
    use optiplan_core::{EntityRef, SimpleScore};
    use optiplan_test::nqueens::{boxed_nqueens_director, row_accessor};
    use optiplan_test::NQueensSolution;

    #[test]
    fn test_evaluate_move_restores_working_solution() {
        let mut director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 0, 3, 1]));
        let before = director.calculate_score().unwrap();

        let mv = ChangeMove::new(EntityRef::new(0, 1), "row", row_accessor(), Some(2));
        let evaluation =
            evaluate_move(director.as_mut(), &mv, EnvironmentMode::FullAssert, before).unwrap();

        assert_eq!(before, SimpleScore::of(-1));
        assert_eq!(evaluation.score, SimpleScore::of(-1));
        assert_eq!(evaluation.value_hashes.len(), 1);
        assert_eq!(director.working_solution().rows(), vec![Some(0), Some(0), Some(3), Some(1)]);
        assert_eq!(director.calculate_score().unwrap(), before);
    }
}
