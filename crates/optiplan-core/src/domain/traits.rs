//! Core domain traits

use crate::score::Score;

/// The working solution: problem facts, planning entities and the score.
///
/// Entities live in arena-like collections owned by the solution and are
/// addressed by [`EntityRef`](super::EntityRef) handles, so a solution is a
/// plain value that can be cloned to snapshot the best solution or to give a
/// worker thread its own copy.
///
/// # Example
///
/// ```
/// use optiplan_core::{PlanningSolution, SimpleScore};
///
/// #[derive(Clone)]
/// struct NQueens {
///     rows: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for NQueens {
///     type Score = SimpleScore;
///
///     fn score(&self) -> Option<Self::Score> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<Self::Score>) {
///         self.score = score;
///     }
/// }
/// ```
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    /// The score type used to evaluate this solution.
    type Score: Score;

    /// Returns the last calculated score, if any.
    fn score(&self) -> Option<Self::Score>;

    /// Stores a calculated score on the solution.
    fn set_score(&mut self, score: Option<Self::Score>);
}
