//! Real-time planning support.
//!
//! Problem changes submitted through a [`SolverHandle`] while the solver runs
//! are queued and applied between steps. The running phase stops, the batch is
//! applied through a [`ProblemChangeDirector`], the best solution is reset to
//! the changed working solution and the phases restart.
//!
//! # Example
//!
//! ```
//! use optiplan_core::{PlanningSolution, Result, SimpleScore};
//! use optiplan_solver::realtime::{ProblemChange, ProblemChangeDirector};
//!
//! #[derive(Clone, Debug)]
//! struct Task { id: u64, priority: i32 }
//!
//! #[derive(Clone, Debug)]
//! struct Schedule {
//!     tasks: Vec<Task>,
//!     score: Option<SimpleScore>,
//! }
//!
//! impl PlanningSolution for Schedule {
//!     type Score = SimpleScore;
//!     fn score(&self) -> Option<Self::Score> { self.score }
//!     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
//! }
//!
//! #[derive(Debug)]
//! struct AddTask { id: u64 }
//!
//! impl ProblemChange<Schedule> for AddTask {
//!     fn do_change(&self, director: &mut ProblemChangeDirector<'_, Schedule>) -> Result<()> {
//!         let id = self.id;
//!         director.add_entity(0, |s| s.tasks.push(Task { id, priority: 0 }))?;
//!         Ok(())
//!     }
//! }
//! ```

mod problem_change;
mod solver_handle;

pub use problem_change::{
    apply_problem_changes, BoxedProblemChange, ClosureProblemChange, ProblemChange,
    ProblemChangeDirector,
};
pub use solver_handle::{ProblemChangeReceiver, ProblemChangeResult, SolverHandle};
