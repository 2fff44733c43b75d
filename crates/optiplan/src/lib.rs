//! OptiPlan - a move-based incremental optimization engine in Rust
//!
//! Describe the planning entities and variables with a
//! [`SolutionDescriptor`](optiplan_core::SolutionDescriptor), score them with a
//! [`ScoreBackend`](optiplan_scoring::ScoreBackend), register the selectors
//! in [`PhaseComponents`] and hand everything to [`run_solver`] or a
//! [`SolverFactory`].
//!
//! # Example
//!
//! ```rust
//! use optiplan::prelude::*;
//!
//! // Score types are re-exported
//! let score = HardSoftScore::of(0, -100);
//! assert_eq!(score.hard(), 0);
//! assert_eq!(score.soft(), -100);
//! ```

pub use optiplan_config as config;
pub use optiplan_core as core;
pub use optiplan_scoring as scoring;
pub use optiplan_solver as solver;

pub use optiplan_config::SolverConfig;
pub use optiplan_core::{
    HardMediumSoftScore, HardSoftScore, OptiplanError, ParseableScore, PlanningSolution, Result,
    Score, SimpleScore,
};
pub use optiplan_solver::{PhaseComponents, Solver, SolverFactory, SolverHandle, SolverOutcome};

#[cfg(feature = "console")]
pub mod console;

mod run;
pub use run::{default_solver_config, run_solver};

pub mod prelude {
    pub use super::{run_solver, PhaseComponents, SolverConfig, SolverFactory, SolverOutcome};
    pub use super::{HardMediumSoftScore, HardSoftScore, ParseableScore, Score, SimpleScore};
    pub use optiplan_core::{EntityRef, PlanningSolution, SolutionDescriptor};
    pub use optiplan_scoring::{ScoreDirector, ScoreDirectorFactory};
    pub use optiplan_solver::{
        ChangeMoveSelector, EntitySelector, FromSolutionEntitySelector, ListChangeMoveSelector,
        MoveSelector, PlacementMoves, SwapMoveSelector,
    };
}
