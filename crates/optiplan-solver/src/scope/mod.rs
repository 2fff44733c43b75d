//! Scope hierarchy for solver execution.
//!
//! Scopes maintain state at different levels of the solving process:
//! - [`SolverScope`]: Top-level, owns the score director and the best solution
//! - [`PhaseScope`]: Per-phase state, borrows the solver scope
//! - [`StepScope`]: Per-step bookkeeping within a phase
//!
//! Terminations and lifecycle listeners never see the scopes themselves; they
//! receive a [`ScopeSnapshot`] of the counters they need.

mod phase;
mod solver;
mod step;

use std::time::Duration;

use rand_chacha::ChaCha8Rng;

pub use phase::PhaseScope;
pub use solver::SolverScope;
pub use step::StepScope;

/// Random generator shared by all stochastic decisions of one solver.
pub type SolverRng = ChaCha8Rng;

/// Counters of a solver or phase scope at one point in time.
///
/// For a solver-level snapshot `phase_index` is `None` and the counters cover
/// the whole run; for a phase-level snapshot they cover the current phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeSnapshot<Sc> {
    pub phase_index: Option<usize>,
    pub elapsed: Duration,
    pub step_count: u64,
    /// Steps since the best solution last improved.
    pub unimproved_step_count: u64,
    /// Time since the best solution last improved.
    pub unimproved_time: Duration,
    pub best_score: Option<Sc>,
    /// True when the best solution has every genuine variable assigned.
    pub best_initialized: bool,
    pub last_step_score: Option<Sc>,
    pub calculation_count: u64,
}
