//! Score types for representing solution quality
//!
//! A score is an ordered tuple of integer levels compared lexicographically,
//! highest-priority level first. Every score type is `Copy` and supports
//! `+`, `-` and unary `-`, which the solver uses to compute deltas.

#[macro_use]
mod macros;

mod hard_medium_soft;
mod hard_soft;
mod simple;
mod traits;


pub use hard_medium_soft::HardMediumSoftScore;
pub use hard_soft::HardSoftScore;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreParseError};

/// Semantic label of a score level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Must reach zero for the solution to be feasible
    Hard,
    /// Secondary priority
    Medium,
    /// Optimization objective
    Soft,
}
