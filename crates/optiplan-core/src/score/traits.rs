//! The `Score` trait and score parsing.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

use super::ScoreLevel;

/// Quality of a planning solution.
///
/// Higher is better. The hard level (index 0 for multi-level scores) decides
/// feasibility; lower levels only break ties of the levels above them.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Hash
    + Send
    + Sync
    + Eq
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true if no hard level is negative.
    fn is_feasible(&self) -> bool;

    /// The additive identity.
    fn zero() -> Self;

    /// Number of levels of this score type.
    fn levels_count() -> usize;

    /// Level values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Builds a score from level values, highest priority first.
    ///
    /// # Panics
    /// Panics if `levels.len() != levels_count()`.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// Multiplies every level, rounding to the nearest integer.
    fn multiply(&self, multiplicand: f64) -> Self;

    /// Divides every level, rounding to the nearest integer.
    fn divide(&self, divisor: f64) -> Self;

    /// Absolute value of every level.
    fn abs(&self) -> Self;

    /// Label of the level at `index`.
    fn level_label(index: usize) -> ScoreLevel;

    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }

    /// Returns true if the levels labelled hard are all zero or positive in
    /// `self - other`, i.e. moving from `other` to `self` did not lose hard score.
    fn is_hard_non_deteriorating(&self, other: &Self) -> bool {
        (*self - *other).is_feasible()
    }
}

/// Scores that round-trip through their `"-1hard/-20soft"` text form.
pub trait ParseableScore: Score {
    /// Parses a score, e.g. `"-3"`, `"0hard/-100soft"` or `"0hard/-2medium/-7soft"`.
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Text form accepted by [`ParseableScore::parse`].
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

impl ScoreParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot parse score: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}
