//! SimpleScore - a single-level score

use super::traits::Score;
use super::ScoreLevel;

/// A score with a single level.
///
/// Every value is feasible unless negative.
///
/// ```
/// use optiplan_core::{ParseableScore, SimpleScore};
///
/// let score = SimpleScore::of(-3);
/// assert_eq!(SimpleScore::parse("-3").unwrap(), score);
/// assert!(SimpleScore::of(1) > score);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScore {
    score: i64,
}

impl SimpleScore {
    pub const ZERO: SimpleScore = SimpleScore { score: 0 };
    pub const ONE: SimpleScore = SimpleScore { score: 1 };

    #[inline]
    pub const fn of(score: i64) -> Self {
        SimpleScore { score }
    }

    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }
}

impl Score for SimpleScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        self.score >= 0
    }

    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        1
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        vec![self.score]
    }

    fn from_level_numbers(levels: &[i64]) -> Self {
        assert_eq!(levels.len(), 1, "SimpleScore has 1 level");
        Self::of(levels[0])
    }

    level_score_scale!(score);

    fn level_label(index: usize) -> ScoreLevel {
        assert_eq!(index, 0, "SimpleScore has 1 level");
        ScoreLevel::Soft
    }
}

level_score_ops!(SimpleScore { score });
level_score_text!(SimpleScore { score => "" });
