//! Construction forager
//!
//! Picks one placement move per step. Every candidate is applied on trial,
//! scored and undone; the pick-early policy may end the evaluation before the
//! last candidate.

use optiplan_config::{ConstructionPickEarlyType, EnvironmentMode};
use optiplan_core::{PlanningSolution, Result, Score};
use optiplan_scoring::ScoreDirector;
use tracing::trace;

use super::Placement;
use crate::phase::evaluate_move;

/// The move a construction step settles on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForagerPick<Sc> {
    /// Index of the picked move within the placement.
    pub index: usize,
    pub score: Sc,
    /// Candidates scored before the pick was made.
    pub evaluated_count: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructionForager {
    pick_early_type: ConstructionPickEarlyType,
}

impl ConstructionForager {
    pub fn new(pick_early_type: ConstructionPickEarlyType) -> Self {
        Self { pick_early_type }
    }

    pub fn pick_early_type(&self) -> ConstructionPickEarlyType {
        self.pick_early_type
    }

    /// True if `score` ends the evaluation of the current placement.
    pub fn is_picked_early<Sc: Score>(&self, score: &Sc, last_step_score: &Sc) -> bool {
        match self.pick_early_type {
            ConstructionPickEarlyType::Never => false,
            ConstructionPickEarlyType::FirstNonDeterioratingScore => score >= last_step_score,
            ConstructionPickEarlyType::FirstFeasibleScore => score.is_feasible(),
            ConstructionPickEarlyType::FirstFeasibleScoreOrNonDeterioratingHard => {
                score.is_hard_non_deteriorating(last_step_score)
            }
        }
    }

    /// Evaluates the placement's moves in order and picks one.
    ///
    /// The best score wins unless a candidate is picked early; ties go to the
    /// first seen. Returns `None` for an empty placement. The working solution
    /// is left as it was.
    pub fn pick<S: PlanningSolution>(
        &self,
        score_director: &mut dyn ScoreDirector<S>,
        placement: &Placement<S>,
        last_step_score: S::Score,
        environment_mode: EnvironmentMode,
    ) -> Result<Option<ForagerPick<S::Score>>> {
        let mut best: Option<ForagerPick<S::Score>> = None;
        for (index, mv) in placement.moves.iter().enumerate() {
            let evaluation =
                evaluate_move(score_director, mv.as_ref(), environment_mode, last_step_score)?;
            let candidate = ForagerPick {
                index,
                score: evaluation.score,
                evaluated_count: index + 1,
            };
            if self.is_picked_early(&candidate.score, &last_step_score) {
                trace!(index, score = ?candidate.score, "Picked early");
                return Ok(Some(candidate));
            }
            match &mut best {
                Some(b) if candidate.score > b.score => *b = candidate,
                Some(b) => b.evaluated_count = index + 1,
                None => best = Some(candidate),
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiplan_core::{HardSoftScore, SimpleScore};

    #[test]
    fn test_pick_early_policies() {
        let last = HardSoftScore::of(-2, -10);

        let never = ConstructionForager::new(ConstructionPickEarlyType::Never);
        assert!(!never.is_picked_early(&HardSoftScore::of(0, 0), &last));

        let non_deteriorating =
            ConstructionForager::new(ConstructionPickEarlyType::FirstNonDeterioratingScore);
        assert!(non_deteriorating.is_picked_early(&last, &last));
        assert!(!non_deteriorating.is_picked_early(&HardSoftScore::of(-2, -11), &last));

        let feasible = ConstructionForager::new(ConstructionPickEarlyType::FirstFeasibleScore);
        assert!(feasible.is_picked_early(&HardSoftScore::of(0, -50), &last));
        assert!(!feasible.is_picked_early(&HardSoftScore::of(-1, 0), &last));

        let hard = ConstructionForager::new(
            ConstructionPickEarlyType::FirstFeasibleScoreOrNonDeterioratingHard,
        );
        assert!(hard.is_picked_early(&HardSoftScore::of(-2, -40), &last));
        assert!(!hard.is_picked_early(&HardSoftScore::of(-3, 0), &last));
    }

    #[test]
    fn test_default_never_picks_early() {
        let forager = ConstructionForager::default();
        assert_eq!(forager.pick_early_type(), ConstructionPickEarlyType::Never);
        assert!(!forager.is_picked_early(&SimpleScore::of(5), &SimpleScore::of(0)));
    }
}
