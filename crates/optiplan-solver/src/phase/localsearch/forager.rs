//! Foragers for local search move selection
//!
//! The forager collects the accepted moves of a step and picks the one to
//! apply. Moves are referred to by their index in the step's move arena.

use optiplan_config::LocalSearchPickEarlyType;
use optiplan_core::Score;

/// Collects accepted moves and selects the winner of a step.
///
/// The winner is the accepted move with the highest score; ties go to the
/// move accepted first. The forager quits early once
/// `accepted_count_limit` moves were accepted or, depending on the pick-early
/// type, as soon as an accepted move improves the best or the last step score.
#[derive(Debug, Clone)]
pub struct LocalSearchForager<Sc> {
    accepted_count_limit: Option<usize>,
    pick_early_type: LocalSearchPickEarlyType,
    accepted_count: usize,
    best_score: Option<Sc>,
    last_step_score: Option<Sc>,
    picked: Option<(usize, Sc)>,
    quit_early: bool,
}

impl<Sc: Score> LocalSearchForager<Sc> {
    pub fn new(accepted_count_limit: Option<usize>, pick_early_type: LocalSearchPickEarlyType) -> Self {
        Self {
            accepted_count_limit,
            pick_early_type,
            accepted_count: 0,
            best_score: None,
            last_step_score: None,
            picked: None,
            quit_early: false,
        }
    }

    pub fn accepted_count_limit(&self) -> Option<usize> {
        self.accepted_count_limit
    }

    pub fn pick_early_type(&self) -> LocalSearchPickEarlyType {
        self.pick_early_type
    }

    /// Resets the collected moves for a new step.
    pub fn step_started(&mut self, best_score: Sc, last_step_score: Sc) {
        self.accepted_count = 0;
        self.best_score = Some(best_score);
        self.last_step_score = Some(last_step_score);
        self.picked = None;
        self.quit_early = false;
    }

    /// Records an accepted move.
    pub fn add_move(&mut self, index: usize, score: Sc) {
        self.accepted_count += 1;
        if self.picked.map_or(true, |(_, picked)| score > picked) {
            self.picked = Some((index, score));
        }
        let improves = |reference: Option<Sc>| reference.is_some_and(|r| score > r);
        let pick_early = match self.pick_early_type {
            LocalSearchPickEarlyType::Never => false,
            LocalSearchPickEarlyType::FirstBestScoreImproving => improves(self.best_score),
            LocalSearchPickEarlyType::FirstLastStepScoreImproving => improves(self.last_step_score),
        };
        if pick_early {
            self.picked = Some((index, score));
            self.quit_early = true;
        }
        if self
            .accepted_count_limit
            .is_some_and(|limit| self.accepted_count >= limit)
        {
            self.quit_early = true;
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted_count
    }

    /// True if the remaining moves of the step need not be evaluated.
    pub fn is_quit_early(&self) -> bool {
        self.quit_early
    }

    /// Index and score of the winning move, if any move was accepted.
    pub fn pick_move(&self) -> Option<(usize, Sc)> {
        self.picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiplan_core::SimpleScore;

    fn s(v: i64) -> SimpleScore {
        SimpleScore::of(v)
    }

    #[test]
    fn test_highest_score_wins_ties_to_first() {
        let mut forager = LocalSearchForager::new(None, LocalSearchPickEarlyType::Never);
        forager.step_started(s(0), s(-5));
        forager.add_move(0, s(-6));
        forager.add_move(1, s(-3));
        forager.add_move(2, s(-3));
        forager.add_move(3, s(-4));
        assert!(!forager.is_quit_early());
        assert_eq!(forager.pick_move(), Some((1, s(-3))));
        assert_eq!(forager.accepted_count(), 4);
    }

    #[test]
    fn test_accepted_count_limit_quits_early() {
        let mut forager = LocalSearchForager::new(Some(2), LocalSearchPickEarlyType::Never);
        forager.step_started(s(0), s(-5));
        forager.add_move(0, s(-7));
        assert!(!forager.is_quit_early());
        forager.add_move(4, s(-6));
        assert!(forager.is_quit_early());
        assert_eq!(forager.pick_move(), Some((4, s(-6))));
    }

    #[test]
    fn test_first_last_step_score_improving() {
        let mut forager =
            LocalSearchForager::new(None, LocalSearchPickEarlyType::FirstLastStepScoreImproving);
        forager.step_started(s(0), s(-5));
        forager.add_move(0, s(-5));
        assert!(!forager.is_quit_early());
        forager.add_move(1, s(-4));
        assert!(forager.is_quit_early());
        assert_eq!(forager.pick_move(), Some((1, s(-4))));
    }

    #[test]
    fn test_first_best_score_improving() {
        let mut forager =
            LocalSearchForager::new(None, LocalSearchPickEarlyType::FirstBestScoreImproving);
        forager.step_started(s(-2), s(-5));
        forager.add_move(0, s(-3));
        assert!(!forager.is_quit_early());
        forager.add_move(1, s(-1));
        assert!(forager.is_quit_early());
    }

    #[test]
    fn test_step_started_resets() {
        let mut forager = LocalSearchForager::new(Some(1), LocalSearchPickEarlyType::Never);
        forager.step_started(s(0), s(0));
        forager.add_move(0, s(1));
        forager.step_started(s(1), s(1));
        assert!(forager.pick_move().is_none());
        assert!(!forager.is_quit_early());
    }
}
