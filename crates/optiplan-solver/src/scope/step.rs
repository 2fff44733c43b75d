//! Step-level scope.

use std::time::Instant;

use optiplan_core::Score;

/// Bookkeeping of a single step within a phase.
#[derive(Debug, Clone)]
pub struct StepScope<Sc> {
    step_index: u64,
    score: Option<Sc>,
    selected_move_count: u64,
    accepted_move_count: u64,
    start_time: Instant,
}

impl<Sc: Score> StepScope<Sc> {
    pub fn new(step_index: u64) -> Self {
        Self {
            step_index,
            score: None,
            selected_move_count: 0,
            accepted_move_count: 0,
            start_time: Instant::now(),
        }
    }

    /// Index of this step within its phase (0-based).
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    pub fn score(&self) -> Option<Sc> {
        self.score
    }

    pub fn set_score(&mut self, score: Sc) {
        self.score = Some(score);
    }

    pub fn selected_move_count(&self) -> u64 {
        self.selected_move_count
    }

    pub fn accepted_move_count(&self) -> u64 {
        self.accepted_move_count
    }

    pub fn record_selected(&mut self) {
        self.selected_move_count += 1;
    }

    pub fn record_accepted(&mut self) {
        self.accepted_move_count += 1;
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
