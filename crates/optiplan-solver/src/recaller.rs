//! Best-solution recaller.
//!
//! Remembers the best solution seen during solving. Solutions are compared on
//! their uninitialized variable count first (fewer is better) and on their
//! score second. Only strict improvements replace the best solution; ties and
//! regressions leave it untouched.

use std::fmt;
use std::time::Instant;

use optiplan_core::{PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use tracing::debug;

use crate::event::SolverEventSupport;

pub struct BestSolutionRecaller<S: PlanningSolution> {
    best_solution: Option<S>,
    best_score: Option<S::Score>,
    best_uninitialized_count: usize,
    last_improvement_step: u64,
    last_improvement_time: Option<Instant>,
    improvement_count: u64,
}

impl<S: PlanningSolution> fmt::Debug for BestSolutionRecaller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BestSolutionRecaller")
            .field("best_score", &self.best_score)
            .field("best_uninitialized_count", &self.best_uninitialized_count)
            .field("last_improvement_step", &self.last_improvement_step)
            .field("improvement_count", &self.improvement_count)
            .finish()
    }
}

impl<S: PlanningSolution> Default for BestSolutionRecaller<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> BestSolutionRecaller<S> {
    pub fn new() -> Self {
        Self {
            best_solution: None,
            best_score: None,
            best_uninitialized_count: 0,
            last_improvement_step: 0,
            last_improvement_time: None,
            improvement_count: 0,
        }
    }

    /// Takes the starting solution as the best one, whatever its score.
    pub fn solving_started(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<S::Score> {
        let score = score_director.calculate_score()?;
        self.store(&*score_director, score, 0);
        Ok(score)
    }

    /// Called at the end of every step with the step score.
    ///
    /// Returns true if the working solution became the new best.
    pub fn process_working_solution_during_step(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
        step: u64,
        events: &SolverEventSupport<S>,
    ) -> bool {
        self.process(score_director, score, step, events)
    }

    /// Called for complete assignments reached while evaluating moves, as
    /// exhaustive search does at every leaf.
    pub fn process_working_solution_during_move(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
        step: u64,
        events: &SolverEventSupport<S>,
    ) -> bool {
        self.process(score_director, score, step, events)
    }

    /// Replaces the best solution unconditionally, after problem changes made
    /// the old best solution meaningless.
    pub fn reset_to_working_solution(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
        step: u64,
        events: &SolverEventSupport<S>,
    ) {
        self.store(score_director, score, step);
        self.fire(events);
    }

    fn process(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
        step: u64,
        events: &SolverEventSupport<S>,
    ) -> bool {
        let uninitialized = score_director.uninitialized_variable_count();
        if !self.is_improvement(uninitialized, score) {
            return false;
        }
        debug!(
            best_score = %score,
            uninitialized,
            step,
            "New best solution"
        );
        self.store(score_director, score, step);
        self.improvement_count += 1;
        self.fire(events);
        true
    }

    /// Fewer uninitialized variables win; equal counts compare scores.
    pub fn is_improvement(&self, uninitialized: usize, score: S::Score) -> bool {
        let Some(best_score) = self.best_score else {
            return true;
        };
        match uninitialized.cmp(&self.best_uninitialized_count) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => score > best_score,
        }
    }

    fn store(&mut self, score_director: &dyn ScoreDirector<S>, score: S::Score, step: u64) {
        let mut solution = score_director.clone_working_solution();
        solution.set_score(Some(score));
        self.best_solution = Some(solution);
        self.best_score = Some(score);
        self.best_uninitialized_count = score_director.uninitialized_variable_count();
        self.last_improvement_step = step;
        self.last_improvement_time = Some(Instant::now());
    }

    fn fire(&self, events: &SolverEventSupport<S>) {
        if let (Some(solution), Some(score)) = (&self.best_solution, &self.best_score) {
            events.fire_best_solution_changed(solution, score);
        }
    }

    pub fn best_solution(&self) -> Option<&S> {
        self.best_solution.as_ref()
    }

    pub fn best_score(&self) -> Option<S::Score> {
        self.best_score
    }

    pub fn best_uninitialized_count(&self) -> usize {
        self.best_uninitialized_count
    }

    /// True when a best solution exists and has no unassigned variables.
    pub fn is_best_initialized(&self) -> bool {
        self.best_score.is_some() && self.best_uninitialized_count == 0
    }

    pub fn last_improvement_step(&self) -> u64 {
        self.last_improvement_step
    }

    pub fn last_improvement_time(&self) -> Option<Instant> {
        self.last_improvement_time
    }

    pub fn improvement_count(&self) -> u64 {
        self.improvement_count
    }

    pub fn take_best_solution(&mut self) -> Option<S> {
        self.best_solution.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use optiplan_core::{EntityRef, Score};
    use optiplan_scoring::change_variable;
    use optiplan_test::nqueens::boxed_nqueens_director;
    use optiplan_test::NQueensSolution;

    use crate::event::CountingEventListener;

    fn events_with_counter() -> (SolverEventSupport<NQueensSolution>, Arc<CountingEventListener>) {
        let counter = Arc::new(CountingEventListener::new());
        let mut events = SolverEventSupport::new();
        events.add_solver_listener(counter.clone());
        (events, counter)
    }

    fn set_row(director: &mut dyn ScoreDirector<NQueensSolution>, queen: usize, row: i64) {
        change_variable(director, EntityRef::new(0, queen), "row", |s: &mut NQueensSolution| {
            s.queens[queen].row = Some(row)
        })
        .unwrap();
    }

    #[test]
    fn test_solving_started_takes_any_solution() {
        let mut director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 0, 0, 0]));
        let mut recaller = BestSolutionRecaller::new();
        let score = recaller.solving_started(&mut *director).unwrap();

        assert_eq!(recaller.best_score(), Some(score));
        assert_eq!(recaller.best_solution().unwrap().score, Some(score));
        assert!(recaller.is_best_initialized());
    }

    #[test]
    fn test_only_strict_improvements_replace_best() {
        let (events, counter) = events_with_counter();
        let mut director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 0, 0, 0]));
        let mut recaller = BestSolutionRecaller::new();
        let start = recaller.solving_started(&mut *director).unwrap();

        assert!(!recaller.process_working_solution_during_step(&*director, start, 1, &events));
        assert!(!recaller.process_working_solution_during_step(&*director, start - start.abs(), 2, &events));
        assert_eq!(counter.best_solution_count(), 0);

        set_row(&mut *director, 1, 2);
        let better = director.calculate_score().unwrap();
        assert!(better > start);
        assert!(recaller.process_working_solution_during_step(&*director, better, 3, &events));
        assert_eq!(counter.best_solution_count(), 1);
        assert_eq!(recaller.last_improvement_step(), 3);
        assert_eq!(recaller.best_solution().unwrap().queens[1].row, Some(2));
    }

    #[test]
    fn test_fewer_uninitialized_beats_better_score() {
        let (events, _) = events_with_counter();
        let mut solution = NQueensSolution::with_rows(&[0, 2]);
        solution.queens[1].row = None;
        let mut director = boxed_nqueens_director(solution);
        let mut recaller = BestSolutionRecaller::new();
        let partial = recaller.solving_started(&mut *director).unwrap();
        assert!(!recaller.is_best_initialized());

        // Same row: a conflict, but every queen is placed.
        set_row(&mut *director, 1, 0);
        let complete = director.calculate_score().unwrap();
        assert!(complete < partial);
        assert!(recaller.process_working_solution_during_move(&*director, complete, 1, &events));
        assert!(recaller.is_best_initialized());
    }

    #[test]
    fn test_reset_replaces_and_fires() {
        let (events, counter) = events_with_counter();
        let mut director = boxed_nqueens_director(NQueensSolution::with_rows(&[1, 3, 0, 2]));
        let mut recaller = BestSolutionRecaller::new();
        let best = recaller.solving_started(&mut *director).unwrap();

        set_row(&mut *director, 0, 3);
        let worse = director.calculate_score().unwrap();
        assert!(worse < best);
        recaller.reset_to_working_solution(&*director, worse, 7, &events);
        assert_eq!(recaller.best_score(), Some(worse));
        assert_eq!(counter.best_solution_count(), 1);
    }
}
