//! Score backends: how a score director turns hooks into a working score.

use std::fmt;

use optiplan_core::domain::{PlanningSolution, SolutionDescriptor};
use optiplan_core::{EntityRef, Score};

use crate::api::analysis::{ConstraintMatchTotal, ConstraintMatchTotalMap};
use crate::api::constraint_set::ConstraintSet;

/// Maintains the score of the working solution.
///
/// The director calls `reset` whenever the working solution is replaced or
/// a problem fact changed, and forwards every genuine and shadow variable
/// bracket. Entity indices always refer to the solution the hook receives.
pub trait ScoreBackend<S: PlanningSolution>: Send {
    fn reset(&mut self, solution: &S, descriptor: &SolutionDescriptor<S>, constraint_match_enabled: bool);

    fn before_variable_changed(&mut self, solution: &S, entity: EntityRef, variable: &str);

    fn after_variable_changed(&mut self, solution: &S, entity: EntityRef, variable: &str);

    fn after_entity_added(&mut self, solution: &S, entity: EntityRef);

    fn before_entity_removed(&mut self, solution: &S, entity: EntityRef);

    fn calculate_score(&mut self, solution: &S) -> S::Score;

    /// Score of `solution` ignoring all incremental state.
    fn calculate_score_from_scratch(&self, solution: &S) -> S::Score;

    /// Whether the backend can explain its score as constraint matches.
    fn supports_constraint_matches(&self) -> bool {
        false
    }

    fn constraint_match_totals(&self, _solution: &S) -> Option<ConstraintMatchTotalMap<S::Score>> {
        None
    }

    /// Incrementally maintained score per constraint, if the backend tracks one.
    fn score_breakdown(&self) -> Option<Vec<(String, S::Score)>> {
        None
    }

    fn score_breakdown_from_scratch(&self, _solution: &S) -> Option<Vec<(String, S::Score)>> {
        None
    }
}

/// Recalculates the whole score with a function on every calculation.
///
/// Any hook marks the cached score dirty.
pub struct EasyScoreBackend<S: PlanningSolution, C> {
    calculator: C,
    cached_score: Option<S::Score>,
}

impl<S, C> EasyScoreBackend<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send,
{
    pub fn new(calculator: C) -> Self {
        Self {
            calculator,
            cached_score: None,
        }
    }
}

impl<S, C> ScoreBackend<S> for EasyScoreBackend<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send,
{
    fn reset(&mut self, _solution: &S, _descriptor: &SolutionDescriptor<S>, _: bool) {
        self.cached_score = None;
    }

    fn before_variable_changed(&mut self, _solution: &S, _entity: EntityRef, _variable: &str) {
        self.cached_score = None;
    }

    fn after_variable_changed(&mut self, _solution: &S, _entity: EntityRef, _variable: &str) {
        self.cached_score = None;
    }

    fn after_entity_added(&mut self, _solution: &S, _entity: EntityRef) {
        self.cached_score = None;
    }

    fn before_entity_removed(&mut self, _solution: &S, _entity: EntityRef) {
        self.cached_score = None;
    }

    fn calculate_score(&mut self, solution: &S) -> S::Score {
        if let Some(score) = self.cached_score {
            return score;
        }
        let score = (self.calculator)(solution);
        self.cached_score = Some(score);
        score
    }

    fn calculate_score_from_scratch(&self, solution: &S) -> S::Score {
        (self.calculator)(solution)
    }
}

impl<S: PlanningSolution, C> fmt::Debug for EasyScoreBackend<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasyScoreBackend")
            .field("cached_score", &self.cached_score)
            .finish()
    }
}

/// Maintains the score incrementally from a [`ConstraintSet`].
///
/// An entity is retracted before any of its variables change and inserted
/// again afterwards; retract and insert are idempotent, so several brackets
/// on the same entity cost one retract and one insert each.
pub struct ConstraintSetBackend<S: PlanningSolution, C> {
    constraints: C,
    score: S::Score,
    per_constraint: Vec<S::Score>,
    constraint_match_enabled: bool,
}

impl<S, C> ConstraintSetBackend<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    pub fn new(constraints: C) -> Self {
        let count = constraints.constraint_count();
        Self {
            constraints,
            score: S::Score::zero(),
            per_constraint: vec![S::Score::zero(); count],
            constraint_match_enabled: false,
        }
    }

    pub fn constraints(&self) -> &C {
        &self.constraints
    }
}

impl<S, C> ScoreBackend<S> for ConstraintSetBackend<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    fn reset(&mut self, solution: &S, _descriptor: &SolutionDescriptor<S>, constraint_match_enabled: bool) {
        self.constraint_match_enabled = constraint_match_enabled;
        self.per_constraint = vec![S::Score::zero(); self.constraints.constraint_count()];
        self.score = self
            .constraints
            .initialize_all(solution, &mut self.per_constraint);
    }

    fn before_variable_changed(&mut self, solution: &S, entity: EntityRef, _variable: &str) {
        let delta = self
            .constraints
            .on_retract_all(solution, entity, &mut self.per_constraint);
        self.score = self.score + delta;
    }

    fn after_variable_changed(&mut self, solution: &S, entity: EntityRef, _variable: &str) {
        let delta = self
            .constraints
            .on_insert_all(solution, entity, &mut self.per_constraint);
        self.score = self.score + delta;
    }

    fn after_entity_added(&mut self, solution: &S, entity: EntityRef) {
        let delta = self
            .constraints
            .on_insert_all(solution, entity, &mut self.per_constraint);
        self.score = self.score + delta;
    }

    fn before_entity_removed(&mut self, solution: &S, entity: EntityRef) {
        let delta = self
            .constraints
            .on_retract_all(solution, entity, &mut self.per_constraint);
        self.score = self.score + delta;
    }

    fn calculate_score(&mut self, _solution: &S) -> S::Score {
        self.score
    }

    fn calculate_score_from_scratch(&self, solution: &S) -> S::Score {
        self.constraints.evaluate_all(solution)
    }

    fn supports_constraint_matches(&self) -> bool {
        true
    }

    fn constraint_match_totals(&self, solution: &S) -> Option<ConstraintMatchTotalMap<S::Score>> {
        let mut totals = ConstraintMatchTotalMap::new();
        for name in self.constraints.constraint_names() {
            totals.insert(name.clone(), ConstraintMatchTotal::new(name));
        }
        for m in self.constraints.matches_all(solution) {
            totals
                .entry(m.constraint_name.clone())
                .or_insert_with(|| ConstraintMatchTotal::new(m.constraint_name.clone()))
                .add_match(m);
        }
        Some(totals)
    }

    fn score_breakdown(&self) -> Option<Vec<(String, S::Score)>> {
        Some(
            self.constraints
                .constraint_names()
                .into_iter()
                .zip(self.per_constraint.iter().copied())
                .collect(),
        )
    }

    fn score_breakdown_from_scratch(&self, solution: &S) -> Option<Vec<(String, S::Score)>> {
        Some(
            self.constraints
                .constraint_names()
                .into_iter()
                .zip(self.constraints.evaluate_each(solution))
                .collect(),
        )
    }
}

impl<S: PlanningSolution, C> fmt::Debug for ConstraintSetBackend<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSetBackend")
            .field("score", &self.score)
            .field("constraint_match_enabled", &self.constraint_match_enabled)
            .finish()
    }
}
