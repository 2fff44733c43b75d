//! Score director trait definition.

use optiplan_core::domain::{PlanningSolution, SolutionDescriptor};
use optiplan_core::{EntityRef, ProblemFactRef, Result};

use crate::api::analysis::{ConstraintMatchTotalMap, IndictmentMap};

/// The score director manages solution state and score calculation.
///
/// It is responsible for:
/// - Holding the working solution
/// - Pairing the before/after hooks of every change
/// - Triggering variable listeners so shadow variables stay consistent
/// - Calculating scores (incrementally where the backend supports it)
///
/// Every mutation of a planning variable must be enclosed in its
/// `before_*`/`after_*` pair; an `after_*` without a matching open `before_*`
/// fails with [`HookMismatch`](optiplan_core::OptiplanError::HookMismatch).
/// The trait is object safe so partitioned workers can hold
/// `Box<dyn ScoreDirector<S>>`.
pub trait ScoreDirector<S: PlanningSolution>: Send {
    fn working_solution(&self) -> &S;

    /// Raw access for mutations enclosed in hooks.
    fn working_solution_mut(&mut self) -> &mut S;

    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;

    /// Replaces the working solution and rebuilds all derived state.
    fn set_working_solution(&mut self, solution: S) -> Result<()>;

    /// Rebuilds shadow variables and the score from the current working solution.
    fn reset_working_solution(&mut self) -> Result<()>;

    fn clone_working_solution(&self) -> S {
        self.working_solution().clone()
    }

    /// Triggers pending listeners, then returns and stores the working score.
    fn calculate_score(&mut self) -> Result<S::Score>;

    fn before_variable_changed(&mut self, entity: EntityRef, variable: &'static str) -> Result<()>;

    fn after_variable_changed(&mut self, entity: EntityRef, variable: &'static str) -> Result<()>;

    /// The elements at positions `from..to` of the list variable are about to change.
    fn before_list_variable_changed(
        &mut self,
        entity: EntityRef,
        variable: &'static str,
        from: usize,
        to: usize,
    ) -> Result<()>;

    fn after_list_variable_changed(
        &mut self,
        entity: EntityRef,
        variable: &'static str,
        from: usize,
        to: usize,
    ) -> Result<()>;

    /// `element` left the list variable of `entity` without a new owner.
    fn list_element_unassigned(
        &mut self,
        entity: EntityRef,
        variable: &'static str,
        element: usize,
    ) -> Result<()>;

    fn before_entity_added(&mut self, entity: EntityRef) -> Result<()>;

    fn after_entity_added(&mut self, entity: EntityRef) -> Result<()>;

    fn before_entity_removed(&mut self, entity: EntityRef) -> Result<()>;

    fn after_entity_removed(&mut self, entity: EntityRef) -> Result<()>;

    fn before_problem_property_changed(&mut self, fact: ProblemFactRef) -> Result<()>;

    fn after_problem_property_changed(&mut self, fact: ProblemFactRef) -> Result<()>;

    fn before_problem_fact_added(&mut self, fact: ProblemFactRef) -> Result<()>;

    fn after_problem_fact_added(&mut self, fact: ProblemFactRef) -> Result<()>;

    fn before_problem_fact_removed(&mut self, fact: ProblemFactRef) -> Result<()>;

    fn after_problem_fact_removed(&mut self, fact: ProblemFactRef) -> Result<()>;

    /// Delivers every pending after-notification to the variable listeners.
    fn trigger_variable_listeners(&mut self) -> Result<()>;

    fn is_constraint_match_enabled(&self) -> bool;

    fn constraint_match_total_map(&self) -> Result<ConstraintMatchTotalMap<S::Score>>;

    fn indictment_map(&self) -> Result<IndictmentMap<S::Score>>;

    /// Score of the working solution ignoring all incremental state.
    fn calculate_score_from_scratch(&self) -> S::Score;

    /// Fails with a score corruption if `working_score` differs from the
    /// score calculated from scratch. `context` names the operation that
    /// produced the score.
    fn assert_working_score_from_scratch(&self, working_score: S::Score, context: &str) -> Result<()>;

    /// Number of score calculations since creation.
    fn calculation_count(&self) -> u64;

    fn entity_count(&self) -> usize {
        self.solution_descriptor()
            .entity_count(self.working_solution())
    }

    fn uninitialized_variable_count(&self) -> usize {
        self.solution_descriptor()
            .uninitialized_variable_count(self.working_solution())
    }

    fn is_movable(&self, entity: EntityRef) -> bool {
        self.solution_descriptor()
            .is_movable(self.working_solution(), entity)
    }
}
