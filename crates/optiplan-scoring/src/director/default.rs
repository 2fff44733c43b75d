//! The default score director: listener graph plus score backend.

use std::fmt;
use std::sync::Arc;

use optiplan_core::domain::listener::{ShadowVariableSink, VariableListenerGraph};
use optiplan_core::domain::{PlanningSolution, SolutionDescriptor};
use optiplan_core::{EntityRef, OptiplanError, ProblemFactRef, Result};
use tracing::{debug, trace};

use super::traits::ScoreDirector;
use crate::api::analysis::{
    build_indictment_map, describe_breakdown_diff, ConstraintMatchTotalMap, IndictmentMap,
};
use crate::backend::ScoreBackend;

/// A `before_*` hook still waiting for its `after_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Variable(EntityRef, &'static str),
    ListVariable(EntityRef, &'static str),
    EntityAdded(EntityRef),
    EntityRemoved(EntityRef),
    ProblemProperty(ProblemFactRef),
    FactAdded(ProblemFactRef),
    FactRemoved(ProblemFactRef),
}

/// Forwards the shadow variable brackets written by listeners to the backend.
struct BackendSink<'a, B> {
    backend: &'a mut B,
}

impl<S: PlanningSolution, B: ScoreBackend<S>> ShadowVariableSink<S> for BackendSink<'_, B> {
    fn before_shadow_changed(&mut self, solution: &S, entity: EntityRef, variable: &'static str) {
        self.backend.before_variable_changed(solution, entity, variable);
    }

    fn after_shadow_changed(&mut self, solution: &S, entity: EntityRef, variable: &'static str) {
        self.backend.after_variable_changed(solution, entity, variable);
    }
}

/// Score director that keeps shadow variables up to date through a
/// [`VariableListenerGraph`] and the score through a [`ScoreBackend`].
///
/// Entity removals and problem fact changes invalidate positional state, so
/// they schedule a full reset at the next trigger instead of an incremental
/// update.
pub struct DefaultScoreDirector<S: PlanningSolution, B> {
    working_solution: S,
    descriptor: Arc<SolutionDescriptor<S>>,
    listeners: VariableListenerGraph<S>,
    backend: B,
    constraint_match_enabled: bool,
    open_brackets: Vec<Bracket>,
    needs_reset: bool,
    calculation_count: u64,
}

impl<S, B> DefaultScoreDirector<S, B>
where
    S: PlanningSolution,
    B: ScoreBackend<S>,
{
    /// Creates a director without shadow variable listeners or match tracking.
    pub fn new(solution: S, descriptor: Arc<SolutionDescriptor<S>>, backend: B) -> Result<Self> {
        Self::with_options(solution, descriptor, VariableListenerGraph::new(), backend, false)
    }

    pub fn with_options(
        solution: S,
        descriptor: Arc<SolutionDescriptor<S>>,
        listeners: VariableListenerGraph<S>,
        backend: B,
        constraint_match_enabled: bool,
    ) -> Result<Self> {
        if constraint_match_enabled && !backend.supports_constraint_matches() {
            return Err(OptiplanError::Config(
                "constraint match tracking requires a backend that explains its score".to_string(),
            ));
        }
        let mut director = Self {
            working_solution: solution,
            descriptor,
            listeners,
            backend,
            constraint_match_enabled,
            open_brackets: Vec::new(),
            needs_reset: false,
            calculation_count: 0,
        };
        director.reset_working_solution()?;
        Ok(director)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_working_solution(self) -> S {
        self.working_solution
    }

    fn open(&mut self, bracket: Bracket) {
        self.open_brackets.push(bracket);
    }

    fn close(&mut self, hook: &'static str, bracket: Bracket) -> Result<()> {
        match self.open_brackets.iter().rposition(|b| *b == bracket) {
            Some(position) => {
                self.open_brackets.remove(position);
                Ok(())
            }
            None => Err(OptiplanError::HookMismatch {
                hook,
                detail: format!("no open before hook for {:?}", bracket),
            }),
        }
    }

    fn ensure_closed(&self, hook: &'static str) -> Result<()> {
        if self.open_brackets.is_empty() {
            Ok(())
        } else {
            Err(OptiplanError::HookMismatch {
                hook,
                detail: format!("before hooks still open: {:?}", self.open_brackets),
            })
        }
    }
}

impl<S, B> ScoreDirector<S> for DefaultScoreDirector<S, B>
where
    S: PlanningSolution,
    B: ScoreBackend<S>,
{
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.working_solution
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.descriptor
    }

    fn set_working_solution(&mut self, solution: S) -> Result<()> {
        self.working_solution = solution;
        self.reset_working_solution()
    }

    fn reset_working_solution(&mut self) -> Result<()> {
        self.ensure_closed("reset_working_solution")?;
        self.listeners
            .reset_working_solution(&mut self.working_solution)?;
        self.backend.reset(
            &self.working_solution,
            &self.descriptor,
            self.constraint_match_enabled,
        );
        self.needs_reset = false;
        debug!(
            entity_count = self.descriptor.entity_count(&self.working_solution),
            "Working solution reset"
        );
        Ok(())
    }

    fn calculate_score(&mut self) -> Result<S::Score> {
        self.trigger_variable_listeners()?;
        let score = self.backend.calculate_score(&self.working_solution);
        self.working_solution.set_score(Some(score));
        self.calculation_count += 1;
        Ok(score)
    }

    fn before_variable_changed(&mut self, entity: EntityRef, variable: &'static str) -> Result<()> {
        self.open(Bracket::Variable(entity, variable));
        self.backend
            .before_variable_changed(&self.working_solution, entity, variable);
        let mut sink = BackendSink {
            backend: &mut self.backend,
        };
        self.listeners
            .before_variable_changed(&mut self.working_solution, entity, variable, &mut sink)
    }

    fn after_variable_changed(&mut self, entity: EntityRef, variable: &'static str) -> Result<()> {
        self.close("after_variable_changed", Bracket::Variable(entity, variable))?;
        self.backend
            .after_variable_changed(&self.working_solution, entity, variable);
        Ok(())
    }

    fn before_list_variable_changed(
        &mut self,
        entity: EntityRef,
        variable: &'static str,
        from: usize,
        to: usize,
    ) -> Result<()> {
        self.open(Bracket::ListVariable(entity, variable));
        self.backend
            .before_variable_changed(&self.working_solution, entity, variable);
        let mut sink = BackendSink {
            backend: &mut self.backend,
        };
        self.listeners.before_list_variable_changed(
            &mut self.working_solution,
            entity,
            variable,
            from,
            to,
            &mut sink,
        )
    }

    fn after_list_variable_changed(
        &mut self,
        entity: EntityRef,
        variable: &'static str,
        from: usize,
        to: usize,
    ) -> Result<()> {
        self.close(
            "after_list_variable_changed",
            Bracket::ListVariable(entity, variable),
        )?;
        self.listeners
            .after_list_variable_changed(entity, variable, from, to);
        self.backend
            .after_variable_changed(&self.working_solution, entity, variable);
        Ok(())
    }

    fn list_element_unassigned(
        &mut self,
        entity: EntityRef,
        variable: &'static str,
        element: usize,
    ) -> Result<()> {
        self.listeners
            .list_element_unassigned(entity.descriptor_index, variable, element);
        Ok(())
    }

    fn before_entity_added(&mut self, entity: EntityRef) -> Result<()> {
        self.open(Bracket::EntityAdded(entity));
        let mut sink = BackendSink {
            backend: &mut self.backend,
        };
        self.listeners
            .before_entity_added(&mut self.working_solution, entity, &mut sink)
    }

    fn after_entity_added(&mut self, entity: EntityRef) -> Result<()> {
        self.close("after_entity_added", Bracket::EntityAdded(entity))?;
        self.backend
            .after_entity_added(&self.working_solution, entity);
        Ok(())
    }

    fn before_entity_removed(&mut self, entity: EntityRef) -> Result<()> {
        self.open(Bracket::EntityRemoved(entity));
        self.backend
            .before_entity_removed(&self.working_solution, entity);
        let mut sink = BackendSink {
            backend: &mut self.backend,
        };
        self.listeners
            .before_entity_removed(&mut self.working_solution, entity, &mut sink)
    }

    fn after_entity_removed(&mut self, entity: EntityRef) -> Result<()> {
        self.close("after_entity_removed", Bracket::EntityRemoved(entity))?;
        self.needs_reset = true;
        Ok(())
    }

    fn before_problem_property_changed(&mut self, fact: ProblemFactRef) -> Result<()> {
        self.open(Bracket::ProblemProperty(fact));
        Ok(())
    }

    fn after_problem_property_changed(&mut self, fact: ProblemFactRef) -> Result<()> {
        self.close(
            "after_problem_property_changed",
            Bracket::ProblemProperty(fact),
        )?;
        self.needs_reset = true;
        Ok(())
    }

    fn before_problem_fact_added(&mut self, fact: ProblemFactRef) -> Result<()> {
        self.open(Bracket::FactAdded(fact));
        Ok(())
    }

    fn after_problem_fact_added(&mut self, fact: ProblemFactRef) -> Result<()> {
        self.close("after_problem_fact_added", Bracket::FactAdded(fact))?;
        self.needs_reset = true;
        Ok(())
    }

    fn before_problem_fact_removed(&mut self, fact: ProblemFactRef) -> Result<()> {
        self.open(Bracket::FactRemoved(fact));
        Ok(())
    }

    fn after_problem_fact_removed(&mut self, fact: ProblemFactRef) -> Result<()> {
        self.close("after_problem_fact_removed", Bracket::FactRemoved(fact))?;
        self.needs_reset = true;
        Ok(())
    }

    fn trigger_variable_listeners(&mut self) -> Result<()> {
        self.ensure_closed("trigger_variable_listeners")?;
        if self.needs_reset {
            return self.reset_working_solution();
        }
        let mut sink = BackendSink {
            backend: &mut self.backend,
        };
        self.listeners
            .trigger(&mut self.working_solution, &mut sink)
    }

    fn is_constraint_match_enabled(&self) -> bool {
        self.constraint_match_enabled
    }

    fn constraint_match_total_map(&self) -> Result<ConstraintMatchTotalMap<S::Score>> {
        if !self.constraint_match_enabled {
            return Err(OptiplanError::ConstraintMatchNotEnabled);
        }
        self.backend
            .constraint_match_totals(&self.working_solution)
            .ok_or(OptiplanError::ConstraintMatchNotEnabled)
    }

    fn indictment_map(&self) -> Result<IndictmentMap<S::Score>> {
        Ok(build_indictment_map(&self.constraint_match_total_map()?))
    }

    fn calculate_score_from_scratch(&self) -> S::Score {
        self.backend
            .calculate_score_from_scratch(&self.working_solution)
    }

    fn assert_working_score_from_scratch(&self, working_score: S::Score, context: &str) -> Result<()> {
        let uncorrupted = self.calculate_score_from_scratch();
        if uncorrupted == working_score {
            trace!(score = %working_score, context, "Working score verified");
            return Ok(());
        }
        let analysis = match (
            self.backend.score_breakdown(),
            self.backend
                .score_breakdown_from_scratch(&self.working_solution),
        ) {
            (Some(working), Some(scratch)) => describe_breakdown_diff(&working, &scratch),
            _ => "the score backend does not track a per-constraint breakdown".to_string(),
        };
        Err(OptiplanError::ScoreCorruption {
            working_score: working_score.to_string(),
            uncorrupted_score: uncorrupted.to_string(),
            context: context.to_string(),
            analysis,
        })
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }
}

impl<S: PlanningSolution, B> fmt::Debug for DefaultScoreDirector<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultScoreDirector")
            .field("listeners", &self.listeners)
            .field("open_brackets", &self.open_brackets)
            .field("needs_reset", &self.needs_reset)
            .field("calculation_count", &self.calculation_count)
            .finish()
    }
}
