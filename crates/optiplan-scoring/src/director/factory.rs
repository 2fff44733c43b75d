//! Score director factories.
//!
//! A factory creates independent score directors over clones of a solution,
//! one per solver or per partitioned worker.

use std::fmt;
use std::sync::Arc;

use optiplan_core::domain::listener::VariableListenerGraph;
use optiplan_core::domain::{PlanningSolution, SolutionDescriptor};
use optiplan_core::{OptiplanError, Result};

use super::default::DefaultScoreDirector;
use super::traits::ScoreDirector;
use crate::backend::ScoreBackend;

pub trait ScoreDirectorFactory<S: PlanningSolution>: Send + Sync {
    fn solution_descriptor(&self) -> &Arc<SolutionDescriptor<S>>;

    fn build_score_director(&self, solution: S) -> Result<Box<dyn ScoreDirector<S>>>;

    /// A factory whose directors track constraint matches.
    ///
    /// Fails with a configuration error when the backend cannot explain its
    /// score.
    fn with_constraint_match_tracking(&self) -> Result<Arc<dyn ScoreDirectorFactory<S>>>;
}

type ListenerGraphBuilder<S> =
    Arc<dyn Fn(&SolutionDescriptor<S>) -> Result<VariableListenerGraph<S>> + Send + Sync>;

/// Builds [`DefaultScoreDirector`]s from a backend constructor and a
/// listener graph constructor.
pub struct DefaultScoreDirectorFactory<S: PlanningSolution, B> {
    descriptor: Arc<SolutionDescriptor<S>>,
    backend: Arc<dyn Fn() -> B + Send + Sync>,
    listeners: ListenerGraphBuilder<S>,
    constraint_match_enabled: bool,
}

impl<S, B> DefaultScoreDirectorFactory<S, B>
where
    S: PlanningSolution,
    B: ScoreBackend<S> + 'static,
{
    /// Validates the descriptor; a factory never exists for an invalid model.
    pub fn new(
        descriptor: SolutionDescriptor<S>,
        backend: impl Fn() -> B + Send + Sync + 'static,
    ) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self {
            descriptor: Arc::new(descriptor),
            backend: Arc::new(backend),
            listeners: Arc::new(|_| Ok(VariableListenerGraph::new())),
            constraint_match_enabled: false,
        })
    }

    pub fn with_listeners(
        mut self,
        listeners: impl Fn(&SolutionDescriptor<S>) -> Result<VariableListenerGraph<S>> + Send + Sync + 'static,
    ) -> Self {
        self.listeners = Arc::new(listeners);
        self
    }

    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }

    /// Builds a concretely typed director.
    pub fn build(&self, solution: S) -> Result<DefaultScoreDirector<S, B>> {
        let listeners = (self.listeners)(&self.descriptor)?;
        DefaultScoreDirector::with_options(
            solution,
            Arc::clone(&self.descriptor),
            listeners,
            (self.backend)(),
            self.constraint_match_enabled,
        )
    }
}

impl<S, B> ScoreDirectorFactory<S> for DefaultScoreDirectorFactory<S, B>
where
    S: PlanningSolution,
    B: ScoreBackend<S> + 'static,
{
    fn solution_descriptor(&self) -> &Arc<SolutionDescriptor<S>> {
        &self.descriptor
    }

    fn build_score_director(&self, solution: S) -> Result<Box<dyn ScoreDirector<S>>> {
        Ok(Box::new(self.build(solution)?))
    }

    fn with_constraint_match_tracking(&self) -> Result<Arc<dyn ScoreDirectorFactory<S>>> {
        if !(self.backend)().supports_constraint_matches() {
            return Err(OptiplanError::Config(
                "constraint match tracking requires a backend that explains its score".to_string(),
            ));
        }
        let tracking: Arc<dyn ScoreDirectorFactory<S>> =
            Arc::new(self.clone().with_constraint_match_enabled(true));
        Ok(tracking)
    }
}

impl<S: PlanningSolution, B> Clone for DefaultScoreDirectorFactory<S, B> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            backend: Arc::clone(&self.backend),
            listeners: Arc::clone(&self.listeners),
            constraint_match_enabled: self.constraint_match_enabled,
        }
    }
}

impl<S: PlanningSolution, B> fmt::Debug for DefaultScoreDirectorFactory<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultScoreDirectorFactory")
            .field("descriptor", &self.descriptor.type_name)
            .field("constraint_match_enabled", &self.constraint_match_enabled)
            .finish()
    }
}
