//! Variable listener contract.

use std::fmt::Debug;

use crate::domain::EntityRef;
use crate::error::Result;

/// The genuine variable a listener reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerSource {
    pub descriptor_index: usize,
    pub variable: &'static str,
}

impl ListenerSource {
    pub const fn new(descriptor_index: usize, variable: &'static str) -> Self {
        Self {
            descriptor_index,
            variable,
        }
    }
}

/// Receives the bracket of every shadow variable a listener writes.
///
/// The score director forwards these to its score backend so constraints
/// reading shadow variables see the change like any other variable change.
pub trait ShadowVariableSink<S> {
    fn before_shadow_changed(&mut self, solution: &S, entity: EntityRef, variable: &'static str);

    fn after_shadow_changed(&mut self, solution: &S, entity: EntityRef, variable: &'static str);
}

/// Sink that ignores shadow brackets.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopShadowSink;

impl<S> ShadowVariableSink<S> for NoopShadowSink {
    fn before_shadow_changed(&mut self, _: &S, _: EntityRef, _: &'static str) {}

    fn after_shadow_changed(&mut self, _: &S, _: EntityRef, _: &'static str) {}
}

/// Maintains shadow variables in response to changes of its source variable.
///
/// "Before" hooks run immediately, before the mutation. "After" hooks are
/// deferred until the graph is triggered and then run in registration order;
/// between two triggers a listener sees at most one before/after pair per
/// entity. Entity indices refer to the source descriptor's arena; for list
/// element hooks they refer to the element arena.
///
/// Implementations must only write shadow variables, and must bracket every
/// write of a shadow variable on an entity through `sink`.
pub trait VariableListener<S>: Send + Debug {
    fn source(&self) -> ListenerSource;

    fn before_variable_changed(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    fn after_variable_changed(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    fn before_entity_added(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    fn after_entity_added(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    /// Must clear every shadow value the entity contributes to.
    fn before_entity_removed(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    fn after_entity_removed(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    /// Elements in `[from, to)` of `entity`'s list are about to change.
    fn before_list_changed(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _from: usize,
        _to: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    /// Elements in `[from, to)` of `entity`'s list changed.
    fn after_list_changed(
        &mut self,
        _solution: &mut S,
        _entity: usize,
        _from: usize,
        _to: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    /// `element` no longer belongs to any list.
    fn after_element_unassigned(
        &mut self,
        _solution: &mut S,
        _element: usize,
        _sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        Ok(())
    }

    /// Rebuilds all derived state from the genuine variables of `solution`.
    fn reset_working_solution(&mut self, _solution: &mut S) -> Result<()> {
        Ok(())
    }
}
