//! Trailing-entity index and the listener maintaining it.

use std::collections::HashMap;
use std::fmt;

use super::traits::{ListenerSource, ShadowVariableSink, VariableListener};
use crate::domain::variable::ChainedVariableAccessor;
use crate::domain::{ChainValue, EntityRef, SolutionDescriptor};
use crate::error::{OptiplanError, Result};

/// Which entity trails (points at) each chained value.
///
/// At most one entity may trail a value. Both a second registration for the
/// same value and a removal that finds a different entity (or none) are
/// reported as [`OptiplanError::TrailingEntityCorruption`].
///
/// ```
/// use optiplan_core::domain::listener::TrailingEntityIndex;
/// use optiplan_core::ChainValue;
///
/// let mut index = TrailingEntityIndex::new();
/// index.insert(ChainValue::Anchor(0), 3).unwrap();
/// assert_eq!(index.get(ChainValue::Anchor(0)), Some(3));
/// assert!(index.insert(ChainValue::Anchor(0), 4).is_err());
/// index.remove(ChainValue::Anchor(0), 3).unwrap();
/// assert!(index.remove(ChainValue::Anchor(0), 3).is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct TrailingEntityIndex {
    trailing: HashMap<ChainValue, usize>,
}

impl TrailingEntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, value: ChainValue) -> Option<usize> {
        self.trailing.get(&value).copied()
    }

    pub fn insert(&mut self, value: ChainValue, entity: usize) -> Result<()> {
        if let Some(existing) = self.trailing.get(&value) {
            return Err(OptiplanError::TrailingEntityCorruption(format!(
                "{:?} is already trailed by entity {} while registering entity {}",
                value, existing, entity
            )));
        }
        self.trailing.insert(value, entity);
        Ok(())
    }

    pub fn remove(&mut self, value: ChainValue, entity: usize) -> Result<()> {
        match self.trailing.get(&value) {
            Some(&existing) if existing == entity => {
                self.trailing.remove(&value);
                Ok(())
            }
            Some(&existing) => Err(OptiplanError::TrailingEntityCorruption(format!(
                "{:?} is trailed by entity {}, not by entity {} being unregistered",
                value, existing, entity
            ))),
            None => Err(OptiplanError::TrailingEntityCorruption(format!(
                "{:?} has no trailing entity while unregistering entity {}",
                value, entity
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.trailing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trailing.is_empty()
    }

    pub fn clear(&mut self) {
        self.trailing.clear();
    }
}

/// Keeps the inverse (`next`) shadow of a chained variable and its
/// [`TrailingEntityIndex`] in sync with the genuine `previous` links.
pub struct TrailingEntityListener<S> {
    source: ListenerSource,
    inverse_variable: &'static str,
    accessor: ChainedVariableAccessor<S>,
    entity_count: fn(&S) -> usize,
    index: TrailingEntityIndex,
}

impl<S> fmt::Debug for TrailingEntityListener<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrailingEntityListener")
            .field("source", &self.source)
            .field("inverse_variable", &self.inverse_variable)
            .field("trailing", &self.index.len())
            .finish()
    }
}

impl<S: 'static> TrailingEntityListener<S> {
    /// Builds the listener for chained `variable` whose inverse shadow is `inverse_variable`.
    pub fn new(
        descriptor: &SolutionDescriptor<S>,
        descriptor_index: usize,
        variable: &'static str,
        inverse_variable: &'static str,
    ) -> Result<Self> {
        let accessor = descriptor.chained_accessor(descriptor_index, variable)?;
        descriptor.find_variable(descriptor_index, inverse_variable)?;
        let entity_count = descriptor.entity_descriptors[descriptor_index].count_fn();
        Ok(Self {
            source: ListenerSource::new(descriptor_index, variable),
            inverse_variable,
            accessor,
            entity_count,
            index: TrailingEntityIndex::new(),
        })
    }

    pub fn index(&self) -> &TrailingEntityIndex {
        &self.index
    }

    fn set_next(
        &self,
        solution: &mut S,
        value: ChainValue,
        next: Option<usize>,
        sink: &mut dyn ShadowVariableSink<S>,
    ) {
        if (self.accessor.next)(solution, value) == next {
            return;
        }
        match value {
            // Anchors are problem facts, not scored entities.
            ChainValue::Anchor(_) => (self.accessor.set_next)(solution, value, next),
            ChainValue::Entity(e) => {
                let entity = EntityRef::new(self.source.descriptor_index, e);
                sink.before_shadow_changed(solution, entity, self.inverse_variable);
                (self.accessor.set_next)(solution, value, next);
                sink.after_shadow_changed(solution, entity, self.inverse_variable);
            }
        }
    }

    fn unregister(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        if let Some(value) = (self.accessor.previous.get)(solution, entity) {
            self.index.remove(value, entity)?;
            self.set_next(solution, value, None, sink);
        }
        Ok(())
    }

    fn register(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        if let Some(value) = (self.accessor.previous.get)(solution, entity) {
            self.index.insert(value, entity)?;
            self.set_next(solution, value, Some(entity), sink);
        }
        Ok(())
    }
}

impl<S: Send + 'static> VariableListener<S> for TrailingEntityListener<S> {
    fn source(&self) -> ListenerSource {
        self.source
    }

    fn before_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.unregister(solution, entity, sink)
    }

    fn after_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.register(solution, entity, sink)
    }

    fn after_entity_added(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.register(solution, entity, sink)
    }

    fn before_entity_removed(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.unregister(solution, entity, sink)
    }

    fn reset_working_solution(&mut self, solution: &mut S) -> Result<()> {
        self.index.clear();
        let entity_count = (self.entity_count)(solution);
        for anchor in 0..(self.accessor.anchor_count)(solution) {
            (self.accessor.set_next)(solution, ChainValue::Anchor(anchor), None);
        }
        for entity in 0..entity_count {
            (self.accessor.set_next)(solution, ChainValue::Entity(entity), None);
        }
        for entity in 0..entity_count {
            if let Some(value) = (self.accessor.previous.get)(solution, entity) {
                self.index.insert(value, entity)?;
                (self.accessor.set_next)(solution, value, Some(entity));
            }
        }
        Ok(())
    }
}
