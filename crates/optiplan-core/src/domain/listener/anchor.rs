//! Anchor shadow of chained variables.

use std::fmt;

use super::traits::{ListenerSource, ShadowVariableSink, VariableListener};
use crate::domain::variable::{ChainedVariableAccessor, VariableAccessor};
use crate::domain::{ChainValue, EntityRef, SolutionDescriptor};
use crate::error::Result;

/// Keeps every chained entity's anchor shadow equal to the anchor its chain
/// starts from.
///
/// Reads the inverse shadow, so it must be registered after the
/// [`TrailingEntityListener`](super::TrailingEntityListener) of the same variable.
pub struct AnchorVariableListener<S> {
    source: ListenerSource,
    anchor_variable: &'static str,
    chain: ChainedVariableAccessor<S>,
    anchor: VariableAccessor<S, usize>,
    entity_count: fn(&S) -> usize,
}

impl<S: 'static> AnchorVariableListener<S> {
    pub fn new(
        descriptor: &SolutionDescriptor<S>,
        descriptor_index: usize,
        variable: &'static str,
        anchor_variable: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            source: ListenerSource::new(descriptor_index, variable),
            anchor_variable,
            chain: descriptor.chained_accessor(descriptor_index, variable)?,
            anchor: descriptor.variable_accessor::<usize>(descriptor_index, anchor_variable)?,
            entity_count: descriptor.entity_descriptors[descriptor_index].count_fn(),
        })
    }

    fn set_anchor(
        &self,
        solution: &mut S,
        entity: usize,
        anchor: Option<usize>,
        sink: &mut dyn ShadowVariableSink<S>,
    ) {
        let entity_ref = EntityRef::new(self.source.descriptor_index, entity);
        sink.before_shadow_changed(solution, entity_ref, self.anchor_variable);
        (self.anchor.set)(solution, entity, anchor);
        sink.after_shadow_changed(solution, entity_ref, self.anchor_variable);
    }

    /// Propagates the anchor of `entity`'s predecessor down the trailing chain.
    fn update_chain(
        &self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        let anchor = match (self.chain.previous.get)(solution, entity) {
            None => None,
            Some(ChainValue::Anchor(anchor)) => Some(anchor),
            Some(ChainValue::Entity(previous)) => (self.anchor.get)(solution, previous),
        };
        let mut current = Some(entity);
        while let Some(e) = current {
            if (self.anchor.get)(solution, e) == anchor {
                break;
            }
            self.set_anchor(solution, e, anchor, sink);
            current = (self.chain.next)(solution, ChainValue::Entity(e));
        }
        Ok(())
    }
}

impl<S> fmt::Debug for AnchorVariableListener<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorVariableListener")
            .field("source", &self.source)
            .field("anchor_variable", &self.anchor_variable)
            .finish()
    }
}

impl<S: Send + 'static> VariableListener<S> for AnchorVariableListener<S> {
    fn source(&self) -> ListenerSource {
        self.source
    }

    fn after_variable_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.update_chain(solution, entity, sink)
    }

    fn after_entity_added(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.update_chain(solution, entity, sink)
    }

    fn before_entity_removed(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        if (self.anchor.get)(solution, entity).is_some() {
            self.set_anchor(solution, entity, None, sink);
        }
        Ok(())
    }

    fn reset_working_solution(&mut self, solution: &mut S) -> Result<()> {
        for entity in 0..(self.entity_count)(solution) {
            (self.anchor.set)(solution, entity, None);
        }
        for anchor in 0..(self.chain.anchor_count)(solution) {
            let mut current = (self.chain.next)(solution, ChainValue::Anchor(anchor));
            while let Some(e) = current {
                (self.anchor.set)(solution, e, Some(anchor));
                current = (self.chain.next)(solution, ChainValue::Entity(e));
            }
        }
        Ok(())
    }
}
