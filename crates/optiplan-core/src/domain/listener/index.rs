//! Index shadow of list variables.

use std::fmt;

use super::traits::{ListenerSource, ShadowVariableSink, VariableListener};
use crate::domain::variable::{ListVariableAccessor, VariableAccessor};
use crate::domain::{EntityRef, SolutionDescriptor};
use crate::error::Result;

/// Keeps each list element's index shadow equal to its 0-based position.
///
/// After a change starting at `from`, every element of the suffix whose
/// position moved gets its own before/after bracket. Elements that leave all
/// lists get `None`.
pub struct IndexVariableListener<S> {
    source: ListenerSource,
    element_descriptor: usize,
    index_variable: &'static str,
    list: ListVariableAccessor<S>,
    index: VariableAccessor<S, usize>,
    owner_count: fn(&S) -> usize,
}

impl<S: 'static> IndexVariableListener<S> {
    /// `variable` is the list variable on `owner_descriptor`; `index_variable`
    /// is the shadow on `element_descriptor`.
    pub fn new(
        descriptor: &SolutionDescriptor<S>,
        owner_descriptor: usize,
        variable: &'static str,
        element_descriptor: usize,
        index_variable: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            source: ListenerSource::new(owner_descriptor, variable),
            element_descriptor,
            index_variable,
            list: descriptor.list_accessor(owner_descriptor, variable)?,
            index: descriptor.variable_accessor::<usize>(element_descriptor, index_variable)?,
            owner_count: descriptor.entity_descriptors[owner_descriptor].count_fn(),
        })
    }

    fn set_index(
        &self,
        solution: &mut S,
        element: usize,
        index: Option<usize>,
        sink: &mut dyn ShadowVariableSink<S>,
    ) {
        if (self.index.get)(solution, element) == index {
            return;
        }
        let entity = EntityRef::new(self.element_descriptor, element);
        sink.before_shadow_changed(solution, entity, self.index_variable);
        (self.index.set)(solution, element, index);
        sink.after_shadow_changed(solution, entity, self.index_variable);
    }

    fn reindex_from(
        &self,
        solution: &mut S,
        owner: usize,
        from: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) {
        let len = (self.list.len)(solution, owner);
        for position in from..len {
            let element = (self.list.element)(solution, owner, position);
            self.set_index(solution, element, Some(position), sink);
        }
    }
}

impl<S> fmt::Debug for IndexVariableListener<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexVariableListener")
            .field("source", &self.source)
            .field("element_descriptor", &self.element_descriptor)
            .field("index_variable", &self.index_variable)
            .finish()
    }
}

impl<S: Send + 'static> VariableListener<S> for IndexVariableListener<S> {
    fn source(&self) -> ListenerSource {
        self.source
    }

    fn after_list_changed(
        &mut self,
        solution: &mut S,
        entity: usize,
        from: usize,
        _to: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.reindex_from(solution, entity, from, sink);
        Ok(())
    }

    fn after_element_unassigned(
        &mut self,
        solution: &mut S,
        element: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.set_index(solution, element, None, sink);
        Ok(())
    }

    fn after_entity_added(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        self.reindex_from(solution, entity, 0, sink);
        Ok(())
    }

    fn before_entity_removed(
        &mut self,
        solution: &mut S,
        entity: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        for element in self.list.elements(solution, entity) {
            self.set_index(solution, element, None, sink);
        }
        Ok(())
    }

    fn reset_working_solution(&mut self, solution: &mut S) -> Result<()> {
        for element in 0..(self.list.element_count)(solution) {
            (self.index.set)(solution, element, None);
        }
        for owner in 0..(self.owner_count)(solution) {
            for (position, element) in self.list.elements(solution, owner).into_iter().enumerate() {
                (self.index.set)(solution, element, Some(position));
            }
        }
        Ok(())
    }
}
