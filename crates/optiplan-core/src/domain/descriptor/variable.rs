//! Variable descriptor.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::domain::variable::{
    ChainedVariableAccessor, ListVariableAccessor, ShadowKind, VariableAccessor, VariableKind,
};
use crate::domain::value_range::ValueRange;
use crate::domain::ChainValue;

type UnassignedCounter<S> = Arc<dyn Fn(&S, usize) -> usize + Send + Sync>;

/// Describes one planning variable of an entity type.
pub struct VariableDescriptor<S> {
    pub name: &'static str,
    pub kind: VariableKind,
    /// Nullable variables may stay unassigned in a complete solution.
    pub nullable: bool,
    accessor: Option<Arc<dyn Any + Send + Sync>>,
    value_type: Option<TypeId>,
    value_range: Option<Arc<dyn Any + Send + Sync>>,
    value_range_type: Option<TypeId>,
    unassigned: Option<UnassignedCounter<S>>,
}

impl<S: 'static> VariableDescriptor<S> {
    fn with_kind(name: &'static str, kind: VariableKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            accessor: None,
            value_type: None,
            value_range: None,
            value_range_type: None,
            unassigned: None,
        }
    }

    /// A basic genuine variable.
    pub fn genuine<V: Clone + Send + Sync + 'static>(
        name: &'static str,
        accessor: VariableAccessor<S, V>,
    ) -> Self {
        let mut descriptor = Self::with_kind(name, VariableKind::Genuine);
        descriptor.accessor = Some(Arc::new(accessor));
        descriptor.value_type = Some(TypeId::of::<V>());
        descriptor.unassigned = Some(Arc::new(move |solution: &S, entity_count: usize| {
            (0..entity_count)
                .filter(|&i| (accessor.get)(solution, i).is_none())
                .count()
        }));
        descriptor
    }

    /// A chained genuine variable with its trailing-entity shadow.
    pub fn chained(name: &'static str, accessor: ChainedVariableAccessor<S>) -> Self {
        let mut descriptor = Self::with_kind(name, VariableKind::Chained);
        descriptor.accessor = Some(Arc::new(accessor));
        descriptor.value_type = Some(TypeId::of::<ChainValue>());
        descriptor.unassigned = Some(Arc::new(move |solution: &S, entity_count: usize| {
            (0..entity_count)
                .filter(|&i| (accessor.previous.get)(solution, i).is_none())
                .count()
        }));
        descriptor
    }

    /// A list variable. Unassigned elements count as uninitialized.
    pub fn list(name: &'static str, accessor: ListVariableAccessor<S>) -> Self {
        let mut descriptor = Self::with_kind(name, VariableKind::List);
        descriptor.accessor = Some(Arc::new(accessor));
        descriptor.unassigned = Some(Arc::new(move |solution: &S, owner_count: usize| {
            (accessor.element_count)(solution)
                .saturating_sub(accessor.assigned_count(solution, owner_count))
        }));
        descriptor
    }

    /// A shadow variable derived from `source_variable`.
    pub fn shadow(name: &'static str, source_variable: &'static str, kind: ShadowKind) -> Self {
        Self::with_kind(
            name,
            VariableKind::Shadow {
                source_variable,
                kind,
            },
        )
    }

    /// Attaches a shadow accessor, e.g. for the index or anchor shadow.
    pub fn with_shadow_accessor<V: 'static>(mut self, accessor: VariableAccessor<S, V>) -> Self {
        self.accessor = Some(Arc::new(accessor));
        self.value_type = Some(TypeId::of::<V>());
        self
    }

    pub fn with_value_range<V: Send + Sync + 'static>(mut self, range: ValueRange<S, V>) -> Self {
        self.value_range = Some(Arc::new(range));
        self.value_range_type = Some(TypeId::of::<V>());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn has_value_range(&self) -> bool {
        self.value_range.is_some()
    }

    /// True when the value range's type differs from the accessor's value type.
    pub(crate) fn value_range_type_mismatch(&self) -> bool {
        match (self.value_type, self.value_range_type) {
            (Some(accessor), Some(range)) => accessor != range,
            _ => false,
        }
    }

    pub(crate) fn accessor<A: Copy + 'static>(&self) -> Option<A> {
        self.accessor.as_ref()?.downcast_ref::<A>().copied()
    }

    pub(crate) fn value_range<V: 'static>(&self) -> Option<ValueRange<S, V>> {
        self.value_range
            .as_ref()?
            .downcast_ref::<ValueRange<S, V>>()
            .cloned()
    }

    /// Number of unassigned values among `entity_count` entities.
    ///
    /// Nullable and shadow variables never count.
    pub fn unassigned_count(&self, solution: &S, entity_count: usize) -> usize {
        if self.nullable {
            return 0;
        }
        self.unassigned
            .as_ref()
            .map_or(0, |count| count(solution, entity_count))
    }
}

impl<S> Clone for VariableDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            nullable: self.nullable,
            accessor: self.accessor.clone(),
            value_type: self.value_type,
            value_range: self.value_range.clone(),
            value_range_type: self.value_range_type,
            unassigned: self.unassigned.clone(),
        }
    }
}

impl<S> fmt::Debug for VariableDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("has_value_range", &self.value_range.is_some())
            .finish()
    }
}
