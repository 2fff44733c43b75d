//! Entity descriptor.

use std::any::TypeId;
use std::fmt;

use super::VariableDescriptor;

/// Describes a planning entity type at runtime.
pub struct EntityDescriptor<S> {
    /// Name of the entity type.
    pub type_name: &'static str,
    /// TypeId of the entity type.
    pub type_id: TypeId,
    /// Types this entity type inherits from, as `(TypeId, name)`.
    pub supertypes: Vec<(TypeId, &'static str)>,
    /// Variable descriptors, genuine and shadow.
    pub variable_descriptors: Vec<VariableDescriptor<S>>,
    count: fn(&S) -> usize,
    movable_filter: Option<fn(&S, usize) -> bool>,
    planning_id: Option<fn(&S, usize) -> u64>,
}

impl<S: 'static> EntityDescriptor<S> {
    /// Creates a descriptor for entity type `T`, whose arena size is `count`.
    pub fn new<T: ?Sized + 'static>(type_name: &'static str, count: fn(&S) -> usize) -> Self {
        EntityDescriptor {
            type_name,
            type_id: TypeId::of::<T>(),
            supertypes: Vec::new(),
            variable_descriptors: Vec::new(),
            count,
            movable_filter: None,
            planning_id: None,
        }
    }

    /// Declares that this entity type is a subtype of `P`.
    ///
    /// Lookups for `P` on the solution descriptor then include this type.
    pub fn with_supertype<P: ?Sized + 'static>(mut self) -> Self {
        self.supertypes
            .push((TypeId::of::<P>(), std::any::type_name::<P>()));
        self
    }

    pub fn with_variable(mut self, descriptor: VariableDescriptor<S>) -> Self {
        self.variable_descriptors.push(descriptor);
        self
    }

    /// Entities rejected by `filter` are pinned and never selected.
    pub fn with_movable_filter(mut self, filter: fn(&S, usize) -> bool) -> Self {
        self.movable_filter = Some(filter);
        self
    }

    /// Stable id used to find the working copy of an entity after a problem change.
    pub fn with_planning_id(mut self, planning_id: fn(&S, usize) -> u64) -> Self {
        self.planning_id = Some(planning_id);
        self
    }

    pub fn count_fn(&self) -> fn(&S) -> usize {
        self.count
    }

    pub fn entity_count(&self, solution: &S) -> usize {
        (self.count)(solution)
    }

    pub fn is_movable(&self, solution: &S, entity_index: usize) -> bool {
        self.movable_filter
            .map_or(true, |filter| filter(solution, entity_index))
    }

    pub fn planning_id(&self, solution: &S, entity_index: usize) -> Option<u64> {
        self.planning_id.map(|id| id(solution, entity_index))
    }

    /// Finds the entity whose planning id is `id`.
    pub fn find_by_planning_id(&self, solution: &S, id: u64) -> Option<usize> {
        let planning_id = self.planning_id?;
        (0..self.entity_count(solution)).find(|&i| planning_id(solution, i) == id)
    }

    pub fn find_variable(&self, name: &str) -> Option<&VariableDescriptor<S>> {
        self.variable_descriptors.iter().find(|v| v.name == name)
    }

    pub fn genuine_variable_descriptors(&self) -> impl Iterator<Item = &VariableDescriptor<S>> {
        self.variable_descriptors
            .iter()
            .filter(|v| v.kind.is_genuine())
    }

    pub fn shadow_variable_descriptors(&self) -> impl Iterator<Item = &VariableDescriptor<S>> {
        self.variable_descriptors.iter().filter(|v| v.kind.is_shadow())
    }

    /// Returns true if this type is `type_id` or declares it as a supertype.
    pub fn is_assignable_to(&self, type_id: TypeId) -> bool {
        self.type_id == type_id || self.supertypes.iter().any(|(id, _)| *id == type_id)
    }

    /// Unassigned, non-nullable genuine variables over all entities of this type.
    pub fn uninitialized_variable_count(&self, solution: &S) -> usize {
        let count = self.entity_count(solution);
        self.genuine_variable_descriptors()
            .map(|v| v.unassigned_count(solution, count))
            .sum()
    }
}

impl<S> Clone for EntityDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            type_id: self.type_id,
            supertypes: self.supertypes.clone(),
            variable_descriptors: self.variable_descriptors.clone(),
            count: self.count,
            movable_filter: self.movable_filter,
            planning_id: self.planning_id,
        }
    }
}

impl<S> fmt::Debug for EntityDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("supertypes", &self.supertypes.len())
            .field("variables", &self.variable_descriptors)
            .finish()
    }
}
