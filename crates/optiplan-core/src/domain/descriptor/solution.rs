//! Solution descriptor.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::{EntityDescriptor, VariableDescriptor};
use crate::domain::value_range::ValueRange;
use crate::domain::variable::{
    ChainedVariableAccessor, ListVariableAccessor, VariableAccessor, VariableKind,
};
use crate::domain::EntityRef;
use crate::error::{OptiplanError, Result};

/// Describes a planning solution at runtime.
///
/// Holds every entity descriptor in registration order; an entity's
/// descriptor index is its position here and appears in every [`EntityRef`].
///
/// # Example
///
/// ```
/// use optiplan_core::domain::{EntityDescriptor, VariableAccessor, VariableDescriptor};
/// use optiplan_core::{SolutionDescriptor, ValueRange};
///
/// struct Queen;
/// struct Board {
///     rows: Vec<Option<i64>>,
/// }
///
/// let descriptor = SolutionDescriptor::new("Board").with_entity(
///     EntityDescriptor::new::<Queen>("Queen", |b: &Board| b.rows.len()).with_variable(
///         VariableDescriptor::genuine(
///             "row",
///             VariableAccessor::new(|b: &Board, i| b.rows[i], |b: &mut Board, i, v| b.rows[i] = v),
///         )
///         .with_value_range(ValueRange::integers(0, 4)),
///     ),
/// );
/// descriptor.validate().unwrap();
///
/// let board = Board { rows: vec![Some(0), None] };
/// assert_eq!(descriptor.uninitialized_variable_count(&board), 1);
/// assert_eq!(descriptor.entity_refs_of::<Queen>(&board).unwrap().len(), 2);
/// ```
pub struct SolutionDescriptor<S> {
    /// Name of the solution type.
    pub type_name: &'static str,
    /// Descriptors for all entity types, in registration order.
    pub entity_descriptors: Vec<EntityDescriptor<S>>,
    /// Entity TypeId (own type and supertypes) to descriptor indices.
    type_index: HashMap<TypeId, Vec<usize>>,
}

impl<S: 'static> SolutionDescriptor<S> {
    pub fn new(type_name: &'static str) -> Self {
        SolutionDescriptor {
            type_name,
            entity_descriptors: Vec::new(),
            type_index: HashMap::new(),
        }
    }

    /// Adds an entity descriptor and indexes it under its type and supertypes.
    pub fn with_entity(mut self, descriptor: EntityDescriptor<S>) -> Self {
        let index = self.entity_descriptors.len();
        self.type_index
            .entry(descriptor.type_id)
            .or_default()
            .push(index);
        for (supertype, _) in &descriptor.supertypes {
            let indices = self.type_index.entry(*supertype).or_default();
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        self.entity_descriptors.push(descriptor);
        self
    }

    /// Checks the model for configuration errors.
    ///
    /// Meant to run once when the solver is built, before any solving starts.
    pub fn validate(&self) -> Result<()> {
        if self.entity_descriptors.is_empty() {
            return Err(OptiplanError::Config(format!(
                "solution {} has no entity descriptors",
                self.type_name
            )));
        }
        for entity in &self.entity_descriptors {
            let mut names = HashSet::new();
            for variable in &entity.variable_descriptors {
                if !names.insert(variable.name) {
                    return Err(OptiplanError::Config(format!(
                        "variable {}.{} is declared twice",
                        entity.type_name, variable.name
                    )));
                }
                match variable.kind {
                    VariableKind::Genuine | VariableKind::Chained => {
                        if !variable.has_value_range() {
                            return Err(OptiplanError::MissingValueRange {
                                entity: entity.type_name,
                                variable: variable.name,
                            });
                        }
                        if variable.value_range_type_mismatch() {
                            return Err(OptiplanError::Config(format!(
                                "value range of {}.{} does not match the variable type",
                                entity.type_name, variable.name
                            )));
                        }
                    }
                    VariableKind::List => {}
                    VariableKind::Shadow {
                        source_variable, ..
                    } => {
                        let source_known = self.entity_descriptors.iter().any(|e| {
                            e.find_variable(source_variable)
                                .is_some_and(|v| v.kind.is_genuine())
                        });
                        if !source_known {
                            return Err(OptiplanError::Config(format!(
                                "shadow variable {}.{} has unknown source variable {}",
                                entity.type_name, variable.name, source_variable
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn entity_descriptor(&self, descriptor_index: usize) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors.get(descriptor_index)
    }

    /// Finds an entity descriptor by type name.
    pub fn find_entity_descriptor(&self, type_name: &str) -> Option<usize> {
        self.entity_descriptors
            .iter()
            .position(|d| d.type_name == type_name)
    }

    /// Descriptor indices of `T` and of every registered subtype of `T`.
    ///
    /// # Errors
    ///
    /// [`OptiplanError::UnregisteredEntityType`] if nothing matches.
    pub fn entity_descriptor_indices_for<T: ?Sized + 'static>(&self) -> Result<&[usize]> {
        self.type_index
            .get(&TypeId::of::<T>())
            .map(Vec::as_slice)
            .filter(|indices| !indices.is_empty())
            .ok_or_else(|| {
                OptiplanError::UnregisteredEntityType(std::any::type_name::<T>().to_string())
            })
    }

    /// The single descriptor index for `T`. Errors if `T` is unregistered or ambiguous.
    pub fn entity_descriptor_index_for<T: ?Sized + 'static>(&self) -> Result<usize> {
        match self.entity_descriptor_indices_for::<T>()? {
            [index] => Ok(*index),
            indices => Err(OptiplanError::Config(format!(
                "{} matches {} entity descriptors",
                std::any::type_name::<T>(),
                indices.len()
            ))),
        }
    }

    /// All entities of the working solution, in descriptor then arena order.
    pub fn entity_refs(&self, solution: &S) -> Vec<EntityRef> {
        (0..self.entity_descriptors.len())
            .flat_map(|d| self.refs_of_descriptor(solution, d))
            .collect()
    }

    /// All entities whose type is `T` or a subtype of `T`.
    pub fn entity_refs_of<T: ?Sized + 'static>(&self, solution: &S) -> Result<Vec<EntityRef>> {
        Ok(self
            .entity_descriptor_indices_for::<T>()?
            .iter()
            .flat_map(|&d| self.refs_of_descriptor(solution, d))
            .collect())
    }

    fn refs_of_descriptor(&self, solution: &S, descriptor_index: usize) -> Vec<EntityRef> {
        let count = self.entity_descriptors[descriptor_index].entity_count(solution);
        (0..count)
            .map(|i| EntityRef::new(descriptor_index, i))
            .collect()
    }

    pub fn entity_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.entity_count(solution))
            .sum()
    }

    pub fn is_movable(&self, solution: &S, entity: EntityRef) -> bool {
        self.entity_descriptors
            .get(entity.descriptor_index)
            .is_some_and(|d| d.is_movable(solution, entity.entity_index))
    }

    /// Unassigned non-nullable genuine variables across the whole solution.
    pub fn uninitialized_variable_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.uninitialized_variable_count(solution))
            .sum()
    }

    pub fn find_entity_by_planning_id(
        &self,
        solution: &S,
        descriptor_index: usize,
        id: u64,
    ) -> Option<EntityRef> {
        self.entity_descriptors
            .get(descriptor_index)?
            .find_by_planning_id(solution, id)
            .map(|i| EntityRef::new(descriptor_index, i))
    }

    pub fn find_variable(
        &self,
        descriptor_index: usize,
        name: &str,
    ) -> Result<&VariableDescriptor<S>> {
        let entity = self.entity_descriptors.get(descriptor_index).ok_or_else(|| {
            OptiplanError::Config(format!("no entity descriptor at index {}", descriptor_index))
        })?;
        entity.find_variable(name).ok_or_else(|| {
            OptiplanError::Config(format!(
                "{} has no variable named {}",
                entity.type_name, name
            ))
        })
    }

    /// Typed accessor of a genuine or shadow variable.
    pub fn variable_accessor<V: 'static>(
        &self,
        descriptor_index: usize,
        name: &str,
    ) -> Result<VariableAccessor<S, V>> {
        self.typed_accessor(descriptor_index, name)
    }

    pub fn chained_accessor(
        &self,
        descriptor_index: usize,
        name: &str,
    ) -> Result<ChainedVariableAccessor<S>> {
        self.typed_accessor(descriptor_index, name)
    }

    pub fn list_accessor(
        &self,
        descriptor_index: usize,
        name: &str,
    ) -> Result<ListVariableAccessor<S>> {
        self.typed_accessor(descriptor_index, name)
    }

    fn typed_accessor<A: Copy + 'static>(&self, descriptor_index: usize, name: &str) -> Result<A> {
        self.find_variable(descriptor_index, name)?
            .accessor::<A>()
            .ok_or_else(|| {
                OptiplanError::Config(format!(
                    "variable {} has no accessor of type {}",
                    name,
                    std::any::type_name::<A>()
                ))
            })
    }

    pub fn value_range<V: 'static>(
        &self,
        descriptor_index: usize,
        name: &str,
    ) -> Result<ValueRange<S, V>> {
        let variable = self.find_variable(descriptor_index, name)?;
        variable.value_range::<V>().ok_or_else(|| {
            let entity = self.entity_descriptors[descriptor_index].type_name;
            if variable.has_value_range() {
                OptiplanError::Config(format!(
                    "value range of {}.{} is not a range of {}",
                    entity,
                    name,
                    std::any::type_name::<V>()
                ))
            } else {
                OptiplanError::MissingValueRange {
                    entity,
                    variable: variable.name,
                }
            }
        })
    }
}

impl<S> Clone for SolutionDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            entity_descriptors: self.entity_descriptors.clone(),
            type_index: self.type_index.clone(),
        }
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("type_name", &self.type_name)
            .field("entities", &self.entity_descriptors.len())
            .finish()
    }
}
