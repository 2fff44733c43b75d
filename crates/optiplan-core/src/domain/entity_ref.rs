//! Stable handles into the arenas of a working solution.

use std::fmt;

/// Handle of a planning entity: which entity descriptor, which slot.
///
/// Handles stay valid for the whole solve unless a problem change removes an
/// entity, after which the working solution is reset and fresh handles are
/// produced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub descriptor_index: usize,
    pub entity_index: usize,
}

impl EntityRef {
    #[inline]
    pub const fn new(descriptor_index: usize, entity_index: usize) -> Self {
        Self {
            descriptor_index,
            entity_index,
        }
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}:{})", self.descriptor_index, self.entity_index)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Value of a chained planning variable.
///
/// A chain starts at an anchor (a problem fact, e.g. a vehicle) followed by
/// entities that each point at their predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainValue {
    Anchor(usize),
    Entity(usize),
}

impl ChainValue {
    pub fn as_entity(&self) -> Option<usize> {
        match self {
            ChainValue::Entity(index) => Some(*index),
            ChainValue::Anchor(_) => None,
        }
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self, ChainValue::Anchor(_))
    }
}

/// Handle of a problem fact, for fact add/remove and property change brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProblemFactRef {
    pub type_name: &'static str,
    pub index: usize,
}

impl ProblemFactRef {
    pub const fn new(type_name: &'static str, index: usize) -> Self {
        Self { type_name, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entity_ref_ordering() {
        let mut refs = vec![EntityRef::new(1, 0), EntityRef::new(0, 3), EntityRef::new(0, 1)];
        refs.sort();
        assert_eq!(
            refs,
            vec![EntityRef::new(0, 1), EntityRef::new(0, 3), EntityRef::new(1, 0)]
        );
        assert_eq!(format!("{:?}", refs[0]), "Entity(0:1)");
    }

    #[test]
    fn test_chain_value_keys() {
        let mut keys = HashSet::new();
        assert!(keys.insert(ChainValue::Anchor(0)));
        assert!(keys.insert(ChainValue::Entity(0)));
        assert!(!keys.insert(ChainValue::Anchor(0)));
        assert_eq!(ChainValue::Entity(4).as_entity(), Some(4));
        assert!(ChainValue::Anchor(2).is_anchor());
    }
}
