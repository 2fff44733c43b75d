//! Variable kinds and the typed accessors the descriptor registers.
//!
//! Accessors are plain function pointers resolved once when the descriptor is
//! built. Moves, selectors and listeners copy them out of the descriptor and
//! call them directly.

use std::fmt;

use super::ChainValue;

/// Kind of a planning variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Freely assignable from a value range.
    Genuine,
    /// Genuine variable pointing at an anchor or another entity.
    Chained,
    /// Genuine variable holding an ordered list of elements.
    List,
    /// Derived from `source_variable` by a variable listener.
    Shadow {
        source_variable: &'static str,
        kind: ShadowKind,
    },
}

impl VariableKind {
    pub fn is_genuine(&self) -> bool {
        !self.is_shadow()
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, VariableKind::Shadow { .. })
    }
}

/// What a shadow variable tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowKind {
    /// Trailing entity of a chained value.
    InverseRelation,
    /// First element of the chain.
    Anchor,
    /// Position of an element inside its list.
    Index,
    /// Maintained by a user-supplied listener.
    Custom,
}

/// Get/set pair of a basic variable. `None` means unassigned.
pub struct VariableAccessor<S, V> {
    pub get: fn(&S, usize) -> Option<V>,
    pub set: fn(&mut S, usize, Option<V>),
}

impl<S, V> VariableAccessor<S, V> {
    pub const fn new(get: fn(&S, usize) -> Option<V>, set: fn(&mut S, usize, Option<V>)) -> Self {
        Self { get, set }
    }
}

impl<S, V> Clone for VariableAccessor<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for VariableAccessor<S, V> {}

impl<S, V> fmt::Debug for VariableAccessor<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableAccessor").finish_non_exhaustive()
    }
}

/// Accessors of a chained variable and its inverse (trailing entity) shadow.
///
/// `next` is defined for anchors and entities alike since both can be trailed.
pub struct ChainedVariableAccessor<S> {
    pub previous: VariableAccessor<S, ChainValue>,
    pub next: fn(&S, ChainValue) -> Option<usize>,
    pub set_next: fn(&mut S, ChainValue, Option<usize>),
    pub anchor_count: fn(&S) -> usize,
}

impl<S> Clone for ChainedVariableAccessor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ChainedVariableAccessor<S> {}

impl<S> fmt::Debug for ChainedVariableAccessor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedVariableAccessor").finish_non_exhaustive()
    }
}

impl<S> ChainedVariableAccessor<S> {
    /// Walks the chain backwards from `entity` and returns its anchor.
    ///
    /// Returns `None` for an unassigned entity or a chain that does not end in
    /// an anchor.
    pub fn resolve_anchor(&self, solution: &S, entity: usize) -> Option<usize> {
        let mut current = entity;
        let mut hops = 0usize;
        loop {
            match (self.previous.get)(solution, current)? {
                ChainValue::Anchor(anchor) => return Some(anchor),
                ChainValue::Entity(previous) => {
                    hops += 1;
                    // A cycle never reaches an anchor.
                    if previous == entity || hops > 1 << 24 {
                        return None;
                    }
                    current = previous;
                }
            }
        }
    }

    /// Returns the last entity of the chain starting at `value`, or `None` if
    /// nothing trails `value`.
    pub fn last_in_chain(&self, solution: &S, value: ChainValue) -> Option<usize> {
        let mut last = (self.next)(solution, value)?;
        while let Some(next) = (self.next)(solution, ChainValue::Entity(last)) {
            last = next;
        }
        Some(last)
    }
}

/// Accessors of a list variable.
///
/// Elements are identified by their index in the element arena; owners by
/// their entity index.
pub struct ListVariableAccessor<S> {
    pub len: fn(&S, usize) -> usize,
    pub element: fn(&S, usize, usize) -> usize,
    pub insert: fn(&mut S, usize, usize, usize),
    pub remove: fn(&mut S, usize, usize) -> usize,
    pub element_count: fn(&S) -> usize,
}

impl<S> Clone for ListVariableAccessor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ListVariableAccessor<S> {}

impl<S> fmt::Debug for ListVariableAccessor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListVariableAccessor").finish_non_exhaustive()
    }
}

impl<S> ListVariableAccessor<S> {
    /// Elements of one owner, in list order.
    pub fn elements(&self, solution: &S, owner: usize) -> Vec<usize> {
        (0..(self.len)(solution, owner))
            .map(|position| (self.element)(solution, owner, position))
            .collect()
    }

    /// Total number of assigned elements across `owner_count` owners.
    pub fn assigned_count(&self, solution: &S, owner_count: usize) -> usize {
        (0..owner_count).map(|owner| (self.len)(solution, owner)).sum()
    }
}
