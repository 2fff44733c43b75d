//! Move system for modifying planning solutions.
//!
//! Moves are the fundamental operations that modify planning variables during
//! solving. The solver explores the solution space by trying moves, scoring
//! the result and undoing them again.
//!
//! # Architecture
//!
//! - `ChangeMove<S, V>` - assigns a value to a basic variable
//! - `SwapMove<S, V>` - swaps the values of two entities
//! - `ChainedChangeMove<S>` - reconnects one entity elsewhere in a chain
//! - `ListChangeMove<S>` - relocates, assigns or unassigns a list element
//! - `CompositeMove<S>` - applies several moves in order
//!
//! Every move brackets its mutations with the score director's before/after
//! hooks and triggers the variable listeners before returning, so a score
//! calculated right after `do_move` sees consistent shadow variables.
//!
//! # Arena Allocation
//!
//! Use `MoveArena<M>` for per-step storage. Call `reset()` at each step
//! instead of allocating a new Vec.

mod arena;
mod chained_change;
mod change;
mod composite;
mod list_change;
mod swap;

#[cfg(test)]
mod tests;

use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use optiplan_core::{EntityRef, PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use smallvec::SmallVec;

pub use arena::MoveArena;
pub use chained_change::ChainedChangeMove;
pub use change::ChangeMove;
pub use composite::CompositeMove;
pub use list_change::{ListChangeMove, ListPosition};
pub use swap::SwapMove;

/// A move boxed for selectors, arenas and composites.
pub type BoxedMove<S> = Box<dyn Move<S>>;

/// Entities touched by a move. Most moves touch one or two.
pub type MoveEntities = SmallVec<[EntityRef; 2]>;

/// A move that modifies one or more planning variables.
///
/// # Implementation Notes
/// - `create_undo_move` is called on the state *before* `do_move`, and the
///   returned move restores exactly that state.
/// - `do_move` brackets every mutation and triggers the variable listeners.
/// - Moves refer to entities through [`EntityRef`] handles, so a move created
///   against one director can be applied to a clone of its working solution.
pub trait Move<S: PlanningSolution>: Send + Sync + Debug {
    /// Returns true if applying this move changes the working solution.
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool;

    /// Executes this move on the working solution.
    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()>;

    /// Builds the move that reverts this one, from the current state.
    fn create_undo_move(&self, score_director: &dyn ScoreDirector<S>) -> BoxedMove<S>;

    /// Executes this move and returns its undo.
    ///
    /// Moves whose undo depends on intermediate states (composites) override
    /// this to capture each part's undo as it is applied.
    fn do_move_with_undo(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<BoxedMove<S>> {
        let undo = self.create_undo_move(score_director);
        self.do_move(score_director)?;
        Ok(undo)
    }

    /// Entities whose variables this move changes; tabu search keys on them.
    fn planning_entities(&self) -> MoveEntities;

    /// Hashes of the values this move assigns; value tabu keys on them.
    ///
    /// Called while the move is applied, so moves that read their values from
    /// the solution see the assigned ones.
    fn planning_value_hashes(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]>;

    fn box_clone(&self) -> BoxedMove<S>;
}

impl<S: PlanningSolution> Clone for BoxedMove<S> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Stable hash of a planning value for tabu bookkeeping.
pub(crate) fn value_hash<V: Hash>(value: &V) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
