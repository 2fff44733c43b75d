//! Selectors for entities, values, and moves.
//!
//! Selectors enumerate the elements that the solver considers when
//! exploring the solution space. They are lazy and restartable, and receive
//! phase and step lifecycle calls so decorators can cache or reshuffle.

pub mod decorator;
pub mod entity;
pub mod list_change;
pub mod mimic;
pub mod typed_move_selector;
pub mod typed_value;

#[cfg(test)]
mod tests;

pub use decorator::{
    CachingMoveSelector, CartesianProductMoveSelector, FilteringMoveSelector,
    ShufflingMoveSelector, UnionMoveSelector,
};
pub use entity::{AllEntitiesSelector, EntitySelector, FromSolutionEntitySelector};
pub use list_change::ListChangeMoveSelector;
pub use mimic::{
    MimicRecorder, MimicRecordingEntitySelector, MimicRecordingValueSelector, MimicReplayer,
    MimicReplayingEntitySelector, MimicReplayingValueSelector,
};
pub use typed_move_selector::{
    ChainedChangeMoveSelector, ChangeMoveSelector, MoveSelector, PlacementMoves, SwapMoveSelector,
};
pub use typed_value::{FromValueRangeSelector, StaticTypedValueSelector, TypedValueSelector};
