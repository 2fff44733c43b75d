//! Heuristic components for solving
//!
//! This module contains:
//! - Moves: Operations that modify planning variables
//! - Selectors: Components that enumerate entities, values, and moves

pub mod r#move;
pub mod selector;

// Re-export move types
pub use r#move::{
    BoxedMove, ChainedChangeMove, ChangeMove, CompositeMove, ListChangeMove, ListPosition, Move,
    MoveArena, MoveEntities, SwapMove,
};

// Re-export selector types
pub use selector::{
    AllEntitiesSelector, CachingMoveSelector, CartesianProductMoveSelector,
    ChainedChangeMoveSelector, ChangeMoveSelector, EntitySelector, FilteringMoveSelector,
    FromSolutionEntitySelector, FromValueRangeSelector, ListChangeMoveSelector, MimicRecorder,
    MimicRecordingEntitySelector, MimicRecordingValueSelector, MimicReplayer,
    MimicReplayingEntitySelector, MimicReplayingValueSelector, MoveSelector, PlacementMoves,
    ShufflingMoveSelector, StaticTypedValueSelector, SwapMoveSelector, TypedValueSelector,
    UnionMoveSelector,
};
