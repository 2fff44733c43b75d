//! Move selector decorators for filtering, caching and combining moves.
//!
//! Decorators wrap inner [`MoveSelector`](super::MoveSelector)s to change what
//! they yield or in which order, without knowing the move types involved.
//!
//! - [`CachingMoveSelector`] - materializes moves once per phase or step
//! - [`CartesianProductMoveSelector`] - pairs moves into composite moves
//! - [`FilteringMoveSelector`] - filters moves by predicate
//! - [`ShufflingMoveSelector`] - randomizes move order per step
//! - [`UnionMoveSelector`] - chains selectors sequentially

mod caching;
mod cartesian_product;
mod filtering;
mod shuffling;
mod union;

#[cfg(test)]
mod tests;

pub use caching::CachingMoveSelector;
pub use cartesian_product::CartesianProductMoveSelector;
pub use filtering::FilteringMoveSelector;
pub use shuffling::ShufflingMoveSelector;
pub use union::UnionMoveSelector;
