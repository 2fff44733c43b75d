//! Construction heuristic phase
//!
//! Builds an initial solution by assigning values to uninitialized
//! planning variables one entity at a time.

mod forager;
mod phase;
mod placer;

pub use forager::{ConstructionForager, ForagerPick};
pub use phase::ConstructionHeuristicPhase;
pub use placer::{Placement, QueuedEntityPlacer};
