//! Domain model of planning problems
//!
//! - `PlanningSolution`: the working solution and its score
//! - Handles: `EntityRef`, `ChainValue`, `ProblemFactRef`
//! - Descriptors: static registry of entity types, variables and accessors
//! - Listeners: shadow variable maintenance

mod descriptor;
mod entity_ref;
pub mod listener;
mod traits;
mod value_range;
mod variable;

pub use descriptor::{EntityDescriptor, SolutionDescriptor, VariableDescriptor};
pub use entity_ref::{ChainValue, EntityRef, ProblemFactRef};
pub use traits::PlanningSolution;
pub use value_range::ValueRange;
pub use variable::{
    ChainedVariableAccessor, ListVariableAccessor, ShadowKind, VariableAccessor, VariableKind,
};
