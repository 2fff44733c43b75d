//! Runtime metadata about the planning model.
//!
//! A [`SolutionDescriptor`] is built once per problem class and shared by the
//! score director, the listener graph and the selectors.

mod entity;
mod solution;
mod variable;

#[cfg(test)]
mod tests;

pub use entity::EntityDescriptor;
pub use solution::SolutionDescriptor;
pub use variable::VariableDescriptor;
