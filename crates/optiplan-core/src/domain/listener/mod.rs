//! Variable listeners that keep shadow variables consistent.
//!
//! - [`VariableListener`]: contract of a listener, driven by the score director
//! - [`VariableListenerGraph`]: registration-ordered set of listeners with
//!   deferred, de-duplicated after-notifications
//! - Built-in listeners: [`TrailingEntityListener`] (inverse of a chained
//!   variable), [`AnchorVariableListener`] and [`IndexVariableListener`]

mod anchor;
mod graph;
mod index;
mod trailing;
mod traits;

#[cfg(test)]
mod tests;

pub use anchor::AnchorVariableListener;
pub use graph::VariableListenerGraph;
pub use index::IndexVariableListener;
pub use trailing::{TrailingEntityIndex, TrailingEntityListener};
pub use traits::{ListenerSource, NoopShadowSink, ShadowVariableSink, VariableListener};
