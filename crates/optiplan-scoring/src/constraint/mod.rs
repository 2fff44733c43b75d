//! Ready-made incremental constraints over the entities of one descriptor.

mod bi;
mod uni;

#[cfg(test)]
mod tests;

pub use bi::BiConstraint;
pub use uni::UniConstraint;
