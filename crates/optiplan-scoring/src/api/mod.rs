//! Public constraint API: incremental constraints and match analysis.

pub mod analysis;
pub mod constraint_set;
