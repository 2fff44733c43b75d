//! OptiPlan Scoring - Score directors and incremental constraint bookkeeping
//!
//! The score director owns the working solution, receives the before/after
//! hooks of every variable, entity and problem fact change, keeps shadow
//! variables consistent through the variable listener graph and maintains the
//! working score through a [`ScoreBackend`].

pub mod api;
pub mod backend;
pub mod constraint;
pub mod director;

pub use api::analysis::{
    build_indictment_map, ConstraintMatch, ConstraintMatchTotal, ConstraintMatchTotalMap,
    Indictment, IndictmentMap,
};
pub use api::constraint_set::{ConstraintSet, IncrementalConstraint};
pub use backend::{ConstraintSetBackend, EasyScoreBackend, ScoreBackend};
pub use constraint::{BiConstraint, UniConstraint};
pub use director::{
    change_variable, DefaultScoreDirector, DefaultScoreDirectorFactory, ScoreDirector,
    ScoreDirectorFactory, VariableChangeGuard,
};
