//! OptiPlan Core - Core types and traits for move-based optimization
//!
//! This crate provides the foundations the solver and score director build on:
//! - Score types for representing solution quality
//! - Domain traits and descriptors for planning problems
//! - Shadow variable listeners that keep derived state consistent
//! - The error taxonomy shared by all OptiPlan crates

pub mod domain;
pub mod error;
pub mod score;

pub use domain::{
    ChainValue, EntityRef, PlanningSolution, ProblemFactRef, SolutionDescriptor, ValueRange,
};
pub use error::{OptiplanError, Result};
pub use score::{
    HardMediumSoftScore, HardSoftScore, ParseableScore, Score, ScoreLevel, ScoreParseError,
    SimpleScore,
};
