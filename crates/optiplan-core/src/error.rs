//! Error taxonomy for OptiPlan
//!
//! Errors fall into four families: configuration errors raised while the
//! model is built, corruption errors raised when an internal invariant of the
//! working solution is broken, empty selections, and failed external
//! problem changes. Only the last two are recoverable.

use thiserror::Error;

/// Main error type for OptiPlan operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptiplanError {
    /// Error in solver or model configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A lookup by type matched no registered entity descriptor
    #[error("Entity type {0} is not registered on the solution descriptor")]
    UnregisteredEntityType(String),

    /// A genuine variable was declared without a value range
    #[error("Variable {entity}.{variable} has no value range")]
    MissingValueRange {
        entity: &'static str,
        variable: &'static str,
    },

    /// An "after" notification arrived without its matching "before"
    #[error("Score director hook mismatch on {hook}: {detail}")]
    HookMismatch { hook: &'static str, detail: String },

    /// The trailing-entity index of a chained variable lost uniqueness
    #[error("Trailing entity corruption: {0}")]
    TrailingEntityCorruption(String),

    /// The incremental score diverged from a from-scratch calculation
    #[error(
        "Score corruption ({context}): working score {working_score} differs from \
         uncorrupted score {uncorrupted_score}\n{analysis}"
    )]
    ScoreCorruption {
        working_score: String,
        uncorrupted_score: String,
        context: String,
        analysis: String,
    },

    /// A move was applied although it was not doable
    #[error("Move is not doable: {0}")]
    MoveNotDoable(String),

    /// Constraint matches were requested while tracking is disabled
    #[error("Constraint match tracking is not enabled on this score director")]
    ConstraintMatchNotEnabled,

    /// A phase had no candidate to pick from
    #[error("Empty selection in {phase}: {detail}")]
    EmptySelection { phase: &'static str, detail: String },

    /// A problem change referenced an object absent from the working solution
    #[error("Working object not found: {0}")]
    WorkingObjectNotFound(String),

    /// Solver was cancelled before completion
    #[error("Solver was cancelled")]
    Cancelled,
}

impl OptiplanError {
    /// Returns true if solving can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OptiplanError::EmptySelection { .. }
                | OptiplanError::WorkingObjectNotFound(_)
                | OptiplanError::Cancelled
        )
    }

    /// Returns true if this error means the working state can no longer be trusted.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            OptiplanError::HookMismatch { .. }
                | OptiplanError::TrailingEntityCorruption(_)
                | OptiplanError::ScoreCorruption { .. }
                | OptiplanError::MoveNotDoable(_)
        )
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            OptiplanError::Config(_)
                | OptiplanError::UnregisteredEntityType(_)
                | OptiplanError::MissingValueRange { .. }
        )
    }
}

/// Result type alias for OptiPlan operations
pub type Result<T> = std::result::Result<T, OptiplanError>;
