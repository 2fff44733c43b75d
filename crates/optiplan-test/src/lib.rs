//! Shared test fixtures for OptiPlan crates.
//!
//! - [`nqueens`] - basic genuine variable with a computed value range
//! - [`routing`] - chained variable with trailing-entity and anchor shadows
//! - [`task`] - list variable with an index shadow
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! optiplan-test = { workspace = true }
//! ```

pub mod nqueens;
pub mod routing;
pub mod task;

pub use nqueens::{NQueensSolution, Queen};
pub use routing::{Customer, RoutingSolution, Vehicle};
pub use task::{Employee, Task, TaskSolution};
