//! Score director: owner of the working solution and its score.

mod default;
mod factory;
mod guard;
mod traits;


pub use default::DefaultScoreDirector;
pub use factory::{DefaultScoreDirectorFactory, ScoreDirectorFactory};
pub use guard::{change_variable, VariableChangeGuard};
pub use traits::ScoreDirector;
