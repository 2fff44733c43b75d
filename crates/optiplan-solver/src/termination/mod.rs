//! Termination conditions for the solver and its phases.
//!
//! A termination inspects a [`ScopeSnapshot`]: the solver-level snapshot when
//! configured on the solver, the phase-level one when configured on a phase.

mod best_score;
mod composite;
mod external;
mod step_count;
mod time;
mod unimproved;

use std::fmt::Debug;
use std::sync::Arc;

use optiplan_core::PlanningSolution;

use crate::scope::ScopeSnapshot;

pub use best_score::{BestScoreFeasibleTermination, BestScoreTermination};
pub use composite::{AndTermination, OrTermination};
pub use external::ExternalTermination;
pub use step_count::StepCountTermination;
pub use time::TimeTermination;
pub use unimproved::{UnimprovedStepCountTermination, UnimprovedTimeTermination};

/// Trait for determining when to stop solving.
pub trait Termination<S: PlanningSolution>: Send + Sync + Debug {
    /// Returns true if solving should terminate.
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool;

    /// Fraction of the budget already spent, between 0 and 1.
    ///
    /// `None` when this termination does not measure progress.
    fn time_gradient(&self, _snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
        None
    }
}

impl<S: PlanningSolution> Termination<S> for Box<dyn Termination<S>> {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        (**self).is_terminated(snapshot)
    }

    fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
        (**self).time_gradient(snapshot)
    }
}

impl<S: PlanningSolution> Termination<S> for Arc<dyn Termination<S>> {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        (**self).is_terminated(snapshot)
    }

    fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
        (**self).time_gradient(snapshot)
    }
}
