//! Termination conditions based on lack of improvement.
//!
//! Both read the unimproved counters of the snapshot, which the scopes derive
//! from the best-solution recaller's last improvement.

use std::time::Duration;

use optiplan_core::PlanningSolution;

use super::Termination;
use crate::scope::ScopeSnapshot;

/// Terminates if the best solution has not improved for `limit` steps.
#[derive(Debug, Clone)]
pub struct UnimprovedStepCountTermination {
    limit: u64,
}

impl UnimprovedStepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<S: PlanningSolution> Termination<S> for UnimprovedStepCountTermination {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        snapshot.unimproved_step_count >= self.limit
    }
}

/// Terminates if the best solution has not improved for a duration.
#[derive(Debug, Clone)]
pub struct UnimprovedTimeTermination {
    limit: Duration,
}

impl UnimprovedTimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl<S: PlanningSolution> Termination<S> for UnimprovedTimeTermination {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        snapshot.unimproved_time >= self.limit
    }
}
