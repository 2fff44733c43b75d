//! External termination via a shared flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use optiplan_core::PlanningSolution;

use super::Termination;
use crate::scope::ScopeSnapshot;

/// Terminates when an external flag is set.
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use optiplan_solver::termination::ExternalTermination;
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let term = ExternalTermination::new(flag.clone());
///
/// flag.store(true, Ordering::SeqCst);
/// ```
#[derive(Debug, Clone)]
pub struct ExternalTermination {
    flag: Arc<AtomicBool>,
}

impl ExternalTermination {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

impl<S: PlanningSolution> Termination<S> for ExternalTermination {
    fn is_terminated(&self, _snapshot: &ScopeSnapshot<S::Score>) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
