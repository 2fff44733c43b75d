//! Solver handle for submitting problem changes during solving.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use optiplan_core::PlanningSolution;

use super::problem_change::BoxedProblemChange;
use super::ProblemChange;

/// Result of a problem change submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemChangeResult {
    /// Change was queued and will be applied between two steps.
    Queued,
    /// Solver is not running; the change was dropped.
    SolverNotRunning,
    /// The solver side of the queue is gone.
    QueueFull,
}

/// Handle for interacting with a running solver from other threads.
///
/// ```
/// use optiplan_core::{PlanningSolution, Result, SimpleScore};
/// use optiplan_solver::realtime::{
///     ProblemChange, ProblemChangeDirector, ProblemChangeResult, SolverHandle,
/// };
///
/// #[derive(Clone, Debug)]
/// struct Solution { score: Option<SimpleScore> }
///
/// impl PlanningSolution for Solution {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
/// }
///
/// #[derive(Debug)]
/// struct Noop;
///
/// impl ProblemChange<Solution> for Noop {
///     fn do_change(&self, _director: &mut ProblemChangeDirector<'_, Solution>) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let (handle, _receiver) = SolverHandle::<Solution>::new();
///
/// handle.set_solving(true);
/// assert_eq!(handle.add_problem_change(Noop), ProblemChangeResult::Queued);
///
/// handle.set_solving(false);
/// assert_eq!(handle.add_problem_change(Noop), ProblemChangeResult::SolverNotRunning);
/// ```
pub struct SolverHandle<S: PlanningSolution> {
    change_tx: Sender<BoxedProblemChange<S>>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
}

impl<S: PlanningSolution> SolverHandle<S> {
    /// Creates a handle and the receiver the solver consumes changes from.
    pub fn new() -> (Self, ProblemChangeReceiver<S>) {
        let (tx, rx) = mpsc::channel();
        let solving = Arc::new(AtomicBool::new(false));
        let terminate_early = Arc::new(AtomicBool::new(false));

        let handle = Self {
            change_tx: tx,
            solving: Arc::clone(&solving),
            terminate_early: Arc::clone(&terminate_early),
        };
        let receiver = ProblemChangeReceiver {
            change_rx: rx,
            solving,
            terminate_early,
        };
        (handle, receiver)
    }

    pub fn add_problem_change<P: ProblemChange<S> + 'static>(&self, change: P) -> ProblemChangeResult {
        self.add_problem_change_boxed(Box::new(change))
    }

    pub fn add_problem_change_boxed(&self, change: BoxedProblemChange<S>) -> ProblemChangeResult {
        if !self.solving.load(Ordering::SeqCst) {
            return ProblemChangeResult::SolverNotRunning;
        }
        match self.change_tx.send(change) {
            Ok(()) => ProblemChangeResult::Queued,
            Err(_) => ProblemChangeResult::QueueFull,
        }
    }

    pub fn is_solving(&self) -> bool {
        self.solving.load(Ordering::SeqCst)
    }

    /// Asks the solver to stop at the next step boundary.
    pub fn terminate_early(&self) {
        self.terminate_early.store(true, Ordering::SeqCst);
    }

    pub fn set_solving(&self, solving: bool) {
        self.solving.store(solving, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> Clone for SolverHandle<S> {
    fn clone(&self) -> Self {
        Self {
            change_tx: self.change_tx.clone(),
            solving: Arc::clone(&self.solving),
            terminate_early: Arc::clone(&self.terminate_early),
        }
    }
}

impl<S: PlanningSolution> Debug for SolverHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverHandle")
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .field("terminate_early", &self.terminate_early.load(Ordering::SeqCst))
            .finish()
    }
}

/// Solver side of a [`SolverHandle`].
pub struct ProblemChangeReceiver<S: PlanningSolution> {
    change_rx: Receiver<BoxedProblemChange<S>>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
}

impl<S: PlanningSolution> ProblemChangeReceiver<S> {
    pub fn try_recv(&self) -> Option<BoxedProblemChange<S>> {
        self.change_rx.try_recv().ok()
    }

    /// Takes every queued change without blocking.
    pub fn drain_pending(&self) -> Vec<BoxedProblemChange<S>> {
        self.change_rx.try_iter().collect()
    }

    pub fn is_terminate_early_requested(&self) -> bool {
        self.terminate_early.load(Ordering::SeqCst)
    }

    /// The flag [`SolverHandle::terminate_early`] sets.
    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early)
    }

    pub fn set_solving(&self, solving: bool) {
        self.solving.store(solving, Ordering::SeqCst);
    }

    pub fn clear_terminate_early(&self) {
        self.terminate_early.store(false, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> Debug for ProblemChangeReceiver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProblemChangeReceiver")
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ProblemChangeDirector;
    use optiplan_core::Result;
    use optiplan_test::NQueensSolution;

    #[derive(Debug)]
    struct Noop;

    impl ProblemChange<NQueensSolution> for Noop {
        fn do_change(&self, _director: &mut ProblemChangeDirector<'_, NQueensSolution>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn handle_creation() {
        let (handle, _rx) = SolverHandle::<NQueensSolution>::new();
        assert!(!handle.is_solving());
    }

    #[test]
    fn submit_change_when_solving() {
        let (handle, rx) = SolverHandle::<NQueensSolution>::new();
        rx.set_solving(true);

        assert_eq!(handle.add_problem_change(Noop), ProblemChangeResult::Queued);
        assert_eq!(rx.drain_pending().len(), 1);
        assert!(rx.drain_pending().is_empty());
    }

    #[test]
    fn submit_change_when_not_solving() {
        let (handle, rx) = SolverHandle::<NQueensSolution>::new();
        assert_eq!(handle.add_problem_change(Noop), ProblemChangeResult::SolverNotRunning);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn dropped_receiver_reports_queue_full() {
        let (handle, rx) = SolverHandle::<NQueensSolution>::new();
        handle.set_solving(true);
        drop(rx);
        assert_eq!(handle.add_problem_change(Noop), ProblemChangeResult::QueueFull);
    }

    #[test]
    fn changes_from_another_thread() {
        let (handle, rx) = SolverHandle::<NQueensSolution>::new();
        handle.set_solving(true);
        let remote = handle.clone();
        std::thread::spawn(move || {
            for _ in 0..3 {
                remote.add_problem_change(Noop);
            }
        })
        .join()
        .unwrap();
        assert_eq!(rx.drain_pending().len(), 3);
    }

    #[test]
    fn terminate_early() {
        let (handle, rx) = SolverHandle::<NQueensSolution>::new();
        let flag = rx.terminate_early_flag();

        assert!(!rx.is_terminate_early_requested());
        handle.terminate_early();
        assert!(rx.is_terminate_early_requested());
        assert!(flag.load(Ordering::SeqCst));

        rx.clear_terminate_early();
        assert!(!rx.is_terminate_early_requested());
    }
}
