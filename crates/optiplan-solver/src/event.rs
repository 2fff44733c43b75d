//! Event system for solver monitoring.
//!
//! Two kinds of listeners can be registered on a [`SolverEventSupport`]:
//!
//! - [`SolverEventListener`]: best solution changes, solving started/ended
//! - [`PhaseLifecycleListener`]: the phase and step lifecycle, observed
//!   through [`ScopeSnapshot`]s
//!
//! All listener methods are called synchronously, in registration order, on
//! the solving thread. [`ChannelBestSolutionListener`] forwards best solutions
//! to another thread or task.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use optiplan_core::{PlanningSolution, SimpleScore};
//! use optiplan_solver::event::{SolverEventListener, SolverEventSupport};
//!
//! #[derive(Clone, Debug)]
//! struct MySolution { score: Option<SimpleScore> }
//! impl PlanningSolution for MySolution {
//!     type Score = SimpleScore;
//!     fn score(&self) -> Option<Self::Score> { self.score }
//!     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
//! }
//!
//! #[derive(Debug)]
//! struct MyListener;
//! impl SolverEventListener<MySolution> for MyListener {
//!     fn on_best_solution_changed(&self, _solution: &MySolution, score: &SimpleScore) {
//!         println!("New best: {score}");
//!     }
//! }
//!
//! let mut support = SolverEventSupport::<MySolution>::new();
//! support.add_solver_listener(Arc::new(MyListener));
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use optiplan_core::PlanningSolution;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::scope::ScopeSnapshot;

/// Listener for solver-level events.
pub trait SolverEventListener<S: PlanningSolution>: Send + Sync + Debug {
    /// Called when a new best solution is found.
    fn on_best_solution_changed(&self, solution: &S, score: &S::Score);

    fn on_solving_started(&self, _solution: &S) {}

    fn on_solving_ended(&self, _solution: &S, _is_terminated_early: bool) {}
}

/// Listener for the solving, phase and step lifecycle.
///
/// Every method has an empty default; implement only what is needed.
pub trait PhaseLifecycleListener<S: PlanningSolution>: Send + Sync + Debug {
    fn solving_started(&self, _snapshot: &ScopeSnapshot<S::Score>) {}

    fn phase_started(&self, _snapshot: &ScopeSnapshot<S::Score>) {}

    fn step_started(&self, _snapshot: &ScopeSnapshot<S::Score>) {}

    fn step_ended(&self, _snapshot: &ScopeSnapshot<S::Score>) {}

    fn phase_ended(&self, _snapshot: &ScopeSnapshot<S::Score>) {}

    fn solving_ended(&self, _snapshot: &ScopeSnapshot<S::Score>) {}
}

/// Central event broadcaster for solver events.
pub struct SolverEventSupport<S: PlanningSolution> {
    solver_listeners: Vec<Arc<dyn SolverEventListener<S>>>,
    phase_listeners: Vec<Arc<dyn PhaseLifecycleListener<S>>>,
}

impl<S: PlanningSolution> SolverEventSupport<S> {
    pub fn new() -> Self {
        Self {
            solver_listeners: Vec::new(),
            phase_listeners: Vec::new(),
        }
    }

    pub fn add_solver_listener(&mut self, listener: Arc<dyn SolverEventListener<S>>) {
        self.solver_listeners.push(listener);
    }

    pub fn add_phase_listener(&mut self, listener: Arc<dyn PhaseLifecycleListener<S>>) {
        self.phase_listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.solver_listeners.clear();
        self.phase_listeners.clear();
    }

    pub fn fire_best_solution_changed(&self, solution: &S, score: &S::Score) {
        for listener in &self.solver_listeners {
            listener.on_best_solution_changed(solution, score);
        }
    }

    pub fn fire_solving_started(&self, solution: &S, snapshot: &ScopeSnapshot<S::Score>) {
        for listener in &self.solver_listeners {
            listener.on_solving_started(solution);
        }
        for listener in &self.phase_listeners {
            listener.solving_started(snapshot);
        }
    }

    pub fn fire_solving_ended(
        &self,
        solution: &S,
        is_terminated_early: bool,
        snapshot: &ScopeSnapshot<S::Score>,
    ) {
        for listener in &self.phase_listeners {
            listener.solving_ended(snapshot);
        }
        for listener in &self.solver_listeners {
            listener.on_solving_ended(solution, is_terminated_early);
        }
    }

    pub fn fire_phase_started(&self, snapshot: &ScopeSnapshot<S::Score>) {
        for listener in &self.phase_listeners {
            listener.phase_started(snapshot);
        }
    }

    pub fn fire_phase_ended(&self, snapshot: &ScopeSnapshot<S::Score>) {
        for listener in &self.phase_listeners {
            listener.phase_ended(snapshot);
        }
    }

    pub fn fire_step_started(&self, snapshot: &ScopeSnapshot<S::Score>) {
        for listener in &self.phase_listeners {
            listener.step_started(snapshot);
        }
    }

    pub fn fire_step_ended(&self, snapshot: &ScopeSnapshot<S::Score>) {
        for listener in &self.phase_listeners {
            listener.step_ended(snapshot);
        }
    }

    pub fn solver_listener_count(&self) -> usize {
        self.solver_listeners.len()
    }

    pub fn phase_listener_count(&self) -> usize {
        self.phase_listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.solver_listeners.is_empty() || !self.phase_listeners.is_empty()
    }
}

impl<S: PlanningSolution> Default for SolverEventSupport<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> Clone for SolverEventSupport<S> {
    fn clone(&self) -> Self {
        Self {
            solver_listeners: self.solver_listeners.clone(),
            phase_listeners: self.phase_listeners.clone(),
        }
    }
}

impl<S: PlanningSolution> Debug for SolverEventSupport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverEventSupport")
            .field("solver_listeners", &self.solver_listeners.len())
            .field("phase_listeners", &self.phase_listeners.len())
            .finish()
    }
}

/// Reports events through `tracing`.
///
/// Best solutions and phases log at `info`, steps at `debug`.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventListener;

impl LoggingEventListener {
    pub fn new() -> Self {
        Self
    }
}

impl<S: PlanningSolution> SolverEventListener<S> for LoggingEventListener {
    fn on_best_solution_changed(&self, _solution: &S, score: &S::Score) {
        info!(best_score = %score, "New best solution");
    }

    fn on_solving_started(&self, _solution: &S) {
        info!("Solving started");
    }

    fn on_solving_ended(&self, _solution: &S, is_terminated_early: bool) {
        info!(is_terminated_early, "Solving ended");
    }
}

impl<S: PlanningSolution> PhaseLifecycleListener<S> for LoggingEventListener {
    fn phase_started(&self, snapshot: &ScopeSnapshot<S::Score>) {
        info!(phase_index = ?snapshot.phase_index, best_score = ?snapshot.best_score, "Phase started");
    }

    fn step_ended(&self, snapshot: &ScopeSnapshot<S::Score>) {
        debug!(
            phase_index = ?snapshot.phase_index,
            step = snapshot.step_count,
            score = ?snapshot.last_step_score,
            "Step ended"
        );
    }

    fn phase_ended(&self, snapshot: &ScopeSnapshot<S::Score>) {
        info!(
            phase_index = ?snapshot.phase_index,
            steps = snapshot.step_count,
            best_score = ?snapshot.best_score,
            "Phase ended"
        );
    }
}

/// Counts event occurrences.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    best_solution_count: AtomicUsize,
    solving_started_count: AtomicUsize,
    solving_ended_count: AtomicUsize,
    phase_started_count: AtomicUsize,
    phase_ended_count: AtomicUsize,
    step_started_count: AtomicUsize,
    step_ended_count: AtomicUsize,
}

impl CountingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_solution_count(&self) -> usize {
        self.best_solution_count.load(Ordering::SeqCst)
    }

    pub fn solving_started_count(&self) -> usize {
        self.solving_started_count.load(Ordering::SeqCst)
    }

    pub fn solving_ended_count(&self) -> usize {
        self.solving_ended_count.load(Ordering::SeqCst)
    }

    pub fn phase_started_count(&self) -> usize {
        self.phase_started_count.load(Ordering::SeqCst)
    }

    pub fn phase_ended_count(&self) -> usize {
        self.phase_ended_count.load(Ordering::SeqCst)
    }

    pub fn step_started_count(&self) -> usize {
        self.step_started_count.load(Ordering::SeqCst)
    }

    pub fn step_ended_count(&self) -> usize {
        self.step_ended_count.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        for counter in [
            &self.best_solution_count,
            &self.solving_started_count,
            &self.solving_ended_count,
            &self.phase_started_count,
            &self.phase_ended_count,
            &self.step_started_count,
            &self.step_ended_count,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }
}

impl<S: PlanningSolution> SolverEventListener<S> for CountingEventListener {
    fn on_best_solution_changed(&self, _solution: &S, _score: &S::Score) {
        self.best_solution_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_solving_started(&self, _solution: &S) {
        self.solving_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_solving_ended(&self, _solution: &S, _is_terminated_early: bool) {
        self.solving_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> PhaseLifecycleListener<S> for CountingEventListener {
    fn phase_started(&self, _snapshot: &ScopeSnapshot<S::Score>) {
        self.phase_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn step_started(&self, _snapshot: &ScopeSnapshot<S::Score>) {
        self.step_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn step_ended(&self, _snapshot: &ScopeSnapshot<S::Score>) {
        self.step_ended_count.fetch_add(1, Ordering::SeqCst);
    }

    fn phase_ended(&self, _snapshot: &ScopeSnapshot<S::Score>) {
        self.phase_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A best solution published on a channel.
#[derive(Debug, Clone)]
pub struct BestSolutionEvent<S: PlanningSolution> {
    pub solution: S,
    pub score: S::Score,
}

/// Streams every new best solution over an unbounded channel.
///
/// Sending never blocks the solving thread. Once the receiver is dropped the
/// events are discarded.
pub struct ChannelBestSolutionListener<S: PlanningSolution> {
    sender: mpsc::UnboundedSender<BestSolutionEvent<S>>,
}

impl<S: PlanningSolution> ChannelBestSolutionListener<S> {
    pub fn new(sender: mpsc::UnboundedSender<BestSolutionEvent<S>>) -> Self {
        Self { sender }
    }

    /// Creates a listener together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BestSolutionEvent<S>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl<S: PlanningSolution> Debug for ChannelBestSolutionListener<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelBestSolutionListener")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl<S: PlanningSolution> SolverEventListener<S> for ChannelBestSolutionListener<S> {
    fn on_best_solution_changed(&self, solution: &S, score: &S::Score) {
        let event = BestSolutionEvent {
            solution: solution.clone(),
            score: *score,
        };
        if self.sender.send(event).is_err() {
            debug!("Best solution receiver dropped");
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
