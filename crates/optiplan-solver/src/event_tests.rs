//! Tests for the event system.

use std::time::Duration;

use super::*;
use optiplan_core::SimpleScore;
use optiplan_test::NQueensSolution;

fn snapshot() -> ScopeSnapshot<SimpleScore> {
    ScopeSnapshot {
        phase_index: Some(0),
        elapsed: Duration::ZERO,
        step_count: 1,
        unimproved_step_count: 0,
        unimproved_time: Duration::ZERO,
        best_score: Some(SimpleScore::of(-2)),
        best_initialized: true,
        last_step_score: Some(SimpleScore::of(-2)),
        calculation_count: 3,
    }
}

#[test]
fn test_event_support_new() {
    let support: SolverEventSupport<NQueensSolution> = SolverEventSupport::new();
    assert_eq!(support.solver_listener_count(), 0);
    assert_eq!(support.phase_listener_count(), 0);
    assert!(!support.has_listeners());
}

#[test]
fn test_event_support_fire_events() {
    let mut support: SolverEventSupport<NQueensSolution> = SolverEventSupport::new();
    let listener = Arc::new(CountingEventListener::new());
    support.add_solver_listener(listener.clone());
    support.add_phase_listener(listener.clone());
    assert!(support.has_listeners());

    let solution = NQueensSolution::with_rows(&[0, 1]);
    let snap = snapshot();
    support.fire_solving_started(&solution, &snap);
    support.fire_phase_started(&snap);
    support.fire_step_started(&snap);
    support.fire_step_ended(&snap);
    support.fire_step_started(&snap);
    support.fire_step_ended(&snap);
    support.fire_best_solution_changed(&solution, &SimpleScore::of(-1));
    support.fire_phase_ended(&snap);
    support.fire_solving_ended(&solution, false, &snap);

    assert_eq!(listener.solving_started_count(), 1);
    assert_eq!(listener.phase_started_count(), 1);
    assert_eq!(listener.step_started_count(), 2);
    assert_eq!(listener.step_ended_count(), 2);
    assert_eq!(listener.best_solution_count(), 1);
    assert_eq!(listener.phase_ended_count(), 1);
    assert_eq!(listener.solving_ended_count(), 1);

    listener.reset();
    assert_eq!(listener.step_ended_count(), 0);
}

#[test]
fn test_cleared_support_fires_nothing() {
    let mut support: SolverEventSupport<NQueensSolution> = SolverEventSupport::new();
    let listener = Arc::new(CountingEventListener::new());
    support.add_solver_listener(listener.clone());
    support.clear_listeners();

    support.fire_best_solution_changed(&NQueensSolution::with_rows(&[0]), &SimpleScore::of(0));
    assert_eq!(listener.best_solution_count(), 0);
}

#[test]
fn test_channel_listener_streams_best_solutions() {
    let (listener, mut receiver) = ChannelBestSolutionListener::<NQueensSolution>::channel();
    let mut support = SolverEventSupport::new();
    support.add_solver_listener(Arc::new(listener));

    support.fire_best_solution_changed(&NQueensSolution::with_rows(&[0, 0]), &SimpleScore::of(-1));
    support.fire_best_solution_changed(&NQueensSolution::with_rows(&[0, 1]), &SimpleScore::of(0));

    let first = receiver.try_recv().unwrap();
    assert_eq!(first.score, SimpleScore::of(-1));
    let second = receiver.try_recv().unwrap();
    assert_eq!(second.solution.rows(), vec![Some(0), Some(1)]);
    assert!(receiver.try_recv().is_err());
}

#[test]
fn test_channel_listener_survives_dropped_receiver() {
    let (listener, receiver) = ChannelBestSolutionListener::<NQueensSolution>::channel();
    drop(receiver);
    listener.on_best_solution_changed(&NQueensSolution::with_rows(&[0]), &SimpleScore::of(0));
}
