//! Tests for acceptors.

use super::*;
use optiplan_core::{HardSoftScore, SimpleScore};
use optiplan_test::{NQueensSolution, TaskSolution};
use rand::SeedableRng;

fn rng() -> SolverRng {
    SolverRng::seed_from_u64(7)
}

fn candidate<'a, Sc: Copy>(
    last: Sc,
    score: Sc,
    best: Sc,
    entities: &'a [EntityRef],
    values: &'a [u64],
) -> MoveCandidate<'a, Sc> {
    MoveCandidate {
        last_step_score: last,
        move_score: score,
        best_score: best,
        entities,
        value_hashes: values,
    }
}

fn simple(last: i64, score: i64) -> MoveCandidate<'static, SimpleScore> {
    candidate(
        SimpleScore::of(last),
        SimpleScore::of(score),
        SimpleScore::of(last),
        &[],
        &[],
    )
}

fn outcome<'a, Sc: Copy>(score: Sc, entities: &'a [EntityRef], values: &'a [u64]) -> StepOutcome<'a, Sc> {
    StepOutcome {
        step_score: score,
        best_score: score,
        entities,
        value_hashes: values,
    }
}

#[test]
fn test_hill_climbing_accepts_improving_and_equal() {
    let mut acceptor: Box<dyn Acceptor<NQueensSolution>> = Box::new(HillClimbingAcceptor::new());
    let mut rng = rng();
    assert!(acceptor.is_accepted(&simple(-10, -5), &mut rng));
    assert!(acceptor.is_accepted(&simple(-5, -5), &mut rng));
    assert!(!acceptor.is_accepted(&simple(-5, -10), &mut rng));
}

#[test]
fn test_entity_tabu_forbids_recent_entities() {
    let mut acceptor = TabuAcceptor::<NQueensSolution>::new(Some(2), None).with_aspiration(false);
    let mut rng = rng();
    let queen0 = [EntityRef::new(0, 0)];
    let queen1 = [EntityRef::new(0, 1)];
    let zero = SimpleScore::of(0);
    acceptor.phase_started(&zero);

    acceptor.step_ended(&outcome(zero, &queen0, &[]));
    assert!(!acceptor.is_accepted(&candidate(zero, zero, zero, &queen0, &[]), &mut rng));
    assert!(acceptor.is_accepted(&candidate(zero, zero, zero, &queen1, &[]), &mut rng));

    // Tenure 2: queen 0 leaves the list after two more steps.
    acceptor.step_ended(&outcome(zero, &queen1, &[]));
    assert!(!acceptor.is_accepted(&candidate(zero, zero, zero, &queen0, &[]), &mut rng));
    acceptor.step_ended(&outcome(zero, &[], &[]));
    assert!(acceptor.is_accepted(&candidate(zero, zero, zero, &queen0, &[]), &mut rng));
    assert!(!acceptor.is_accepted(&candidate(zero, zero, zero, &queen1, &[]), &mut rng));
}

#[test]
fn test_value_tabu_and_aspiration() {
    let mut acceptor = TabuAcceptor::<NQueensSolution>::new(None, Some(3));
    let mut rng = rng();
    let entity = [EntityRef::new(0, 3)];
    acceptor.phase_started(&SimpleScore::of(-4));
    acceptor.step_ended(&outcome(SimpleScore::of(-3), &entity, &[42]));

    let tabu = candidate(SimpleScore::of(-3), SimpleScore::of(-3), SimpleScore::of(-3), &entity, &[42]);
    assert!(!acceptor.is_accepted(&tabu, &mut rng));

    // A new best score overrides the tabu.
    let aspirated = candidate(SimpleScore::of(-3), SimpleScore::of(-1), SimpleScore::of(-3), &entity, &[42]);
    assert!(acceptor.is_accepted(&aspirated, &mut rng));

    let other_value = candidate(SimpleScore::of(-3), SimpleScore::of(-9), SimpleScore::of(-3), &entity, &[7]);
    assert!(acceptor.is_accepted(&other_value, &mut rng));
}

#[test]
fn test_tabu_lists_reset_on_phase_start() {
    let mut acceptor = TabuAcceptor::<NQueensSolution>::new(Some(5), None).with_aspiration(false);
    let mut rng = rng();
    let queen = [EntityRef::new(0, 0)];
    let zero = SimpleScore::of(0);
    acceptor.step_ended(&outcome(zero, &queen, &[]));
    acceptor.phase_started(&zero);
    assert!(acceptor.is_accepted(&candidate(zero, zero, zero, &queen, &[]), &mut rng));
}

#[test]
fn test_simulated_annealing_probability_per_level() {
    let mut acceptor = SimulatedAnnealingAcceptor::<TaskSolution>::new(HardSoftScore::of(0, 10));
    acceptor.phase_started(&HardSoftScore::of(0, 0));
    acceptor.step_started(0.0);

    let last = HardSoftScore::of(0, -20);
    assert_eq!(acceptor.acceptance_probability(&last, &HardSoftScore::of(0, -10)), 1.0);
    let p = acceptor.acceptance_probability(&last, &HardSoftScore::of(0, -30));
    assert!((p - (-1.0f64).exp()).abs() < 1e-9);
    // Hard level has temperature 0: losing hard score is never accepted.
    assert_eq!(acceptor.acceptance_probability(&last, &HardSoftScore::of(-1, 0)), 0.0);
}

#[test]
fn test_simulated_annealing_soft_gain_does_not_offset_hard_loss() {
    let mut acceptor = SimulatedAnnealingAcceptor::<TaskSolution>::new(HardSoftScore::of(1, 10));
    acceptor.phase_started(&HardSoftScore::of(0, 0));
    acceptor.step_started(0.0);

    let last = HardSoftScore::of(0, 0);
    let worse = HardSoftScore::of(-1, 100);
    assert!(worse < last);
    let p = acceptor.acceptance_probability(&last, &worse);
    assert!((p - (-1.0f64).exp()).abs() < 1e-9);
}

#[test]
fn test_simulated_annealing_cools_with_time_gradient() {
    let mut acceptor = SimulatedAnnealingAcceptor::<NQueensSolution>::new(SimpleScore::of(100));
    acceptor.phase_started(&SimpleScore::of(0));
    acceptor.step_started(0.75);
    assert_eq!(acceptor.temperature(), &[25.0]);
    acceptor.step_started(1.0);
    assert_eq!(acceptor.temperature(), &[0.0]);
    assert_eq!(
        acceptor.acceptance_probability(&SimpleScore::of(0), &SimpleScore::of(-1)),
        0.0
    );
}

#[test]
fn test_simulated_annealing_cooling_rate_per_step() {
    let mut acceptor =
        SimulatedAnnealingAcceptor::<NQueensSolution>::new(SimpleScore::of(8)).with_cooling_rate(0.5);
    acceptor.phase_started(&SimpleScore::of(0));
    acceptor.step_started(0.9);
    assert_eq!(acceptor.temperature(), &[8.0]);
    acceptor.step_ended(&outcome(SimpleScore::of(0), &[], &[]));
    acceptor.step_ended(&outcome(SimpleScore::of(0), &[], &[]));
    assert_eq!(acceptor.temperature(), &[2.0]);
}

#[test]
fn test_simulated_annealing_draws_are_reproducible() {
    let draws = || {
        let mut acceptor = SimulatedAnnealingAcceptor::<NQueensSolution>::new(SimpleScore::of(2));
        acceptor.phase_started(&SimpleScore::of(0));
        acceptor.step_started(0.0);
        let mut rng = rng();
        (0..20)
            .map(|_| acceptor.is_accepted(&simple(0, -2), &mut rng))
            .collect::<Vec<_>>()
    };
    let first = draws();
    assert_eq!(first, draws());
    assert!(first.iter().any(|&a| a));
    assert!(first.iter().any(|&a| !a));
}

#[test]
fn test_late_acceptance_compares_with_old_step_score() {
    let mut acceptor = LateAcceptanceAcceptor::<NQueensSolution>::new(2);
    let mut rng = rng();
    acceptor.phase_started(&SimpleScore::of(-10));

    // Worse than the last step but as good as the score two steps back.
    assert!(acceptor.is_accepted(&simple(-5, -10), &mut rng));
    assert!(!acceptor.is_accepted(&simple(-5, -11), &mut rng));

    acceptor.step_ended(&outcome(SimpleScore::of(-5), &[], &[]));
    acceptor.step_ended(&outcome(SimpleScore::of(-4), &[], &[]));
    // History is now [-5, -4]; the late score is -5.
    assert!(acceptor.is_accepted(&simple(-4, -5), &mut rng));
    assert!(!acceptor.is_accepted(&simple(-4, -6), &mut rng));
}

fn boxed_composite<S: PlanningSolution>(parts: Vec<Box<dyn Acceptor<S>>>) -> Box<dyn Acceptor<S>> {
    Box::new(CompositeAcceptor::new(parts))
}

#[test]
fn test_composite_debug_lists_parts() {
    let acceptor = boxed_composite::<TaskSolution>(vec![
        Box::new(HillClimbingAcceptor::new()),
        Box::new(LateAcceptanceAcceptor::new(3)),
    ]);
    let debug = format!("{acceptor:?}");
    assert!(debug.starts_with("CompositeAcceptor"));
    assert!(debug.contains("LateAcceptanceAcceptor"));
}

#[test]
fn test_composite_multiplies_and_short_circuits() {
    let mut acceptor = CompositeAcceptor::<NQueensSolution>::new(vec![
        Box::new(TabuAcceptor::new(Some(1), None).with_aspiration(false)),
        Box::new(HillClimbingAcceptor::new()),
    ]);
    let mut rng = rng();
    let queen = [EntityRef::new(0, 0)];
    let other = [EntityRef::new(0, 1)];
    let zero = SimpleScore::of(0);
    acceptor.phase_started(&zero);
    acceptor.step_ended(&outcome(zero, &queen, &[]));

    assert_eq!(
        acceptor.acceptance_weight(&candidate(zero, zero, zero, &queen, &[]), &mut rng),
        0.0
    );
    assert_eq!(
        acceptor.acceptance_weight(&candidate(zero, zero, zero, &other, &[]), &mut rng),
        1.0
    );
    assert_eq!(
        acceptor.acceptance_weight(
            &candidate(zero, SimpleScore::of(-1), zero, &other, &[]),
            &mut rng
        ),
        0.0
    );
    assert_eq!(acceptor.len(), 2);
}
