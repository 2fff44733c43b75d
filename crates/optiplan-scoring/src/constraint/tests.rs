use optiplan_core::{EntityRef, HardSoftScore, SimpleScore};

use super::*;
use crate::api::constraint_set::{ConstraintSet, IncrementalConstraint};

struct Shifts {
    hours: Vec<i64>,
}

fn count(s: &Shifts) -> usize {
    s.hours.len()
}

fn overtime(s: &Shifts, i: usize) -> SimpleScore {
    SimpleScore::of(-(s.hours[i] - 8).max(0))
}

fn same_hours(s: &Shifts, a: usize, b: usize) -> SimpleScore {
    if s.hours[a] == s.hours[b] {
        SimpleScore::of(-1)
    } else {
        SimpleScore::ZERO
    }
}

fn change(
    constraint: &mut impl IncrementalConstraint<Shifts, SimpleScore>,
    shifts: &mut Shifts,
    score: &mut SimpleScore,
    i: usize,
    hours: i64,
) {
    let entity = EntityRef::new(0, i);
    *score = *score + constraint.on_retract(shifts, entity);
    shifts.hours[i] = hours;
    *score = *score + constraint.on_insert(shifts, entity);
}

#[test]
fn test_uni_incremental_matches_evaluate() {
    let mut shifts = Shifts {
        hours: vec![8, 10, 12],
    };
    let mut constraint = UniConstraint::new("overtime", 0, count, overtime);
    let mut score = constraint.initialize(&shifts);
    assert_eq!(score, SimpleScore::of(-6));

    change(&mut constraint, &mut shifts, &mut score, 1, 7);
    change(&mut constraint, &mut shifts, &mut score, 0, 9);
    assert_eq!(score, constraint.evaluate(&shifts));
    assert_eq!(score, SimpleScore::of(-5));
}

#[test]
fn test_bi_incremental_matches_evaluate() {
    let mut shifts = Shifts {
        hours: vec![8, 8, 8, 4],
    };
    let mut constraint = BiConstraint::new("same hours", 0, count, same_hours);
    let mut score = constraint.initialize(&shifts);
    assert_eq!(score, SimpleScore::of(-3));

    change(&mut constraint, &mut shifts, &mut score, 0, 4);
    assert_eq!(score, SimpleScore::of(-2));
    change(&mut constraint, &mut shifts, &mut score, 3, 6);
    change(&mut constraint, &mut shifts, &mut score, 2, 6);
    assert_eq!(score, constraint.evaluate(&shifts));
}

#[test]
fn test_insert_and_retract_are_idempotent() {
    let shifts = Shifts { hours: vec![8, 8] };
    let mut constraint = BiConstraint::new("same hours", 0, count, same_hours);
    constraint.initialize(&shifts);
    let e = EntityRef::new(0, 1);

    assert_eq!(constraint.on_insert(&shifts, e), SimpleScore::ZERO);
    assert_eq!(constraint.on_retract(&shifts, e), SimpleScore::of(1));
    assert_eq!(constraint.on_retract(&shifts, e), SimpleScore::ZERO);
    assert_eq!(constraint.on_insert(&shifts, e), SimpleScore::of(-1));
}

#[test]
fn test_other_descriptor_is_ignored() {
    let shifts = Shifts { hours: vec![12] };
    let mut constraint = UniConstraint::new("overtime", 0, count, overtime);
    constraint.initialize(&shifts);
    assert_eq!(
        constraint.on_retract(&shifts, EntityRef::new(1, 0)),
        SimpleScore::ZERO
    );
}

#[test]
fn test_added_entity_grows_bookkeeping() {
    let mut shifts = Shifts { hours: vec![8] };
    let mut constraint = BiConstraint::new("same hours", 0, count, same_hours);
    constraint.initialize(&shifts);
    shifts.hours.push(8);
    assert_eq!(
        constraint.on_insert(&shifts, EntityRef::new(0, 1)),
        SimpleScore::of(-1)
    );
}

#[test]
fn test_tuple_set_tracks_per_constraint_scores() {
    let shifts = Shifts {
        hours: vec![10, 10],
    };
    let mut set = (
        UniConstraint::new("overtime", 0, count, overtime),
        BiConstraint::new("same hours", 0, count, same_hours),
    );
    let mut scores = vec![SimpleScore::ZERO; set.constraint_count()];
    let total = set.initialize_all(&shifts, &mut scores);

    assert_eq!(set.constraint_count(), 2);
    assert_eq!(total, SimpleScore::of(-5));
    assert_eq!(scores, vec![SimpleScore::of(-4), SimpleScore::of(-1)]);
    assert_eq!(set.evaluate_all(&shifts), total);
    assert_eq!(set.matches_all(&shifts).len(), 3);
}

#[test]
fn test_boxed_constraints_form_a_set() {
    fn hard_overtime(s: &Shifts, i: usize) -> HardSoftScore {
        HardSoftScore::of_hard(-(s.hours[i] - 12).max(0))
    }
    fn soft_hours(s: &Shifts, i: usize) -> HardSoftScore {
        HardSoftScore::of_soft(-s.hours[i])
    }
    let shifts = Shifts {
        hours: vec![14, 6],
    };
    let set: Vec<Box<dyn IncrementalConstraint<Shifts, HardSoftScore>>> = vec![
        Box::new(UniConstraint::new("hard overtime", 0, count, hard_overtime)),
        Box::new(UniConstraint::new("soft hours", 0, count, soft_hours)),
    ];
    assert_eq!(set.constraint_names(), vec!["hard overtime", "soft hours"]);
    assert_eq!(set.evaluate_all(&shifts), HardSoftScore::of(-2, -20));
}
