// Incremental constraints and typed constraint sets.
//
// A constraint keeps its own bookkeeping of which entities it has inserted.
// The score director retracts an entity before any of its variables change
// and inserts it again afterwards, so each constraint only recomputes the
// matches that involve the changed entity.

use optiplan_core::{EntityRef, Score};

use super::analysis::ConstraintMatch;

// A single constraint with incremental scoring capability.
//
// # Incremental Protocol
//
// 1. `initialize` inserts every entity and returns the total score
// 2. Before an entity changes: `on_retract` returns the negated impact of its
//    current matches
// 3. After the change: `on_insert` returns the impact of its new matches
//
// Both calls are idempotent per entity: inserting an inserted entity or
// retracting a retracted one returns zero.
pub trait IncrementalConstraint<S, Sc: Score>: Send {
    fn name(&self) -> &str;

    // Full evaluation, independent of the incremental state.
    fn evaluate(&self, solution: &S) -> Sc;

    fn initialize(&mut self, solution: &S) -> Sc;

    fn on_insert(&mut self, solution: &S, entity: EntityRef) -> Sc;

    fn on_retract(&mut self, solution: &S, entity: EntityRef) -> Sc;

    // Matches of the current solution with the entities that justify them.
    fn matches(&self, _solution: &S) -> Vec<ConstraintMatch<Sc>> {
        Vec::new()
    }
}

impl<S: 'static, Sc: Score> IncrementalConstraint<S, Sc> for Box<dyn IncrementalConstraint<S, Sc>> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, solution: &S) -> Sc {
        (**self).evaluate(solution)
    }

    fn initialize(&mut self, solution: &S) -> Sc {
        (**self).initialize(solution)
    }

    fn on_insert(&mut self, solution: &S, entity: EntityRef) -> Sc {
        (**self).on_insert(solution, entity)
    }

    fn on_retract(&mut self, solution: &S, entity: EntityRef) -> Sc {
        (**self).on_retract(solution, entity)
    }

    fn matches(&self, solution: &S) -> Vec<ConstraintMatch<Sc>> {
        (**self).matches(solution)
    }
}

// A set of constraints evaluated together.
//
// Every incremental method also accumulates each constraint's delta into
// `scores`, one slot per constraint in declaration order, so the backend can
// report a per-constraint breakdown when a score corruption is detected.
pub trait ConstraintSet<S, Sc: Score>: Send {
    fn constraint_count(&self) -> usize;

    fn constraint_names(&self) -> Vec<String>;

    fn evaluate_all(&self, solution: &S) -> Sc {
        self.evaluate_each(solution)
            .into_iter()
            .fold(Sc::zero(), |total, score| total + score)
    }

    fn evaluate_each(&self, solution: &S) -> Vec<Sc>;

    fn initialize_all(&mut self, solution: &S, scores: &mut [Sc]) -> Sc;

    fn on_insert_all(&mut self, solution: &S, entity: EntityRef, scores: &mut [Sc]) -> Sc;

    fn on_retract_all(&mut self, solution: &S, entity: EntityRef, scores: &mut [Sc]) -> Sc;

    fn matches_all(&self, solution: &S) -> Vec<ConstraintMatch<Sc>>;
}

impl<S, Sc: Score> ConstraintSet<S, Sc> for () {
    fn constraint_count(&self) -> usize {
        0
    }

    fn constraint_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn evaluate_each(&self, _solution: &S) -> Vec<Sc> {
        Vec::new()
    }

    fn initialize_all(&mut self, _solution: &S, _scores: &mut [Sc]) -> Sc {
        Sc::zero()
    }

    fn on_insert_all(&mut self, _solution: &S, _entity: EntityRef, _scores: &mut [Sc]) -> Sc {
        Sc::zero()
    }

    fn on_retract_all(&mut self, _solution: &S, _entity: EntityRef, _scores: &mut [Sc]) -> Sc {
        Sc::zero()
    }

    fn matches_all(&self, _solution: &S) -> Vec<ConstraintMatch<Sc>> {
        Vec::new()
    }
}

impl<S, Sc: Score, C: IncrementalConstraint<S, Sc>> ConstraintSet<S, Sc> for Vec<C> {
    fn constraint_count(&self) -> usize {
        self.len()
    }

    fn constraint_names(&self) -> Vec<String> {
        self.iter().map(|c| c.name().to_string()).collect()
    }

    fn evaluate_each(&self, solution: &S) -> Vec<Sc> {
        self.iter().map(|c| c.evaluate(solution)).collect()
    }

    fn initialize_all(&mut self, solution: &S, scores: &mut [Sc]) -> Sc {
        let mut total = Sc::zero();
        for (constraint, slot) in self.iter_mut().zip(scores.iter_mut()) {
            let delta = constraint.initialize(solution);
            *slot = *slot + delta;
            total = total + delta;
        }
        total
    }

    fn on_insert_all(&mut self, solution: &S, entity: EntityRef, scores: &mut [Sc]) -> Sc {
        let mut total = Sc::zero();
        for (constraint, slot) in self.iter_mut().zip(scores.iter_mut()) {
            let delta = constraint.on_insert(solution, entity);
            *slot = *slot + delta;
            total = total + delta;
        }
        total
    }

    fn on_retract_all(&mut self, solution: &S, entity: EntityRef, scores: &mut [Sc]) -> Sc {
        let mut total = Sc::zero();
        for (constraint, slot) in self.iter_mut().zip(scores.iter_mut()) {
            let delta = constraint.on_retract(solution, entity);
            *slot = *slot + delta;
            total = total + delta;
        }
        total
    }

    fn matches_all(&self, solution: &S) -> Vec<ConstraintMatch<Sc>> {
        self.iter().flat_map(|c| c.matches(solution)).collect()
    }
}

macro_rules! impl_constraint_set_for_tuple {
    ($($idx:tt: $T:ident),+) => {
        impl<S, Sc, $($T),+> ConstraintSet<S, Sc> for ($($T,)+)
        where
            Sc: Score,
            $($T: IncrementalConstraint<S, Sc>,)+
        {
            #[inline]
            fn constraint_count(&self) -> usize {
                [$($idx),+].len()
            }

            fn constraint_names(&self) -> Vec<String> {
                vec![$(self.$idx.name().to_string()),+]
            }

            fn evaluate_each(&self, solution: &S) -> Vec<Sc> {
                vec![$(self.$idx.evaluate(solution)),+]
            }

            fn initialize_all(&mut self, solution: &S, scores: &mut [Sc]) -> Sc {
                let mut total = Sc::zero();
                $(
                    let delta = self.$idx.initialize(solution);
                    scores[$idx] = scores[$idx] + delta;
                    total = total + delta;
                )+
                total
            }

            fn on_insert_all(&mut self, solution: &S, entity: EntityRef, scores: &mut [Sc]) -> Sc {
                let mut total = Sc::zero();
                $(
                    let delta = self.$idx.on_insert(solution, entity);
                    scores[$idx] = scores[$idx] + delta;
                    total = total + delta;
                )+
                total
            }

            fn on_retract_all(&mut self, solution: &S, entity: EntityRef, scores: &mut [Sc]) -> Sc {
                let mut total = Sc::zero();
                $(
                    let delta = self.$idx.on_retract(solution, entity);
                    scores[$idx] = scores[$idx] + delta;
                    total = total + delta;
                )+
                total
            }

            fn matches_all(&self, solution: &S) -> Vec<ConstraintMatch<Sc>> {
                let mut matches = Vec::new();
                $(matches.extend(self.$idx.matches(solution));)+
                matches
            }
        }
    };
}

impl_constraint_set_for_tuple!(0: C0);
impl_constraint_set_for_tuple!(0: C0, 1: C1);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7);
