//! Constraint that weighs every entity of a descriptor on its own.

use std::fmt;

use optiplan_core::{EntityRef, Score};

use crate::api::analysis::ConstraintMatch;
use crate::api::constraint_set::IncrementalConstraint;

/// Penalizes or rewards single entities.
///
/// `weigh` returns the score impact of one entity; zero means no match.
/// Entity indices beyond the tracked range (entities added by a problem
/// change) grow the bookkeeping on demand.
pub struct UniConstraint<S, Sc> {
    name: &'static str,
    descriptor_index: usize,
    count: fn(&S) -> usize,
    weigh: fn(&S, usize) -> Sc,
    inserted: Vec<Option<Sc>>,
}

impl<S, Sc: Score> UniConstraint<S, Sc> {
    pub fn new(
        name: &'static str,
        descriptor_index: usize,
        count: fn(&S) -> usize,
        weigh: fn(&S, usize) -> Sc,
    ) -> Self {
        Self {
            name,
            descriptor_index,
            count,
            weigh,
            inserted: Vec::new(),
        }
    }
}

impl<S, Sc: Score> IncrementalConstraint<S, Sc> for UniConstraint<S, Sc> {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, solution: &S) -> Sc {
        (0..(self.count)(solution))
            .map(|i| (self.weigh)(solution, i))
            .fold(Sc::zero(), |total, score| total + score)
    }

    fn initialize(&mut self, solution: &S) -> Sc {
        let count = (self.count)(solution);
        self.inserted.clear();
        self.inserted.resize(count, None);
        let mut total = Sc::zero();
        for i in 0..count {
            total = total + self.on_insert(solution, EntityRef::new(self.descriptor_index, i));
        }
        total
    }

    fn on_insert(&mut self, solution: &S, entity: EntityRef) -> Sc {
        if entity.descriptor_index != self.descriptor_index {
            return Sc::zero();
        }
        let i = entity.entity_index;
        if i >= self.inserted.len() {
            self.inserted.resize(i + 1, None);
        }
        if self.inserted[i].is_some() {
            return Sc::zero();
        }
        let score = (self.weigh)(solution, i);
        self.inserted[i] = Some(score);
        score
    }

    fn on_retract(&mut self, _solution: &S, entity: EntityRef) -> Sc {
        if entity.descriptor_index != self.descriptor_index {
            return Sc::zero();
        }
        match self.inserted.get_mut(entity.entity_index).and_then(Option::take) {
            Some(score) => -score,
            None => Sc::zero(),
        }
    }

    fn matches(&self, solution: &S) -> Vec<ConstraintMatch<Sc>> {
        (0..(self.count)(solution))
            .filter_map(|i| {
                let score = (self.weigh)(solution, i);
                (score != Sc::zero()).then(|| {
                    ConstraintMatch::new(
                        self.name,
                        score,
                        vec![EntityRef::new(self.descriptor_index, i)],
                    )
                })
            })
            .collect()
    }
}

impl<S, Sc> fmt::Debug for UniConstraint<S, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniConstraint")
            .field("name", &self.name)
            .field("descriptor_index", &self.descriptor_index)
            .finish()
    }
}
