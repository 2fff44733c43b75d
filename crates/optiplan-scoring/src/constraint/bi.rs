//! Constraint over unordered pairs of entities of one descriptor.

use std::fmt;

use optiplan_core::{EntityRef, Score};

use crate::api::analysis::ConstraintMatch;
use crate::api::constraint_set::IncrementalConstraint;

/// Penalizes or rewards pairs of distinct entities.
///
/// `weigh(solution, a, b)` is only called with `a < b`; zero means no match.
/// Inserting an entity adds its pairs with every other inserted entity, so a
/// change touches O(n) pairs instead of the O(n²) of a full evaluation.
pub struct BiConstraint<S, Sc> {
    name: &'static str,
    descriptor_index: usize,
    count: fn(&S) -> usize,
    weigh: fn(&S, usize, usize) -> Sc,
    inserted: Vec<bool>,
}

impl<S, Sc: Score> BiConstraint<S, Sc> {
    pub fn new(
        name: &'static str,
        descriptor_index: usize,
        count: fn(&S) -> usize,
        weigh: fn(&S, usize, usize) -> Sc,
    ) -> Self {
        Self {
            name,
            descriptor_index,
            count,
            weigh,
            inserted: Vec::new(),
        }
    }

    fn pair_score(&self, solution: &S, a: usize, b: usize) -> Sc {
        if a < b {
            (self.weigh)(solution, a, b)
        } else {
            (self.weigh)(solution, b, a)
        }
    }

    fn impact_with_inserted(&self, solution: &S, entity: usize) -> Sc {
        self.inserted
            .iter()
            .enumerate()
            .filter(|&(other, &inserted)| inserted && other != entity)
            .map(|(other, _)| self.pair_score(solution, entity, other))
            .fold(Sc::zero(), |total, score| total + score)
    }
}

impl<S, Sc: Score> IncrementalConstraint<S, Sc> for BiConstraint<S, Sc> {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, solution: &S) -> Sc {
        let count = (self.count)(solution);
        let mut total = Sc::zero();
        for a in 0..count {
            for b in (a + 1)..count {
                total = total + (self.weigh)(solution, a, b);
            }
        }
        total
    }

    fn initialize(&mut self, solution: &S) -> Sc {
        let count = (self.count)(solution);
        self.inserted.clear();
        self.inserted.resize(count, false);
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
            self.inserted.resize(i + 1, false);
        }
        if self.inserted[i] {
            return Sc::zero();
        }
        let delta = self.impact_with_inserted(solution, i);
        self.inserted[i] = true;
        delta
    }

    fn on_retract(&mut self, solution: &S, entity: EntityRef) -> Sc {
        if entity.descriptor_index != self.descriptor_index {
            return Sc::zero();
        }
        let i = entity.entity_index;
        if !self.inserted.get(i).copied().unwrap_or(false) {
            return Sc::zero();
        }
        self.inserted[i] = false;
        -self.impact_with_inserted(solution, i)
    }

    fn matches(&self, solution: &S) -> Vec<ConstraintMatch<Sc>> {
        let count = (self.count)(solution);
        let mut matches = Vec::new();
        for a in 0..count {
            for b in (a + 1)..count {
                let score = (self.weigh)(solution, a, b);
                if score != Sc::zero() {
                    matches.push(ConstraintMatch::new(
                        self.name,
                        score,
                        vec![
                            EntityRef::new(self.descriptor_index, a),
                            EntityRef::new(self.descriptor_index, b),
                        ],
                    ));
                }
            }
        }
        matches
    }
}

impl<S, Sc> fmt::Debug for BiConstraint<S, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiConstraint")
            .field("name", &self.name)
            .field("descriptor_index", &self.descriptor_index)
            .finish()
    }
}
