//! Constraint match analysis.
//!
//! When constraint match tracking is enabled, the score director can explain
//! its score as a set of [`ConstraintMatch`]es, summarized per constraint
//! ([`ConstraintMatchTotal`]) and per entity ([`Indictment`]).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use optiplan_core::{EntityRef, Score};

/// One match of a constraint and its score impact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatch<Sc: Score> {
    pub constraint_name: String,
    pub score: Sc,
    /// Entities that caused the match.
    pub justification: Vec<EntityRef>,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    pub fn new(constraint_name: impl Into<String>, score: Sc, justification: Vec<EntityRef>) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            score,
            justification,
        }
    }
}

impl<Sc: Score> fmt::Display for ConstraintMatch<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.constraint_name, self.score, self.justification)
    }
}

/// All matches of one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_name: String,
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn new(constraint_name: impl Into<String>) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            score: Sc::zero(),
            matches: Vec::new(),
        }
    }

    pub fn add_match(&mut self, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.matches.push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Constraint match totals keyed by constraint name.
pub type ConstraintMatchTotalMap<Sc> = BTreeMap<String, ConstraintMatchTotal<Sc>>;

/// How a single entity impacts the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indictment<Sc: Score> {
    pub entity: EntityRef,
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            score: Sc::zero(),
            matches: Vec::new(),
        }
    }

    pub fn add_match(&mut self, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.matches.push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

pub type IndictmentMap<Sc> = HashMap<EntityRef, Indictment<Sc>>;

/// Groups the matches of every constraint total by justified entity.
///
/// A match justified by the same entity twice indicts it once.
pub fn build_indictment_map<Sc: Score>(totals: &ConstraintMatchTotalMap<Sc>) -> IndictmentMap<Sc> {
    let mut map: IndictmentMap<Sc> = HashMap::new();
    for total in totals.values() {
        for m in &total.matches {
            let mut seen: Vec<EntityRef> = Vec::with_capacity(m.justification.len());
            for &entity in &m.justification {
                if seen.contains(&entity) {
                    continue;
                }
                seen.push(entity);
                map.entry(entity)
                    .or_insert_with(|| Indictment::new(entity))
                    .add_match(m.clone());
            }
        }
    }
    map
}

/// Describes per-constraint differences between an incrementally maintained
/// breakdown and one calculated from scratch.
pub fn describe_breakdown_diff<Sc: Score>(working: &[(String, Sc)], uncorrupted: &[(String, Sc)]) -> String {
    let mut lines = Vec::new();
    for (name, scratch) in uncorrupted {
        match working.iter().find(|(n, _)| n == name) {
            Some((_, incremental)) if incremental == scratch => {}
            Some((_, incremental)) => lines.push(format!(
                "  {}: working {} but uncorrupted {}",
                name, incremental, scratch
            )),
            None => lines.push(format!("  {}: missing from working breakdown", name)),
        }
    }
    if lines.is_empty() {
        "no per-constraint difference found".to_string()
    } else {
        format!("constraints with a corrupted score:\n{}", lines.join("\n"))
    }
}
