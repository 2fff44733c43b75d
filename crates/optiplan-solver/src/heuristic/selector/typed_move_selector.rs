//! Move selectors for basic and chained variables.
//!
//! A move selector combines an entity selector with a value selector and
//! yields boxed moves lazily. Selectors are restartable: every call to
//! [`MoveSelector::iter`] starts a fresh pass over the working solution.

use std::fmt::{self, Debug};
use std::hash::Hash;

use optiplan_core::domain::{ChainedVariableAccessor, VariableAccessor};
use optiplan_core::{ChainValue, EntityRef, PlanningSolution, Result, SolutionDescriptor};
use optiplan_scoring::ScoreDirector;

use crate::heuristic::r#move::{BoxedMove, ChainedChangeMove, ChangeMove, SwapMove};
use crate::scope::SolverRng;

use super::entity::{EntitySelector, FromSolutionEntitySelector};
use super::typed_value::{FromValueRangeSelector, TypedValueSelector};

/// Yields candidate moves for one step.
pub trait MoveSelector<S: PlanningSolution>: Send + Debug {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a>;

    /// Returns the approximate number of moves.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize;

    /// Returns true if this selector may return the same move multiple times.
    fn is_never_ending(&self) -> bool {
        false
    }

    fn phase_started(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut SolverRng) {}

    fn step_started(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut SolverRng) {}

    fn phase_ended(&mut self) {}
}

impl<S: PlanningSolution> MoveSelector<S> for Box<dyn MoveSelector<S>> {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        (**self).iter(score_director)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        (**self).size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        (**self).is_never_ending()
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        (**self).phase_started(score_director, rng)
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        (**self).step_started(score_director, rng)
    }

    fn phase_ended(&mut self) {
        (**self).phase_ended()
    }
}

/// Moves that initialize one entity, used by construction heuristics.
pub trait PlacementMoves<S: PlanningSolution>: Send + Debug {
    /// True when the entity needs no placement.
    fn is_initialized(&self, score_director: &dyn ScoreDirector<S>, entity: EntityRef) -> bool;

    /// Every candidate assignment of the entity, in selection order.
    fn placement_moves(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> Vec<BoxedMove<S>>;
}

/// Generates a [`ChangeMove`] per entity and candidate value.
///
/// A nullable variable also gets the move that unassigns it.
pub struct ChangeMoveSelector<S, V, ES, VS> {
    entity_selector: ES,
    value_selector: VS,
    variable: &'static str,
    accessor: VariableAccessor<S, V>,
    nullable: bool,
}

impl<S, V, ES: Debug, VS: Debug> Debug for ChangeMoveSelector<S, V, ES, VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeMoveSelector")
            .field("entity_selector", &self.entity_selector)
            .field("value_selector", &self.value_selector)
            .field("variable", &self.variable)
            .field("nullable", &self.nullable)
            .finish()
    }
}

impl<S, V, ES, VS> ChangeMoveSelector<S, V, ES, VS> {
    pub fn new(
        entity_selector: ES,
        value_selector: VS,
        variable: &'static str,
        accessor: VariableAccessor<S, V>,
    ) -> Self {
        Self {
            entity_selector,
            value_selector,
            variable,
            accessor,
            nullable: false,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn variable(&self) -> &'static str {
        self.variable
    }
}

impl<S, V> ChangeMoveSelector<S, V, FromSolutionEntitySelector, FromValueRangeSelector<S, V>>
where
    S: PlanningSolution,
    V: Clone + Send + Sync + 'static,
{
    /// Selector over every movable entity of `descriptor_index` and the
    /// variable's declared value range.
    pub fn from_descriptor(
        descriptor: &SolutionDescriptor<S>,
        descriptor_index: usize,
        variable: &'static str,
    ) -> Result<Self> {
        let nullable = descriptor.find_variable(descriptor_index, variable)?.nullable;
        Ok(Self::new(
            FromSolutionEntitySelector::new(descriptor_index),
            FromValueRangeSelector::new(descriptor, descriptor_index, variable)?,
            variable,
            descriptor.variable_accessor::<V>(descriptor_index, variable)?,
        )
        .with_nullable(nullable))
    }
}

impl<S, V, ES, VS> ChangeMoveSelector<S, V, ES, VS>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Debug + Send + Sync + 'static,
    VS: TypedValueSelector<S, V>,
{
    fn moves_for<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> impl Iterator<Item = BoxedMove<S>> + 'a {
        let variable = self.variable;
        let accessor = self.accessor;
        self.value_selector
            .iter_typed(score_director, entity)
            .map(Some)
            .chain(self.nullable.then_some(None))
            .map(move |value| {
                Box::new(ChangeMove::new(entity, variable, accessor, value)) as BoxedMove<S>
            })
    }
}

impl<S, V, ES, VS> MoveSelector<S> for ChangeMoveSelector<S, V, ES, VS>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Debug + Send + Sync + 'static,
    ES: EntitySelector<S>,
    VS: TypedValueSelector<S, V>,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        Box::new(
            self.entity_selector
                .iter(score_director)
                .flat_map(move |entity| self.moves_for(score_director, entity)),
        )
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        let Some(first) = self.entity_selector.iter(score_director).next() else {
            return 0;
        };
        let values = self.value_selector.size(score_director, first) + usize::from(self.nullable);
        self.entity_selector.size(score_director) * values
    }

    fn is_never_ending(&self) -> bool {
        self.entity_selector.is_never_ending() || self.value_selector.is_never_ending()
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.entity_selector.phase_started(score_director, rng)
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.entity_selector.step_started(score_director, rng)
    }

    fn phase_ended(&mut self) {
        self.entity_selector.phase_ended()
    }
}

impl<S, V, ES, VS> PlacementMoves<S> for ChangeMoveSelector<S, V, ES, VS>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Debug + Send + Sync + 'static,
    ES: Send + Debug,
    VS: TypedValueSelector<S, V>,
{
    fn is_initialized(&self, score_director: &dyn ScoreDirector<S>, entity: EntityRef) -> bool {
        (self.accessor.get)(score_director.working_solution(), entity.entity_index).is_some()
    }

    fn placement_moves(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> Vec<BoxedMove<S>> {
        self.moves_for(score_director, entity).collect()
    }
}

/// Generates a [`SwapMove`] for every unordered pair of selected entities.
pub struct SwapMoveSelector<S, V, ES> {
    entity_selector: ES,
    variable: &'static str,
    accessor: VariableAccessor<S, V>,
}

impl<S, V, ES: Debug> Debug for SwapMoveSelector<S, V, ES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapMoveSelector")
            .field("entity_selector", &self.entity_selector)
            .field("variable", &self.variable)
            .finish()
    }
}

impl<S, V, ES> SwapMoveSelector<S, V, ES> {
    pub fn new(entity_selector: ES, variable: &'static str, accessor: VariableAccessor<S, V>) -> Self {
        Self {
            entity_selector,
            variable,
            accessor,
        }
    }
}

impl<S: PlanningSolution, V: 'static> SwapMoveSelector<S, V, FromSolutionEntitySelector> {
    pub fn from_descriptor(
        descriptor: &SolutionDescriptor<S>,
        descriptor_index: usize,
        variable: &'static str,
    ) -> Result<Self> {
        Ok(Self::new(
            FromSolutionEntitySelector::new(descriptor_index),
            variable,
            descriptor.variable_accessor::<V>(descriptor_index, variable)?,
        ))
    }
}

impl<S, V, ES> MoveSelector<S> for SwapMoveSelector<S, V, ES>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Debug + Send + Sync + 'static,
    ES: EntitySelector<S>,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        let entities: Vec<EntityRef> = self.entity_selector.iter(score_director).collect();
        let count = entities.len();
        let variable = self.variable;
        let accessor = self.accessor;
        Box::new(
            (0..count)
                .flat_map(move |i| (i + 1..count).map(move |j| (i, j)))
                .map(move |(i, j)| {
                    Box::new(SwapMove::new(entities[i], entities[j], variable, accessor))
                        as BoxedMove<S>
                }),
        )
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        let count = self.entity_selector.size(score_director);
        count * count.saturating_sub(1) / 2
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.entity_selector.phase_started(score_director, rng)
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.entity_selector.step_started(score_director, rng)
    }

    fn phase_ended(&mut self) {
        self.entity_selector.phase_ended()
    }
}

/// Generates a [`ChainedChangeMove`] per entity and chain value.
///
/// Values that cannot host the entity (itself, unassigned entities) are
/// still yielded; the moves report themselves as not doable.
pub struct ChainedChangeMoveSelector<S, ES, VS> {
    entity_selector: ES,
    value_selector: VS,
    variable: &'static str,
    accessor: ChainedVariableAccessor<S>,
}

impl<S, ES: Debug, VS: Debug> Debug for ChainedChangeMoveSelector<S, ES, VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedChangeMoveSelector")
            .field("entity_selector", &self.entity_selector)
            .field("value_selector", &self.value_selector)
            .field("variable", &self.variable)
            .finish()
    }
}

impl<S, ES, VS> ChainedChangeMoveSelector<S, ES, VS> {
    pub fn new(
        entity_selector: ES,
        value_selector: VS,
        variable: &'static str,
        accessor: ChainedVariableAccessor<S>,
    ) -> Self {
        Self {
            entity_selector,
            value_selector,
            variable,
            accessor,
        }
    }
}

impl<S: PlanningSolution>
    ChainedChangeMoveSelector<S, FromSolutionEntitySelector, FromValueRangeSelector<S, ChainValue>>
{
    pub fn from_descriptor(
        descriptor: &SolutionDescriptor<S>,
        descriptor_index: usize,
        variable: &'static str,
    ) -> Result<Self> {
        Ok(Self::new(
            FromSolutionEntitySelector::new(descriptor_index),
            FromValueRangeSelector::new(descriptor, descriptor_index, variable)?,
            variable,
            descriptor.chained_accessor(descriptor_index, variable)?,
        ))
    }
}

impl<S, ES, VS> ChainedChangeMoveSelector<S, ES, VS>
where
    S: PlanningSolution,
    VS: TypedValueSelector<S, ChainValue>,
{
    fn moves_for<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> impl Iterator<Item = BoxedMove<S>> + 'a {
        let variable = self.variable;
        let accessor = self.accessor;
        let own = ChainValue::Entity(entity.entity_index);
        self.value_selector
            .iter_typed(score_director, entity)
            .filter(move |&value| value != own)
            .map(move |value| {
                Box::new(ChainedChangeMove::new(entity, variable, accessor, Some(value)))
                    as BoxedMove<S>
            })
    }
}

impl<S, ES, VS> MoveSelector<S> for ChainedChangeMoveSelector<S, ES, VS>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
    VS: TypedValueSelector<S, ChainValue>,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = BoxedMove<S>> + 'a> {
        Box::new(
            self.entity_selector
                .iter(score_director)
                .flat_map(move |entity| self.moves_for(score_director, entity)),
        )
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        let Some(first) = self.entity_selector.iter(score_director).next() else {
            return 0;
        };
        self.entity_selector.size(score_director) * self.value_selector.size(score_director, first)
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.entity_selector.phase_started(score_director, rng)
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.entity_selector.step_started(score_director, rng)
    }

    fn phase_ended(&mut self) {
        self.entity_selector.phase_ended()
    }
}

impl<S, ES, VS> PlacementMoves<S> for ChainedChangeMoveSelector<S, ES, VS>
where
    S: PlanningSolution,
    ES: Send + Debug,
    VS: TypedValueSelector<S, ChainValue>,
{
    fn is_initialized(&self, score_director: &dyn ScoreDirector<S>, entity: EntityRef) -> bool {
        (self.accessor.previous.get)(score_director.working_solution(), entity.entity_index)
            .is_some()
    }

    fn placement_moves(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> Vec<BoxedMove<S>> {
        self.moves_for(score_director, entity).collect()
    }
}
