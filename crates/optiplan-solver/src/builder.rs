//! Builder module for constructing solver components from configuration
//!
//! Configuration names strategies and limits; the domain specific parts
//! (which entities to place, which moves to try) are registered in code
//! through [`PhaseComponents`].

use std::fmt;
use std::sync::Arc;

use optiplan_config::{
    AcceptorConfig, CacheType, ConstructionHeuristicConfig, ExhaustiveSearchConfig,
    ExhaustiveSearchType, ForagerConfig, LocalSearchConfig, MoveSelectionConfig,
    NodeExplorationType, PhaseConfig, SelectionOrder, TerminationConfig,
};
use optiplan_core::{OptiplanError, ParseableScore, PlanningSolution, Result};

use crate::heuristic::selector::{
    CachingMoveSelector, EntitySelector, MoveSelector, PlacementMoves, ShufflingMoveSelector,
};
use crate::phase::construction::{
    ConstructionForager, ConstructionHeuristicPhase, QueuedEntityPlacer,
};
use crate::phase::exhaustive::{ExhaustiveSearchPhase, ScoreBounder, TrendScoreBounder};
use crate::phase::localsearch::{
    Acceptor, CompositeAcceptor, HillClimbingAcceptor, LateAcceptanceAcceptor,
    LocalSearchForager, LocalSearchPhase, SimulatedAnnealingAcceptor, TabuAcceptor,
};
use crate::phase::Phase;
use crate::termination::{
    BestScoreFeasibleTermination, BestScoreTermination, OrTermination, StepCountTermination,
    Termination, TimeTermination, UnimprovedStepCountTermination, UnimprovedTimeTermination,
};

type ComponentFn<T> = Arc<dyn Fn() -> Result<T> + Send + Sync>;

/// Domain specific selectors the configured phases are assembled from.
///
/// Every phase gets fresh instances, so the same components can back a
/// construction heuristic and an exhaustive search in one solver.
pub struct PhaseComponents<S: PlanningSolution> {
    entity_selector: ComponentFn<Box<dyn EntitySelector<S>>>,
    placement: ComponentFn<Box<dyn PlacementMoves<S>>>,
    move_selector: Option<ComponentFn<Box<dyn MoveSelector<S>>>>,
    score_bounder: Option<ComponentFn<Box<dyn ScoreBounder<S>>>>,
}

impl<S: PlanningSolution> Clone for PhaseComponents<S> {
    fn clone(&self) -> Self {
        Self {
            entity_selector: Arc::clone(&self.entity_selector),
            placement: Arc::clone(&self.placement),
            move_selector: self.move_selector.clone(),
            score_bounder: self.score_bounder.clone(),
        }
    }
}

impl<S: PlanningSolution> fmt::Debug for PhaseComponents<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseComponents")
            .field("move_selector", &self.move_selector.is_some())
            .field("score_bounder", &self.score_bounder.is_some())
            .finish()
    }
}

impl<S: PlanningSolution> PhaseComponents<S> {
    /// Components for construction heuristics and exhaustive search.
    ///
    /// `entity_selector` orders the entities to place, `placement` lists
    /// the candidate assignments of one entity.
    pub fn new<E, P>(entity_selector: E, placement: P) -> Self
    where
        E: Fn() -> Result<Box<dyn EntitySelector<S>>> + Send + Sync + 'static,
        P: Fn() -> Result<Box<dyn PlacementMoves<S>>> + Send + Sync + 'static,
    {
        Self {
            entity_selector: Arc::new(entity_selector),
            placement: Arc::new(placement),
            move_selector: None,
            score_bounder: None,
        }
    }

    /// Moves tried by local search phases.
    pub fn with_move_selector<M>(mut self, move_selector: M) -> Self
    where
        M: Fn() -> Result<Box<dyn MoveSelector<S>>> + Send + Sync + 'static,
    {
        self.move_selector = Some(Arc::new(move_selector));
        self
    }

    /// Bounder for branch and bound; defaults to treating every score level
    /// as only going down.
    pub fn with_score_bounder<B>(mut self, score_bounder: B) -> Self
    where
        B: Fn() -> Result<Box<dyn ScoreBounder<S>>> + Send + Sync + 'static,
    {
        self.score_bounder = Some(Arc::new(score_bounder));
        self
    }

    pub fn has_move_selector(&self) -> bool {
        self.move_selector.is_some()
    }
}

/// Builds terminations from configuration.
pub struct TerminationBuilder;

impl TerminationBuilder {
    /// OR-combines every configured limit.
    ///
    /// Returns `None` when the configuration sets no limit.
    pub fn build<S>(config: &TerminationConfig) -> Result<Option<Box<dyn Termination<S>>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
    {
        let mut terminations: Vec<Box<dyn Termination<S>>> = Vec::new();
        if let Some(limit) = config.time_limit() {
            terminations.push(Box::new(TimeTermination::new(limit)));
        }
        if let Some(text) = &config.best_score_limit {
            let target = parse_score::<S>("best_score_limit", text)?;
            terminations.push(Box::new(BestScoreTermination::new(target)));
        }
        if config.best_score_feasible {
            terminations.push(Box::new(BestScoreFeasibleTermination::new()));
        }
        if let Some(limit) = config.step_count_limit {
            terminations.push(Box::new(StepCountTermination::new(limit)));
        }
        if let Some(limit) = config.unimproved_step_count_limit {
            terminations.push(Box::new(UnimprovedStepCountTermination::new(limit)));
        }
        if let Some(limit) = config.unimproved_time_limit() {
            terminations.push(Box::new(UnimprovedTimeTermination::new(limit)));
        }

        let termination: Option<Box<dyn Termination<S>>> = match terminations.len() {
            0 => None,
            1 => terminations.pop(),
            _ => Some(Box::new(OrTermination::new(terminations))),
        };
        Ok(termination)
    }
}

/// Builder for constructing acceptors from configuration.
pub struct AcceptorBuilder;

impl AcceptorBuilder {
    /// Builds an acceptor from configuration.
    ///
    /// Each configured strategy adds one acceptor; several are combined in a
    /// [`CompositeAcceptor`]. No configuration means hill climbing.
    pub fn build<S>(config: Option<&AcceptorConfig>) -> Result<Box<dyn Acceptor<S>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
    {
        let Some(config) = config else {
            return Ok(Box::new(HillClimbingAcceptor::<S>::new()));
        };

        let mut acceptors: Vec<Box<dyn Acceptor<S>>> = Vec::new();
        if config.entity_tabu_size.is_some() || config.value_tabu_size.is_some() {
            acceptors.push(Box::new(
                TabuAcceptor::<S>::new(config.entity_tabu_size, config.value_tabu_size)
                    .with_aspiration(config.aspiration_enabled),
            ));
        }
        if let Some(text) = &config.simulated_annealing_starting_temperature {
            let temperature =
                parse_score::<S>("simulated_annealing_starting_temperature", text)?;
            let mut acceptor = SimulatedAnnealingAcceptor::<S>::new(temperature);
            if let Some(rate) = config.simulated_annealing_cooling_rate {
                acceptor = acceptor.with_cooling_rate(rate);
            }
            acceptors.push(Box::new(acceptor));
        }
        if let Some(size) = config.late_acceptance_size {
            acceptors.push(Box::new(LateAcceptanceAcceptor::<S>::new(size)));
        }

        let acceptor: Box<dyn Acceptor<S>> = match acceptors.len() {
            0 => Box::new(HillClimbingAcceptor::<S>::new()),
            1 => acceptors.remove(0),
            _ => Box::new(CompositeAcceptor::new(acceptors)),
        };
        Ok(acceptor)
    }
}

/// Builds phases from configuration and code-registered components.
pub struct PhaseBuilder;

impl PhaseBuilder {
    pub fn build<S>(config: &PhaseConfig, components: &PhaseComponents<S>) -> Result<Box<dyn Phase<S>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
    {
        match config {
            PhaseConfig::ConstructionHeuristic(c) => Self::construction_heuristic(c, components),
            PhaseConfig::LocalSearch(c) => Self::local_search(c, components),
            PhaseConfig::ExhaustiveSearch(c) => Self::exhaustive_search(c, components),
        }
    }

    fn construction_heuristic<S>(
        config: &ConstructionHeuristicConfig,
        components: &PhaseComponents<S>,
    ) -> Result<Box<dyn Phase<S>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
    {
        let placer = QueuedEntityPlacer::new((components.entity_selector)()?, (components.placement)()?);
        let mut phase =
            ConstructionHeuristicPhase::new(placer, ConstructionForager::new(config.pick_early_type));
        if let Some(termination) = phase_termination::<S>(config.termination.as_ref())? {
            phase = phase.with_termination(termination);
        }
        Ok(Box::new(phase))
    }

    fn local_search<S>(
        config: &LocalSearchConfig,
        components: &PhaseComponents<S>,
    ) -> Result<Box<dyn Phase<S>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
    {
        let Some(move_selector) = &components.move_selector else {
            return Err(OptiplanError::Config(
                "local search phase configured but no move selector registered".to_string(),
            ));
        };
        let move_selector = decorate_move_selector(
            move_selector()?,
            config.move_selection.unwrap_or_default(),
        );
        let acceptor = AcceptorBuilder::build::<S>(config.acceptor.as_ref())?;
        let ForagerConfig {
            accepted_count_limit,
            pick_early_type,
        } = config.forager.unwrap_or_default();

        let mut phase = LocalSearchPhase::new(
            move_selector,
            acceptor,
            LocalSearchForager::new(accepted_count_limit, pick_early_type),
        );
        if let Some(termination) = phase_termination::<S>(config.termination.as_ref())? {
            phase = phase.with_termination(termination);
        }
        Ok(Box::new(phase))
    }

    fn exhaustive_search<S>(
        config: &ExhaustiveSearchConfig,
        components: &PhaseComponents<S>,
    ) -> Result<Box<dyn Phase<S>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
    {
        let entity_selector = (components.entity_selector)()?;
        let placement = (components.placement)()?;
        let mut phase = match config.exhaustive_search_type {
            ExhaustiveSearchType::BranchAndBound => {
                let bounder: Box<dyn ScoreBounder<S>> = match &components.score_bounder {
                    Some(bounder) => bounder()?,
                    None => Box::new(TrendScoreBounder::only_down::<S::Score>()),
                };
                let phase = ExhaustiveSearchPhase::branch_and_bound(entity_selector, placement, bounder);
                match config.node_exploration_type {
                    Some(exploration) => phase.with_node_exploration_type(exploration),
                    None => phase,
                }
            }
            ExhaustiveSearchType::BruteForce => {
                match config.node_exploration_type {
                    None | Some(NodeExplorationType::DepthFirst) => {}
                    Some(other) => {
                        return Err(OptiplanError::Config(format!(
                            "brute force explores depth first, node_exploration_type {other:?} is not supported"
                        )));
                    }
                }
                ExhaustiveSearchPhase::brute_force(entity_selector, placement)
            }
        }
        .with_stop_at_first_improving_solution(config.stop_at_first_improving_solution);

        if let Some(termination) = phase_termination::<S>(config.termination.as_ref())? {
            phase = phase.with_termination(termination);
        }
        Ok(Box::new(phase))
    }
}

/// Wraps the selector in the configured cache and order decorators.
fn decorate_move_selector<S: PlanningSolution>(
    selector: Box<dyn MoveSelector<S>>,
    config: MoveSelectionConfig,
) -> Box<dyn MoveSelector<S>> {
    let selector: Box<dyn MoveSelector<S>> = match config.cache_type {
        CacheType::JustInTime => selector,
        cache_type => Box::new(CachingMoveSelector::<S, _>::new(selector, cache_type)),
    };
    match config.selection_order {
        SelectionOrder::Original => selector,
        SelectionOrder::Shuffled => Box::new(ShufflingMoveSelector::new(selector)),
    }
}

fn phase_termination<S>(config: Option<&TerminationConfig>) -> Result<Option<Box<dyn Termination<S>>>>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
{
    match config {
        Some(config) => TerminationBuilder::build::<S>(config),
        None => Ok(None),
    }
}

fn parse_score<S>(field: &str, text: &str) -> Result<S::Score>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
{
    S::Score::parse(text).map_err(|e| OptiplanError::Config(format!("{field} {text:?}: {e}")))
}
