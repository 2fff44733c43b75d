//! Exhaustive search phase using branch-and-bound.
//!
//! Exhaustive search explores the assignments of every uninitialized entity
//! systematically. Each entity is one layer of the search tree; each step
//! pops the most promising node, restores its state and expands it into one
//! child per candidate value.
//!
//! # Exploration Types
//!
//! - **Depth First**: Explores deepest nodes first (memory efficient)
//! - **Breadth First**: Explores level by level
//! - **Score First**: Explores best-scoring nodes first (greedy)
//! - **Optimistic Bound First**: Explores most promising bounds first (A*)
//!
//! Branch and bound skips children whose optimistic bound cannot beat the
//! best pessimistic bound, and prunes the queue whenever that bound
//! improves. Brute force queues every child.

mod bounder;
mod decider;
mod node;

use std::fmt;

use optiplan_config::NodeExplorationType;
use optiplan_core::{EntityRef, PlanningSolution, Result};
use tracing::{debug, info};

use crate::heuristic::selector::{EntitySelector, PlacementMoves};
use crate::phase::Phase;
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

pub use bounder::{ScoreBounder, ScoreTrend, TrendScoreBounder};
pub use decider::ExhaustiveSearchDecider;
pub use node::{ExhaustiveSearchNode, ExpandableNodeQueue};

use decider::SearchTree;

const PHASE_TYPE: &str = "Exhaustive Search";

/// Exhaustive search phase that explores all possible solutions.
///
/// At phase end the best solution found is loaded back into the score
/// director.
///
/// # Example
///
/// ```
/// use optiplan_solver::heuristic::selector::{ChangeMoveSelector, FromSolutionEntitySelector};
/// use optiplan_solver::phase::exhaustive::{ExhaustiveSearchPhase, TrendScoreBounder};
/// use optiplan_core::SimpleScore;
/// use optiplan_test::nqueens::nqueens_descriptor;
/// use optiplan_test::NQueensSolution;
///
/// let placer = ChangeMoveSelector::<NQueensSolution, i64, _, _>::from_descriptor(&nqueens_descriptor(), 0, "row").unwrap();
/// let phase = ExhaustiveSearchPhase::<NQueensSolution>::branch_and_bound(
///     Box::new(FromSolutionEntitySelector::new(0)),
///     Box::new(placer),
///     Box::new(TrendScoreBounder::only_down::<SimpleScore>()),
/// );
/// ```
pub struct ExhaustiveSearchPhase<S: PlanningSolution> {
    entity_selector: Box<dyn EntitySelector<S>>,
    decider: ExhaustiveSearchDecider<S>,
    node_exploration_type: NodeExplorationType,
    termination: Option<Box<dyn Termination<S>>>,
}

impl<S: PlanningSolution> fmt::Debug for ExhaustiveSearchPhase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhaustiveSearchPhase")
            .field("entity_selector", &self.entity_selector)
            .field("decider", &self.decider)
            .field("node_exploration_type", &self.node_exploration_type)
            .field("termination", &self.termination)
            .finish()
    }
}

impl<S: PlanningSolution> ExhaustiveSearchPhase<S> {
    /// Branch and bound, exploring the best optimistic bound first.
    pub fn branch_and_bound(
        entity_selector: Box<dyn EntitySelector<S>>,
        move_source: Box<dyn PlacementMoves<S>>,
        bounder: Box<dyn ScoreBounder<S>>,
    ) -> Self {
        Self {
            entity_selector,
            decider: ExhaustiveSearchDecider::new(move_source, Some(bounder)),
            node_exploration_type: NodeExplorationType::OptimisticBoundFirst,
            termination: None,
        }
    }

    /// Depth-first search without pruning.
    pub fn brute_force(
        entity_selector: Box<dyn EntitySelector<S>>,
        move_source: Box<dyn PlacementMoves<S>>,
    ) -> Self {
        Self {
            entity_selector,
            decider: ExhaustiveSearchDecider::new(move_source, None),
            node_exploration_type: NodeExplorationType::DepthFirst,
            termination: None,
        }
    }

    pub fn with_node_exploration_type(mut self, node_exploration_type: NodeExplorationType) -> Self {
        self.node_exploration_type = node_exploration_type;
        self
    }

    pub fn with_stop_at_first_improving_solution(mut self, stop: bool) -> Self {
        self.decider = self.decider.with_stop_at_first_improving_solution(stop);
        self
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn node_exploration_type(&self) -> NodeExplorationType {
        self.node_exploration_type
    }

    /// Uninitialized entities in selection order, one per layer.
    fn collect_layers(&mut self, phase_scope: &mut PhaseScope<'_, S>) -> Vec<EntityRef> {
        let (score_director, rng) = phase_scope.director_and_rng();
        self.entity_selector.phase_started(score_director, rng);
        self.entity_selector.step_started(score_director, rng);
        let decider = &self.decider;
        self.entity_selector
            .iter(score_director)
            .filter(|&entity| !decider.is_initialized(score_director, entity))
            .collect()
    }

    fn run_steps(&mut self, phase_scope: &mut PhaseScope<'_, S>, tree: &mut SearchTree<S>) -> Result<()> {
        loop {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                break;
            }
            let Some(index) = tree.pop() else {
                break;
            };
            let mut step_scope = StepScope::new(phase_scope.step_count());
            phase_scope.fire_step_started();

            tree.restore(phase_scope.score_director_mut(), index)?;
            let step_score = phase_scope.calculate_score()?;
            phase_scope
                .solver_scope()
                .assert_score(step_score, "exhaustive search node restore")?;

            let stop = self.decider.expand_node(phase_scope, tree, &mut step_scope)?;

            step_scope.set_score(step_score);
            phase_scope.set_last_step_score(step_score);
            phase_scope.increment_step_count();
            debug!(
                step = step_scope.step_index(),
                depth = tree.node(index).map_or(0, ExhaustiveSearchNode::depth),
                score = ?step_score,
                best_pessimistic_bound = ?tree.best_pessimistic_bound(),
                queued = tree.queue_len(),
                selected = step_scope.selected_move_count(),
                "Exhaustive search step"
            );
            phase_scope.fire_step_ended();
            if stop {
                break;
            }
        }
        Ok(())
    }
}

impl<S: PlanningSolution> Phase<S> for ExhaustiveSearchPhase<S> {
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<()> {
        let mut phase_scope = PhaseScope::start(solver_scope, phase_index, PHASE_TYPE)?;
        let layers = self.collect_layers(&mut phase_scope);
        info!(
            phase_index,
            layers = layers.len(),
            exploration = ?self.node_exploration_type,
            bounded = self.decider.is_score_bounder_enabled(),
            "Exhaustive search started"
        );
        if layers.is_empty() {
            self.entity_selector.phase_ended();
            phase_scope.end();
            return Ok(());
        }

        let root_score = phase_scope.starting_score();
        let (optimistic, pessimistic) = {
            let score_director = phase_scope.score_director();
            (
                self.decider.optimistic_bound(score_director, root_score),
                self.decider.pessimistic_bound(score_director, root_score),
            )
        };
        let mut tree = SearchTree::new(
            layers,
            ExhaustiveSearchNode::root(root_score, optimistic),
            pessimistic,
            self.node_exploration_type,
        );

        let result = self.run_steps(&mut phase_scope, &mut tree).and_then(|()| {
            if let Some(score) = phase_scope.solver_scope_mut().restore_best_solution()? {
                phase_scope.set_last_step_score(score);
            }
            Ok(())
        });
        info!(
            phase_index,
            nodes = tree.node_count(),
            best_score = ?phase_scope.best_score(),
            "Exhaustive search ended"
        );
        self.entity_selector.phase_ended();
        phase_scope.end();
        result
    }

    fn phase_type_name(&self) -> &'static str {
        PHASE_TYPE
    }
}
