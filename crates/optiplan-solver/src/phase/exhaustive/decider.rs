//! Exhaustive search decider for node expansion.
//!
//! The decider expands one node per step: it tries every candidate value of
//! the next layer's entity, scores the result, and either registers a
//! complete assignment or queues the child if its optimistic bound can still
//! beat the best pessimistic bound.

use std::fmt;

use optiplan_config::NodeExplorationType;
use optiplan_core::{EntityRef, PlanningSolution, Result};
use optiplan_scoring::ScoreDirector;
use tracing::{debug, trace};

use super::bounder::ScoreBounder;
use super::node::{ExhaustiveSearchNode, ExpandableNodeQueue};
use crate::heuristic::selector::PlacementMoves;
use crate::scope::{PhaseScope, StepScope};

const ROOT: usize = 0;

/// Node arena, queue and bounds of one exhaustive search phase.
pub(crate) struct SearchTree<S: PlanningSolution> {
    /// Entity assigned at each depth.
    layers: Vec<EntityRef>,
    nodes: Vec<ExhaustiveSearchNode<S>>,
    queue: ExpandableNodeQueue<S::Score>,
    best_pessimistic_bound: Option<S::Score>,
    /// Whether a complete assignment has reached `best_pessimistic_bound`.
    bound_reached: bool,
    /// Node whose state the working solution holds.
    current: usize,
}

impl<S: PlanningSolution> SearchTree<S> {
    pub(crate) fn new(
        layers: Vec<EntityRef>,
        root: ExhaustiveSearchNode<S>,
        best_pessimistic_bound: Option<S::Score>,
        exploration: NodeExplorationType,
    ) -> Self {
        let mut queue = ExpandableNodeQueue::new(exploration);
        queue.push(ROOT, &root);
        Self {
            layers,
            nodes: vec![root],
            queue,
            best_pessimistic_bound,
            bound_reached: false,
            current: ROOT,
        }
    }

    pub(crate) fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn best_pessimistic_bound(&self) -> Option<S::Score> {
        self.best_pessimistic_bound
    }

    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.queue.pop()
    }

    pub(crate) fn node(&self, index: usize) -> Option<&ExhaustiveSearchNode<S>> {
        self.nodes.get(index)
    }

    /// Records the score of a complete assignment as the best bound and
    /// prunes every node that cannot beat it.
    ///
    /// Returns the number of pruned nodes.
    pub(crate) fn register_pessimistic_bound(&mut self, bound: S::Score) -> usize {
        self.best_pessimistic_bound = Some(bound);
        self.bound_reached = true;
        self.queue.prune(bound)
    }

    /// Records a bound the score bounder guarantees for some complete
    /// assignment below a queued node.
    ///
    /// No assignment has reached it yet, so nodes that can still tie it stay
    /// queued. Returns the number of pruned nodes.
    pub(crate) fn register_guaranteed_bound(&mut self, bound: S::Score) -> usize {
        self.best_pessimistic_bound = Some(bound);
        self.bound_reached = false;
        self.queue.prune_below(bound)
    }

    /// Whether a complete assignment scoring `score` would be a new best.
    fn can_improve(&self, score: S::Score) -> bool {
        match self.best_pessimistic_bound {
            None => true,
            Some(best) => score > best || (score == best && !self.bound_reached),
        }
    }

    fn raises_bound(&self, bound: S::Score) -> bool {
        self.best_pessimistic_bound.map_or(true, |best| bound > best)
    }

    fn parent_of(&self, index: usize) -> usize {
        self.nodes
            .get(index)
            .and_then(ExhaustiveSearchNode::parent)
            .unwrap_or(ROOT)
    }

    fn depth_of(&self, index: usize) -> usize {
        self.nodes.get(index).map_or(0, ExhaustiveSearchNode::depth)
    }

    /// Moves the working solution from the current node to `target`.
    ///
    /// Undoes up to the common ancestor, then replays the moves down to the
    /// target.
    pub(crate) fn restore(&mut self, score_director: &mut dyn ScoreDirector<S>, target: usize) -> Result<()> {
        let mut old = self.current;
        let mut new = target;
        let mut undo_path = Vec::new();
        let mut redo_path = Vec::new();
        while old != new {
            if self.depth_of(old) < self.depth_of(new) {
                redo_path.push(new);
                new = self.parent_of(new);
            } else {
                undo_path.push(old);
                old = self.parent_of(old);
            }
        }
        for index in undo_path {
            if let Some(undo) = self.nodes[index].undo_move() {
                undo.do_move(score_director)?;
            }
        }
        for &index in redo_path.iter().rev() {
            if let Some(mv) = self.nodes[index].step_move() {
                mv.do_move(score_director)?;
            }
        }
        self.current = target;
        Ok(())
    }
}

impl<S: PlanningSolution> fmt::Debug for SearchTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchTree")
            .field("layers", &self.layers.len())
            .field("nodes", &self.nodes.len())
            .field("queue", &self.queue.len())
            .field("best_pessimistic_bound", &self.best_pessimistic_bound)
            .finish()
    }
}

/// Expands nodes with the candidate moves of each layer's entity.
///
/// Without a bounder every child is queued (brute force).
pub struct ExhaustiveSearchDecider<S: PlanningSolution> {
    move_source: Box<dyn PlacementMoves<S>>,
    bounder: Option<Box<dyn ScoreBounder<S>>>,
    stop_at_first_improving_solution: bool,
}

impl<S: PlanningSolution> fmt::Debug for ExhaustiveSearchDecider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhaustiveSearchDecider")
            .field("move_source", &self.move_source)
            .field("bounder", &self.bounder)
            .field("stop_at_first_improving_solution", &self.stop_at_first_improving_solution)
            .finish()
    }
}

impl<S: PlanningSolution> ExhaustiveSearchDecider<S> {
    pub fn new(move_source: Box<dyn PlacementMoves<S>>, bounder: Option<Box<dyn ScoreBounder<S>>>) -> Self {
        Self {
            move_source,
            bounder,
            stop_at_first_improving_solution: false,
        }
    }

    pub fn with_stop_at_first_improving_solution(mut self, stop: bool) -> Self {
        self.stop_at_first_improving_solution = stop;
        self
    }

    pub fn is_score_bounder_enabled(&self) -> bool {
        self.bounder.is_some()
    }

    pub(crate) fn is_initialized(&self, score_director: &dyn ScoreDirector<S>, entity: EntityRef) -> bool {
        self.move_source.is_initialized(score_director, entity)
    }

    pub(crate) fn optimistic_bound(
        &self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
    ) -> Option<S::Score> {
        self.bounder
            .as_ref()
            .map(|b| b.optimistic_bound(score_director, score))
    }

    pub(crate) fn pessimistic_bound(
        &self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
    ) -> Option<S::Score> {
        self.bounder
            .as_ref()
            .map(|b| b.pessimistic_bound(score_director, score))
    }

    /// Expands the node the working solution currently holds.
    ///
    /// Returns true if a complete assignment improved the best bound and the
    /// phase should stop there.
    pub(crate) fn expand_node(
        &self,
        phase_scope: &mut PhaseScope<'_, S>,
        tree: &mut SearchTree<S>,
        step_scope: &mut StepScope<S::Score>,
    ) -> Result<bool> {
        let parent = tree.current;
        let depth = tree.depth_of(parent);
        let Some(&entity) = tree.layers.get(depth) else {
            return Ok(false);
        };
        let is_last_layer = depth + 1 == tree.layers.len();
        let moves: Vec<_> = {
            let score_director = phase_scope.score_director();
            self.move_source
                .placement_moves(score_director, entity)
                .into_iter()
                .filter(|mv| mv.is_doable(score_director))
                .collect()
        };
        let fully_asserted = phase_scope.environment_mode().is_fully_asserted();

        let mut stop = false;
        for mv in moves {
            step_scope.record_selected();
            let undo = mv.do_move_with_undo(phase_scope.score_director_mut())?;
            let score = phase_scope.calculate_score()?;
            if fully_asserted {
                phase_scope
                    .score_director()
                    .assert_working_score_from_scratch(score, "exhaustive search move")?;
            }
            trace!(depth, ?mv, score = ?score, "Exhaustive search move");

            if is_last_layer {
                if tree.can_improve(score) {
                    step_scope.record_accepted();
                    let pruned = tree.register_pessimistic_bound(score);
                    phase_scope
                        .solver_scope_mut()
                        .update_best_solution_during_move(score);
                    debug!(score = ?score, pruned, "New best complete assignment");
                    stop = self.stop_at_first_improving_solution;
                }
            } else {
                let score_director = phase_scope.score_director();
                let optimistic = self.optimistic_bound(score_director, score);
                let pessimistic = self.pessimistic_bound(score_director, score);
                if optimistic.map_or(true, |bound| tree.can_improve(bound)) {
                    step_scope.record_accepted();
                    let index = tree.nodes.len();
                    let child = ExhaustiveSearchNode::child(
                        parent,
                        depth + 1,
                        index as u64,
                        mv,
                        undo.clone(),
                        score,
                        optimistic,
                    );
                    tree.queue.push(index, &child);
                    tree.nodes.push(child);
                }
                if let Some(pessimistic) = pessimistic.filter(|&p| tree.raises_bound(p)) {
                    tree.register_guaranteed_bound(pessimistic);
                }
            }
            undo.do_move(phase_scope.score_director_mut())?;
            if stop {
                break;
            }
        }
        Ok(stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::r#move::ChangeMove;
    use crate::test_utils::nqueens_scope_for;
    use optiplan_core::SimpleScore;
    use optiplan_test::nqueens::row_accessor;
    use optiplan_test::NQueensSolution;

    fn change(queen: usize, row: i64) -> crate::heuristic::r#move::BoxedMove<NQueensSolution> {
        Box::new(ChangeMove::new(EntityRef::new(0, queen), "row", row_accessor(), Some(row)))
    }

    #[test]
    fn test_restore_walks_through_common_ancestor() {
        let mut scope = nqueens_scope_for(NQueensSolution::unassigned(3));
        scope.start_solving().unwrap();
        let root = ExhaustiveSearchNode::root(SimpleScore::of(0), None);
        let layers = vec![EntityRef::new(0, 0), EntityRef::new(0, 1)];
        let mut tree = SearchTree::new(layers, root, None, NodeExplorationType::DepthFirst);

        let undo = |queen| {
            Box::new(ChangeMove::new(EntityRef::new(0, queen), "row", row_accessor(), None))
                as crate::heuristic::r#move::BoxedMove<NQueensSolution>
        };
        let zero = SimpleScore::of(0);
        // root -> a (q0=0) -> b (q1=2); root -> c (q0=1)
        tree.nodes.push(ExhaustiveSearchNode::child(0, 1, 1, change(0, 0), undo(0), zero, None));
        tree.nodes.push(ExhaustiveSearchNode::child(1, 2, 2, change(1, 2), undo(1), zero, None));
        tree.nodes.push(ExhaustiveSearchNode::child(0, 1, 3, change(0, 1), undo(0), zero, None));

        tree.restore(scope.score_director_mut(), 2).unwrap();
        assert_eq!(scope.working_solution().rows(), vec![Some(0), Some(2), None]);
        tree.restore(scope.score_director_mut(), 3).unwrap();
        assert_eq!(scope.working_solution().rows(), vec![Some(1), None, None]);
        tree.restore(scope.score_director_mut(), 0).unwrap();
        assert_eq!(scope.working_solution().rows(), vec![None, None, None]);
    }

    #[test]
    fn test_registered_bound_never_grows_queue() {
        let root = ExhaustiveSearchNode::<NQueensSolution>::root(SimpleScore::of(0), Some(SimpleScore::of(0)));
        let mut tree = SearchTree::new(vec![EntityRef::new(0, 0)], root, None, NodeExplorationType::OptimisticBoundFirst);
        for (i, bound) in [-5, -1, -3, -2].into_iter().enumerate() {
            let child = ExhaustiveSearchNode::child(
                0,
                1,
                i as u64 + 1,
                change(0, 0),
                change(0, 0),
                SimpleScore::of(bound),
                Some(SimpleScore::of(bound)),
            );
            tree.queue.push(tree.nodes.len(), &child);
            tree.nodes.push(child);
        }
        let mut size = tree.queue_len();
        for bound in [-4, -3, -3, -1] {
            let pruned = tree.register_pessimistic_bound(SimpleScore::of(bound));
            assert!(tree.queue_len() <= size);
            assert_eq!(size - tree.queue_len(), pruned);
            size = tree.queue_len();
        }
        // Only the root, whose bound 0 still beats -1, remains.
        assert_eq!(tree.queue_len(), 1);
        assert_eq!(tree.best_pessimistic_bound(), Some(SimpleScore::of(-1)));
    }

    #[test]
    fn test_assignment_may_tie_guaranteed_bound() {
        let root = ExhaustiveSearchNode::<NQueensSolution>::root(SimpleScore::of(0), None);
        let mut tree = SearchTree::new(
            vec![EntityRef::new(0, 0)],
            root,
            Some(SimpleScore::of(-2)),
            NodeExplorationType::DepthFirst,
        );
        assert!(tree.can_improve(SimpleScore::of(-2)));
        assert!(!tree.can_improve(SimpleScore::of(-3)));

        tree.register_pessimistic_bound(SimpleScore::of(-2));
        assert!(!tree.can_improve(SimpleScore::of(-2)));
        assert!(tree.can_improve(SimpleScore::of(-1)));
    }

    #[test]
    fn test_guaranteed_bound_keeps_tying_nodes() {
        let root = ExhaustiveSearchNode::<NQueensSolution>::root(SimpleScore::of(0), Some(SimpleScore::of(0)));
        let mut tree = SearchTree::new(vec![EntityRef::new(0, 0)], root, None, NodeExplorationType::OptimisticBoundFirst);
        for (i, bound) in [-3, -1].into_iter().enumerate() {
            let child = ExhaustiveSearchNode::child(
                0,
                1,
                i as u64 + 1,
                change(0, 0),
                change(0, 0),
                SimpleScore::of(bound),
                Some(SimpleScore::of(bound)),
            );
            tree.queue.push(tree.nodes.len(), &child);
            tree.nodes.push(child);
        }
        assert_eq!(tree.register_guaranteed_bound(SimpleScore::of(-1)), 1);
        assert_eq!(tree.queue_len(), 2);
        assert_eq!(tree.register_pessimistic_bound(SimpleScore::of(-1)), 1);
        assert_eq!(tree.queue_len(), 1);
    }
}
