//! Exhaustive search node representation.
//!
//! Nodes live in an arena owned by the phase and refer to their parent by
//! index. Each node keeps the move that leads to it from its parent and the
//! undo of that move, so the working solution can walk between any two
//! nodes through their common ancestor.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;
use std::fmt;

use optiplan_config::NodeExplorationType;
use optiplan_core::{PlanningSolution, Score};

use crate::heuristic::r#move::BoxedMove;

/// A partial assignment in the search tree.
pub struct ExhaustiveSearchNode<S: PlanningSolution> {
    parent: Option<usize>,
    /// Number of layers assigned (0 = root).
    depth: usize,
    /// Creation order within the phase, used as the last tie breaker.
    breadth: u64,
    mv: Option<BoxedMove<S>>,
    undo: Option<BoxedMove<S>>,
    score: S::Score,
    optimistic_bound: Option<S::Score>,
}

impl<S: PlanningSolution> fmt::Debug for ExhaustiveSearchNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhaustiveSearchNode")
            .field("parent", &self.parent)
            .field("depth", &self.depth)
            .field("breadth", &self.breadth)
            .field("move", &self.mv)
            .field("score", &self.score)
            .field("optimistic_bound", &self.optimistic_bound)
            .finish()
    }
}

impl<S: PlanningSolution> ExhaustiveSearchNode<S> {
    pub fn root(score: S::Score, optimistic_bound: Option<S::Score>) -> Self {
        Self {
            parent: None,
            depth: 0,
            breadth: 0,
            mv: None,
            undo: None,
            score,
            optimistic_bound,
        }
    }

    pub fn child(
        parent: usize,
        depth: usize,
        breadth: u64,
        mv: BoxedMove<S>,
        undo: BoxedMove<S>,
        score: S::Score,
        optimistic_bound: Option<S::Score>,
    ) -> Self {
        Self {
            parent: Some(parent),
            depth,
            breadth,
            mv: Some(mv),
            undo: Some(undo),
            score,
            optimistic_bound,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn breadth(&self) -> u64 {
        self.breadth
    }

    /// The move from the parent to this node.
    pub fn step_move(&self) -> Option<&BoxedMove<S>> {
        self.mv.as_ref()
    }

    /// The move from this node back to its parent.
    pub fn undo_move(&self) -> Option<&BoxedMove<S>> {
        self.undo.as_ref()
    }

    #[inline]
    pub fn score(&self) -> S::Score {
        self.score
    }

    #[inline]
    pub fn optimistic_bound(&self) -> Option<S::Score> {
        self.optimistic_bound
    }

    pub(crate) fn key(&self, index: usize, exploration: NodeExplorationType) -> NodeKey<S::Score> {
        NodeKey {
            exploration,
            depth: self.depth,
            score: self.score,
            optimistic_bound: self.optimistic_bound,
            breadth: Reverse(self.breadth),
            index,
        }
    }
}

/// Queue ordering of a node; the greatest key is expanded first.
///
/// Ties on the primary criterion fall back to the other criteria and finally
/// to creation order, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeKey<Sc> {
    exploration: NodeExplorationType,
    depth: usize,
    score: Sc,
    optimistic_bound: Option<Sc>,
    breadth: Reverse<u64>,
    index: usize,
}

impl<Sc: Score> Ord for NodeKey<Sc> {
    fn cmp(&self, other: &Self) -> Ordering {
        let depth = self.depth.cmp(&other.depth);
        let score = self.score.cmp(&other.score);
        let bound = self.optimistic_bound.cmp(&other.optimistic_bound);
        let primary = match self.exploration {
            NodeExplorationType::DepthFirst => depth.then(score).then(bound),
            NodeExplorationType::BreadthFirst => depth.reverse().then(score).then(bound),
            NodeExplorationType::ScoreFirst => score.then(bound).then(depth),
            NodeExplorationType::OptimisticBoundFirst => bound.then(score).then(depth),
        };
        primary
            .then(self.breadth.cmp(&other.breadth))
            .then(self.index.cmp(&other.index))
    }
}

impl<Sc: Score> PartialOrd for NodeKey<Sc> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Expandable nodes ordered by the exploration type.
///
/// Holds indexes into the phase's node arena together with the optimistic
/// bound used for retroactive pruning.
#[derive(Debug)]
pub struct ExpandableNodeQueue<Sc> {
    exploration: NodeExplorationType,
    nodes: BTreeMap<NodeKey<Sc>, Option<Sc>>,
}

impl<Sc: Score> ExpandableNodeQueue<Sc> {
    pub fn new(exploration: NodeExplorationType) -> Self {
        Self {
            exploration,
            nodes: BTreeMap::new(),
        }
    }

    pub fn exploration_type(&self) -> NodeExplorationType {
        self.exploration
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Queues the node stored at `index` of the arena.
    pub fn push<S: PlanningSolution<Score = Sc>>(&mut self, index: usize, node: &ExhaustiveSearchNode<S>) {
        self.nodes
            .insert(node.key(index, self.exploration), node.optimistic_bound());
    }

    /// Removes and returns the arena index of the most promising node.
    pub fn pop(&mut self) -> Option<usize> {
        self.nodes.pop_last().map(|(key, _)| key.index)
    }

    /// Drops every node whose optimistic bound does not beat `bound`.
    ///
    /// Nodes without an optimistic bound are kept. Returns how many nodes
    /// were removed.
    pub fn prune(&mut self, bound: Sc) -> usize {
        let before = self.nodes.len();
        self.nodes
            .retain(|_, optimistic| optimistic.map_or(true, |o| o > bound));
        before - self.nodes.len()
    }

    /// Drops every node whose optimistic bound is worse than `bound`.
    ///
    /// Nodes that can still tie `bound` are kept.
    pub fn prune_below(&mut self, bound: Sc) -> usize {
        let before = self.nodes.len();
        self.nodes
            .retain(|_, optimistic| optimistic.map_or(true, |o| o >= bound));
        before - self.nodes.len()
    }
}
