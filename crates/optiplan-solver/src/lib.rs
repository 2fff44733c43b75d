//! OptiPlan Solver Engine
//!
//! This crate provides the main solver implementation including:
//! - Solver and SolverFactory
//! - Phases (construction heuristic, local search, exhaustive search)
//! - Move system and selectors, with mimic record and replay
//! - Best solution recaller
//! - Termination conditions
//! - Event system for monitoring
//! - Real-time problem changes
//! - Configuration wiring (builder module)

pub mod builder;
pub mod event;
pub mod heuristic;
pub mod phase;
pub mod realtime;
pub mod recaller;
pub mod scope;
pub mod solver;
pub mod termination;

#[cfg(test)]
mod test_utils;

pub use builder::{AcceptorBuilder, PhaseBuilder, PhaseComponents, TerminationBuilder};
pub use event::{
    BestSolutionEvent, ChannelBestSolutionListener, CountingEventListener, LoggingEventListener,
    PhaseLifecycleListener, SolverEventListener, SolverEventSupport,
};
pub use heuristic::{
    AllEntitiesSelector, BoxedMove, CachingMoveSelector, CartesianProductMoveSelector,
    ChainedChangeMove, ChainedChangeMoveSelector, ChangeMove, ChangeMoveSelector, CompositeMove,
    EntitySelector, FilteringMoveSelector, FromSolutionEntitySelector, FromValueRangeSelector,
    ListChangeMove, ListChangeMoveSelector, ListPosition, MimicRecorder,
    MimicRecordingEntitySelector, MimicRecordingValueSelector, MimicReplayer,
    MimicReplayingEntitySelector, MimicReplayingValueSelector, Move, MoveArena, MoveEntities,
    MoveSelector, PlacementMoves, ShufflingMoveSelector, StaticTypedValueSelector, SwapMove,
    SwapMoveSelector, TypedValueSelector, UnionMoveSelector,
};
pub use phase::{
    construction::{
        ConstructionForager, ConstructionHeuristicPhase, ForagerPick, Placement,
        QueuedEntityPlacer,
    },
    evaluate_move,
    exhaustive::{
        ExhaustiveSearchDecider, ExhaustiveSearchNode, ExhaustiveSearchPhase,
        ExpandableNodeQueue, ScoreBounder, ScoreTrend, TrendScoreBounder,
    },
    localsearch::{
        Acceptor, CompositeAcceptor, HillClimbingAcceptor, LateAcceptanceAcceptor,
        LocalSearchForager, LocalSearchPhase, MoveCandidate, SimulatedAnnealingAcceptor,
        StepOutcome, TabuAcceptor,
    },
    partitioned::PartitionedMoveEvaluator,
    MoveEvaluation, Phase,
};
pub use realtime::{
    apply_problem_changes, BoxedProblemChange, ClosureProblemChange, ProblemChange,
    ProblemChangeDirector, ProblemChangeReceiver, ProblemChangeResult, SolverHandle,
};
pub use recaller::BestSolutionRecaller;
pub use scope::{PhaseScope, ScopeSnapshot, SolverRng, SolverScope, StepScope};
pub use solver::{Solver, SolverFactory, SolverOutcome};
pub use termination::{
    AndTermination, BestScoreFeasibleTermination, BestScoreTermination, ExternalTermination,
    OrTermination, StepCountTermination, Termination, TimeTermination,
    UnimprovedStepCountTermination, UnimprovedTimeTermination,
};
