//! Partitioned move evaluation for local search.
//!
//! The moves of one step are split into contiguous chunks, one per worker of
//! a bounded rayon pool. Every chunk gets its own score director, built by
//! the [`ScoreDirectorFactory`] over a clone of the working solution, and
//! evaluates its moves with the usual apply, score and undo cycle.
//!
//! Results come back in move order. Acceptance stays on the calling thread,
//! so a seeded run accepts the same moves whatever the thread count.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use optiplan_solver::phase::partitioned::PartitionedMoveEvaluator;
//! use optiplan_test::nqueens::create_nqueens_factory;
//!
//! let evaluator = PartitionedMoveEvaluator::new(Arc::new(create_nqueens_factory()), 4).unwrap();
//! assert_eq!(evaluator.thread_count(), 4);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use optiplan_config::EnvironmentMode;
use optiplan_core::{OptiplanError, PlanningSolution, Result};
use optiplan_scoring::ScoreDirectorFactory;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use crate::heuristic::r#move::BoxedMove;
use crate::phase::{evaluate_move, MoveEvaluation};

/// Evaluates the moves of a step on a pool of worker threads.
pub struct PartitionedMoveEvaluator<S: PlanningSolution> {
    factory: Arc<dyn ScoreDirectorFactory<S>>,
    pool: ThreadPool,
    thread_count: usize,
}

impl<S: PlanningSolution> fmt::Debug for PartitionedMoveEvaluator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionedMoveEvaluator")
            .field("thread_count", &self.thread_count)
            .finish()
    }
}

impl<S: PlanningSolution> PartitionedMoveEvaluator<S> {
    /// Creates a pool of `thread_count` workers.
    pub fn new(factory: Arc<dyn ScoreDirectorFactory<S>>, thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(OptiplanError::Config(
                "move thread count must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("optiplan-move-{i}"))
            .build()
            .map_err(|e| OptiplanError::Config(format!("cannot start move threads: {e}")))?;
        Ok(Self {
            factory,
            pool,
            thread_count,
        })
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Evaluates `moves` against `solution`.
    ///
    /// Entry `i` holds the evaluation of `moves[i]`, or `None` if the move is
    /// not doable or `terminate_early` was raised before its turn. The first
    /// error of any worker is returned.
    pub fn evaluate(
        &self,
        solution: &S,
        moves: &[BoxedMove<S>],
        environment_mode: EnvironmentMode,
        terminate_early: &AtomicBool,
    ) -> Result<Vec<Option<MoveEvaluation<S::Score>>>> {
        if moves.is_empty() {
            return Ok(Vec::new());
        }
        let chunk_size = moves.len().div_ceil(self.thread_count);
        let factory = &self.factory;
        let chunks: Vec<Vec<Option<MoveEvaluation<S::Score>>>> = self.pool.install(|| {
            moves
                .par_chunks(chunk_size)
                .map(|chunk| {
                    let mut score_director = factory.build_score_director(solution.clone())?;
                    let before_score = score_director.calculate_score()?;
                    trace!(moves = chunk.len(), "Worker evaluating chunk");
                    chunk
                        .iter()
                        .map(|mv| {
                            if terminate_early.load(Ordering::SeqCst)
                                || !mv.is_doable(score_director.as_ref())
                            {
                                return Ok(None);
                            }
                            evaluate_move(
                                score_director.as_mut(),
                                mv.as_ref(),
                                environment_mode,
                                before_score,
                            )
                            .map(Some)
                        })
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(chunks.into_iter().flatten().collect())
    }
}
