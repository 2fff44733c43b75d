//! Mimic selectors for synchronized selection across multiple selectors.
//!
//! A recording selector wraps a child selector and records what the child
//! yields during one iteration. Replaying selectors share the recorder and
//! reproduce that selection without touching the child again:
//!
//! - [`MimicReplayer`] walks the recorded sequence with idempotent
//!   `has_next`/`next`; any number of replayers may follow one recorder.
//! - [`MimicReplayingEntitySelector`] and [`MimicReplayingValueSelector`]
//!   yield the element the recorder is currently on, exactly once per
//!   iteration. Inside a cartesian product this keeps the right-hand side
//!   in lockstep with the left-hand side.

use std::fmt::{self, Debug};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use optiplan_core::{EntityRef, PlanningSolution};
use optiplan_scoring::ScoreDirector;

use super::entity::EntitySelector;
use super::typed_value::TypedValueSelector;
use crate::scope::SolverRng;

#[derive(Debug)]
struct MimicState<T> {
    /// Bumped whenever a recording iteration starts.
    iteration: u64,
    recorded: Vec<T>,
    /// The recording iterator reported exhaustion.
    finished: bool,
}

/// Shared recording of one selector's output.
pub struct MimicRecorder<T> {
    state: Arc<RwLock<MimicState<T>>>,
    id: Arc<str>,
}

impl<T> Clone for MimicRecorder<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            id: Arc::clone(&self.id),
        }
    }
}

impl<T> Debug for MimicRecorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimicRecorder").field("id", &self.id).finish()
    }
}

impl<T: Clone> MimicRecorder<T> {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MimicState {
                iteration: 0,
                recorded: Vec::new(),
                finished: false,
            })),
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    // Recorded data stays consistent even if a holder panicked.
    fn read(&self) -> RwLockReadGuard<'_, MimicState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MimicState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new recording iteration, discarding the previous one.
    pub fn start_recording(&self) {
        let mut state = self.write();
        state.iteration += 1;
        state.recorded.clear();
        state.finished = false;
    }

    pub fn record(&self, value: T) {
        self.write().recorded.push(value);
    }

    pub fn finish_recording(&self) {
        self.write().finished = true;
    }

    /// The element the recorder yielded last in the current iteration.
    pub fn current(&self) -> Option<T> {
        self.read().recorded.last().cloned()
    }

    pub fn recorded_count(&self) -> usize {
        self.read().recorded.len()
    }

    pub fn is_finished(&self) -> bool {
        self.read().finished
    }

    fn iteration(&self) -> u64 {
        self.read().iteration
    }

    fn recorded_at(&self, position: usize) -> Option<T> {
        self.read().recorded.get(position).cloned()
    }

    /// A cursor over the recorded sequence.
    pub fn replayer(&self) -> MimicReplayer<T> {
        MimicReplayer {
            recorder: self.clone(),
            iteration: self.iteration(),
            cursor: 0,
        }
    }
}

/// Replays a recorder's sequence in order.
///
/// `has_next` never advances the cursor, so it may be called any number of
/// times between two `next` calls. A new recording iteration restarts the
/// cursor.
pub struct MimicReplayer<T> {
    recorder: MimicRecorder<T>,
    iteration: u64,
    cursor: usize,
}

impl<T: Clone> MimicReplayer<T> {
    fn sync(&mut self) {
        let iteration = self.recorder.iteration();
        if iteration != self.iteration {
            self.iteration = iteration;
            self.cursor = 0;
        }
    }

    pub fn has_next(&mut self) -> bool {
        self.sync();
        self.cursor < self.recorder.recorded_count()
    }
}

impl<T: Clone> Iterator for MimicReplayer<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.sync();
        let value = self.recorder.recorded_at(self.cursor)?;
        self.cursor += 1;
        Some(value)
    }
}

/// Records every entity its child selector yields.
pub struct MimicRecordingEntitySelector<ES> {
    child: ES,
    recorder: MimicRecorder<EntityRef>,
}

impl<ES> MimicRecordingEntitySelector<ES> {
    pub fn new(child: ES, recorder: MimicRecorder<EntityRef>) -> Self {
        Self { child, recorder }
    }

    pub fn recorder(&self) -> MimicRecorder<EntityRef> {
        self.recorder.clone()
    }
}

impl<ES: Debug> Debug for MimicRecordingEntitySelector<ES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimicRecordingEntitySelector")
            .field("child", &self.child)
            .field("recorder", &self.recorder.id)
            .finish()
    }
}

impl<S, ES> EntitySelector<S> for MimicRecordingEntitySelector<ES>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityRef> + 'a> {
        self.recorder.start_recording();
        Box::new(RecordingIterator {
            inner: self.child.iter(score_director),
            recorder: &self.recorder,
        })
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.child.size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        self.child.is_never_ending()
    }

    fn phase_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.child.phase_started(score_director, rng)
    }

    fn step_started(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut SolverRng) {
        self.child.step_started(score_director, rng)
    }

    fn phase_ended(&mut self) {
        self.child.phase_ended()
    }
}

/// Records each element as it is yielded.
struct RecordingIterator<'a, T> {
    inner: Box<dyn Iterator<Item = T> + 'a>,
    recorder: &'a MimicRecorder<T>,
}

impl<T: Clone> Iterator for RecordingIterator<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.inner.next() {
            Some(value) => {
                self.recorder.record(value.clone());
                Some(value)
            }
            None => {
                self.recorder.finish_recording();
                None
            }
        }
    }
}

/// Yields the entity the recorder is currently on, once.
pub struct MimicReplayingEntitySelector {
    recorder: MimicRecorder<EntityRef>,
}

impl MimicReplayingEntitySelector {
    pub fn new(recorder: MimicRecorder<EntityRef>) -> Self {
        Self { recorder }
    }
}

impl Debug for MimicReplayingEntitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimicReplayingEntitySelector")
            .field("recorder", &self.recorder.id)
            .finish()
    }
}

impl<S: PlanningSolution> EntitySelector<S> for MimicReplayingEntitySelector {
    fn iter<'a>(
        &'a self,
        _score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityRef> + 'a> {
        Box::new(self.recorder.current().into_iter())
    }

    fn size(&self, _score_director: &dyn ScoreDirector<S>) -> usize {
        usize::from(self.recorder.current().is_some())
    }
}

/// Records every value its child selector yields, whatever the entity.
pub struct MimicRecordingValueSelector<VS, V> {
    child: VS,
    recorder: MimicRecorder<V>,
}

impl<VS, V: Clone> MimicRecordingValueSelector<VS, V> {
    pub fn new(child: VS, recorder: MimicRecorder<V>) -> Self {
        Self { child, recorder }
    }

    pub fn recorder(&self) -> MimicRecorder<V> {
        self.recorder.clone()
    }
}

impl<VS: Debug, V> Debug for MimicRecordingValueSelector<VS, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimicRecordingValueSelector")
            .field("child", &self.child)
            .field("recorder", &self.recorder.id)
            .finish()
    }
}

impl<S, V, VS> TypedValueSelector<S, V> for MimicRecordingValueSelector<VS, V>
where
    S: PlanningSolution,
    V: Clone + Send + Sync + Debug + 'static,
    VS: TypedValueSelector<S, V>,
{
    fn iter_typed<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        self.recorder.start_recording();
        Box::new(RecordingIterator {
            inner: self.child.iter_typed(score_director, entity),
            recorder: &self.recorder,
        })
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>, entity: EntityRef) -> usize {
        self.child.size(score_director, entity)
    }

    fn is_never_ending(&self) -> bool {
        self.child.is_never_ending()
    }
}

/// Yields the value the recorder is currently on, once.
pub struct MimicReplayingValueSelector<V> {
    recorder: MimicRecorder<V>,
}

impl<V> MimicReplayingValueSelector<V> {
    pub fn new(recorder: MimicRecorder<V>) -> Self {
        Self { recorder }
    }
}

impl<V> Debug for MimicReplayingValueSelector<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimicReplayingValueSelector")
            .field("recorder", &self.recorder.id)
            .finish()
    }
}

impl<S, V> TypedValueSelector<S, V> for MimicReplayingValueSelector<V>
where
    S: PlanningSolution,
    V: Clone + Send + Sync + Debug + 'static,
{
    fn iter_typed<'a>(
        &'a self,
        _score_director: &'a dyn ScoreDirector<S>,
        _entity: EntityRef,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        Box::new(self.recorder.current().into_iter())
    }

    fn size(&self, _score_director: &dyn ScoreDirector<S>, _entity: EntityRef) -> usize {
        usize::from(self.recorder.current().is_some())
    }
}
