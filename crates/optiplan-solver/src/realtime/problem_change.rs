//! Problem change trait and the director changes are applied through.

use std::fmt::{self, Debug};

use optiplan_core::{EntityRef, OptiplanError, PlanningSolution, ProblemFactRef, Result};
use optiplan_scoring::{change_variable, ScoreDirector};
use tracing::{debug, warn};

/// A change to the problem that can be applied during solving.
///
/// Every mutation goes through the [`ProblemChangeDirector`], which brackets
/// it with the score director's hooks. A change that cannot find the object
/// it refers to fails with
/// [`WorkingObjectNotFound`](OptiplanError::WorkingObjectNotFound); only that
/// change is skipped.
pub trait ProblemChange<S: PlanningSolution>: Send + Debug {
    fn do_change(&self, director: &mut ProblemChangeDirector<'_, S>) -> Result<()>;
}

pub type BoxedProblemChange<S> = Box<dyn ProblemChange<S>>;

/// Applies problem-change mutations to the working solution.
pub struct ProblemChangeDirector<'a, S: PlanningSolution> {
    score_director: &'a mut dyn ScoreDirector<S>,
}

impl<S: PlanningSolution> Debug for ProblemChangeDirector<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemChangeDirector").finish_non_exhaustive()
    }
}

impl<'a, S: PlanningSolution> ProblemChangeDirector<'a, S> {
    pub fn new(score_director: &'a mut dyn ScoreDirector<S>) -> Self {
        Self { score_director }
    }

    pub fn working_solution(&self) -> &S {
        self.score_director.working_solution()
    }

    /// Appends an entity of `descriptor_index`; `add` must push exactly one
    /// entity onto the end of that collection.
    pub fn add_entity(
        &mut self,
        descriptor_index: usize,
        add: impl FnOnce(&mut S),
    ) -> Result<EntityRef> {
        let index = self
            .score_director
            .solution_descriptor()
            .entity_descriptor(descriptor_index)
            .ok_or_else(|| {
                OptiplanError::UnregisteredEntityType(format!("descriptor {descriptor_index}"))
            })?
            .entity_count(self.score_director.working_solution());
        let entity = EntityRef::new(descriptor_index, index);
        self.score_director.before_entity_added(entity)?;
        add(self.score_director.working_solution_mut());
        self.score_director.after_entity_added(entity)?;
        Ok(entity)
    }

    /// Removes `entity`; handles of later entities of the same descriptor
    /// shift down by one.
    pub fn remove_entity(&mut self, entity: EntityRef, remove: impl FnOnce(&mut S)) -> Result<()> {
        self.ensure_entity(entity)?;
        self.score_director.before_entity_removed(entity)?;
        remove(self.score_director.working_solution_mut());
        self.score_director.after_entity_removed(entity)
    }

    pub fn change_variable(
        &mut self,
        entity: EntityRef,
        variable: &'static str,
        change: impl FnOnce(&mut S),
    ) -> Result<()> {
        self.ensure_entity(entity)?;
        change_variable(&mut *self.score_director, entity, variable, change)
    }

    pub fn add_problem_fact(&mut self, fact: ProblemFactRef, add: impl FnOnce(&mut S)) -> Result<()> {
        self.score_director.before_problem_fact_added(fact)?;
        add(self.score_director.working_solution_mut());
        self.score_director.after_problem_fact_added(fact)
    }

    pub fn remove_problem_fact(
        &mut self,
        fact: ProblemFactRef,
        remove: impl FnOnce(&mut S),
    ) -> Result<()> {
        self.score_director.before_problem_fact_removed(fact)?;
        remove(self.score_director.working_solution_mut());
        self.score_director.after_problem_fact_removed(fact)
    }

    /// Changes a property of a problem fact or a non-planning property of an
    /// entity.
    pub fn change_problem_property(
        &mut self,
        fact: ProblemFactRef,
        change: impl FnOnce(&mut S),
    ) -> Result<()> {
        self.score_director.before_problem_property_changed(fact)?;
        change(self.score_director.working_solution_mut());
        self.score_director.after_problem_property_changed(fact)
    }

    /// Finds the working entity with the given planning id.
    pub fn lookup_entity(&self, descriptor_index: usize, planning_id: u64) -> Result<EntityRef> {
        self.score_director
            .solution_descriptor()
            .find_entity_by_planning_id(
                self.score_director.working_solution(),
                descriptor_index,
                planning_id,
            )
            .ok_or_else(|| {
                OptiplanError::WorkingObjectNotFound(format!(
                    "no entity with planning id {planning_id} in descriptor {descriptor_index}"
                ))
            })
    }

    fn ensure_entity(&self, entity: EntityRef) -> Result<()> {
        let count = self
            .score_director
            .solution_descriptor()
            .entity_descriptor(entity.descriptor_index)
            .map_or(0, |d| d.entity_count(self.score_director.working_solution()));
        if entity.entity_index < count {
            Ok(())
        } else {
            Err(OptiplanError::WorkingObjectNotFound(format!("{entity:?}")))
        }
    }
}

/// Applies a batch of changes, then rebuilds derived state and rescores.
///
/// Changes failing with a recoverable error are logged and skipped; any other
/// error aborts the batch.
pub fn apply_problem_changes<S: PlanningSolution>(
    score_director: &mut dyn ScoreDirector<S>,
    changes: Vec<BoxedProblemChange<S>>,
) -> Result<S::Score> {
    let count = changes.len();
    for change in changes {
        let mut director = ProblemChangeDirector::new(&mut *score_director);
        match change.do_change(&mut director) {
            Ok(()) => {}
            Err(err) if err.is_recoverable() => {
                warn!(change = ?change, error = %err, "Problem change skipped");
            }
            Err(err) => return Err(err),
        }
    }
    score_director.trigger_variable_listeners()?;
    score_director.reset_working_solution()?;
    let score = score_director.calculate_score()?;
    debug!(changes = count, score = %score, "Problem changes applied");
    Ok(score)
}

/// A problem change implemented as a closure.
///
/// ```
/// use optiplan_core::{EntityRef, PlanningSolution, SimpleScore};
/// use optiplan_solver::realtime::ClosureProblemChange;
///
/// #[derive(Clone, Debug)]
/// struct Solution { rows: Vec<Option<i64>>, score: Option<SimpleScore> }
///
/// impl PlanningSolution for Solution {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
/// }
///
/// let change = ClosureProblemChange::<Solution, _>::new("clear_first_row", |director| {
///     director.change_variable(EntityRef::new(0, 0), "row", |s| s.rows[0] = None)
/// });
/// ```
pub struct ClosureProblemChange<S: PlanningSolution, F>
where
    F: Fn(&mut ProblemChangeDirector<'_, S>) -> Result<()> + Send,
{
    name: &'static str,
    change_fn: F,
    _phantom: std::marker::PhantomData<fn() -> S>,
}

impl<S, F> ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut ProblemChangeDirector<'_, S>) -> Result<()> + Send,
{
    pub fn new(name: &'static str, change_fn: F) -> Self {
        Self {
            name,
            change_fn,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<S, F> Debug for ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut ProblemChangeDirector<'_, S>) -> Result<()> + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureProblemChange")
            .field("name", &self.name)
            .finish()
    }
}

impl<S, F> ProblemChange<S> for ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut ProblemChangeDirector<'_, S>) -> Result<()> + Send,
{
    fn do_change(&self, director: &mut ProblemChangeDirector<'_, S>) -> Result<()> {
        (self.change_fn)(director)
    }
}
