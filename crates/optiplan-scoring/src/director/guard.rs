//! Scoped before/after pairing for variable changes.

use optiplan_core::domain::PlanningSolution;
use optiplan_core::{EntityRef, Result};
use tracing::error;

use super::traits::ScoreDirector;

/// Holds an open `before_variable_changed` bracket and closes it when dropped.
///
/// Closing explicitly with [`close`](Self::close) reports errors; a guard
/// dropped while unwinding still delivers the `after` hook and logs a failure.
pub struct VariableChangeGuard<'a, S: PlanningSolution, D: ScoreDirector<S> + ?Sized> {
    director: &'a mut D,
    entity: EntityRef,
    variable: &'static str,
    closed: bool,
    _solution: std::marker::PhantomData<fn() -> S>,
}

impl<'a, S, D> VariableChangeGuard<'a, S, D>
where
    S: PlanningSolution,
    D: ScoreDirector<S> + ?Sized,
{
    pub fn open(director: &'a mut D, entity: EntityRef, variable: &'static str) -> Result<Self> {
        director.before_variable_changed(entity, variable)?;
        Ok(Self {
            director,
            entity,
            variable,
            closed: false,
            _solution: std::marker::PhantomData,
        })
    }

    pub fn solution(&self) -> &S {
        self.director.working_solution()
    }

    pub fn solution_mut(&mut self) -> &mut S {
        self.director.working_solution_mut()
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.director
            .after_variable_changed(self.entity, self.variable)
    }
}

impl<S, D> Drop for VariableChangeGuard<'_, S, D>
where
    S: PlanningSolution,
    D: ScoreDirector<S> + ?Sized,
{
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self
            .director
            .after_variable_changed(self.entity, self.variable)
        {
            error!(entity = ?self.entity, variable = self.variable, error = %e, "Unpaired variable change");
        }
    }
}

/// Applies `change` to the working solution inside a before/after bracket.
pub fn change_variable<S, D, F>(
    director: &mut D,
    entity: EntityRef,
    variable: &'static str,
    change: F,
) -> Result<()>
where
    S: PlanningSolution,
    D: ScoreDirector<S> + ?Sized,
    F: FnOnce(&mut S),
{
    let mut guard = VariableChangeGuard::open(director, entity, variable)?;
    change(guard.solution_mut());
    guard.close()
}
