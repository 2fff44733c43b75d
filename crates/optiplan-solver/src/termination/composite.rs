//! Composite termination conditions (AND/OR).
//!
//! Tuples of terminations get macro-generated implementations; the builder
//! combines configured terminations through the `Vec<Box<dyn Termination>>`
//! implementation.

use optiplan_core::PlanningSolution;

use super::Termination;
use crate::scope::ScopeSnapshot;

/// Terminates when ANY child terminates.
///
/// The time gradient is the largest gradient of the children.
///
/// ```
/// use optiplan_solver::termination::{OrTermination, StepCountTermination, TimeTermination};
///
/// let termination = OrTermination::new((
///     TimeTermination::seconds(30),
///     StepCountTermination::new(1000),
/// ));
/// ```
#[derive(Debug)]
pub struct OrTermination<T>(pub T);

impl<T> OrTermination<T> {
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

/// Terminates when ALL children terminate.
///
/// The time gradient is the smallest gradient of the children.
#[derive(Debug)]
pub struct AndTermination<T>(pub T);

impl<T> AndTermination<T> {
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

fn max_gradient(gradients: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    gradients.into_iter().flatten().reduce(f64::max)
}

fn min_gradient(gradients: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    gradients.into_iter().flatten().reduce(f64::min)
}

macro_rules! impl_composite_termination {
    ($($idx:tt: $T:ident),+) => {
        impl<S, $($T),+> Termination<S> for OrTermination<($($T,)+)>
        where
            S: PlanningSolution,
            $($T: Termination<S>,)+
        {
            fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
                $((self.0).$idx.is_terminated(snapshot))||+
            }

            fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
                max_gradient([$((self.0).$idx.time_gradient(snapshot)),+])
            }
        }

        impl<S, $($T),+> Termination<S> for AndTermination<($($T,)+)>
        where
            S: PlanningSolution,
            $($T: Termination<S>,)+
        {
            fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
                $((self.0).$idx.is_terminated(snapshot))&&+
            }

            fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
                min_gradient([$((self.0).$idx.time_gradient(snapshot)),+])
            }
        }
    };
}

impl_composite_termination!(0: T0);
impl_composite_termination!(0: T0, 1: T1);
impl_composite_termination!(0: T0, 1: T1, 2: T2);
impl_composite_termination!(0: T0, 1: T1, 2: T2, 3: T3);
impl_composite_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_composite_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);
impl_composite_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6);
impl_composite_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7);

impl<S: PlanningSolution> Termination<S> for OrTermination<Vec<Box<dyn Termination<S>>>> {
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        self.0.iter().any(|t| t.is_terminated(snapshot))
    }

    fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
        max_gradient(self.0.iter().map(|t| t.time_gradient(snapshot)))
    }
}

impl<S: PlanningSolution> Termination<S> for AndTermination<Vec<Box<dyn Termination<S>>>> {
    /// An empty conjunction never terminates.
    fn is_terminated(&self, snapshot: &ScopeSnapshot<S::Score>) -> bool {
        !self.0.is_empty() && self.0.iter().all(|t| t.is_terminated(snapshot))
    }

    fn time_gradient(&self, snapshot: &ScopeSnapshot<S::Score>) -> Option<f64> {
        min_gradient(self.0.iter().map(|t| t.time_gradient(snapshot)))
    }
}
