//! Typed value selectors.
//!
//! A value selector yields the candidate values of one variable for a given
//! entity, typed as the variable's value type `V`.

use std::fmt::{self, Debug};

use optiplan_core::{EntityRef, PlanningSolution, Result, SolutionDescriptor, ValueRange};
use optiplan_scoring::ScoreDirector;

pub trait TypedValueSelector<S: PlanningSolution, V>: Send + Debug {
    fn iter_typed<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityRef,
    ) -> Box<dyn Iterator<Item = V> + 'a>;

    fn size(&self, score_director: &dyn ScoreDirector<S>, entity: EntityRef) -> usize;

    fn is_never_ending(&self) -> bool {
        false
    }
}

/// Yields a fixed list of values for every entity.
#[derive(Clone)]
pub struct StaticTypedValueSelector<V> {
    values: Vec<V>,
}

impl<V: Debug> Debug for StaticTypedValueSelector<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTypedValueSelector")
            .field("values", &self.values)
            .finish()
    }
}

impl<V> StaticTypedValueSelector<V> {
    pub fn new(values: Vec<V>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }
}

impl<S, V> TypedValueSelector<S, V> for StaticTypedValueSelector<V>
where
    S: PlanningSolution,
    V: Clone + Send + Debug + 'static,
{
    fn iter_typed<'a>(
        &'a self,
        _score_director: &'a dyn ScoreDirector<S>,
        _entity: EntityRef,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        Box::new(self.values.iter().cloned())
    }

    fn size(&self, _score_director: &dyn ScoreDirector<S>, _entity: EntityRef) -> usize {
        self.values.len()
    }
}

/// Yields the values of the variable's declared value range, resolved
/// against the working solution on every iteration.
pub struct FromValueRangeSelector<S, V> {
    variable: &'static str,
    range: ValueRange<S, V>,
}

impl<S, V> Clone for FromValueRangeSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            variable: self.variable,
            range: self.range.clone(),
        }
    }
}

impl<S, V> Debug for FromValueRangeSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromValueRangeSelector")
            .field("variable", &self.variable)
            .finish()
    }
}

impl<S: 'static, V: 'static> FromValueRangeSelector<S, V> {
    /// Looks up the value range of `variable` on the descriptor.
    ///
    /// Fails with `MissingValueRange` if the variable declares none.
    pub fn new(
        descriptor: &SolutionDescriptor<S>,
        descriptor_index: usize,
        variable: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            variable,
            range: descriptor.value_range::<V>(descriptor_index, variable)?,
        })
    }
}

impl<S, V> TypedValueSelector<S, V> for FromValueRangeSelector<S, V>
where
    S: PlanningSolution,
    V: Clone + Send + Sync + Debug + 'static,
{
    fn iter_typed<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        _entity: EntityRef,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        Box::new(self.range.values(score_director.working_solution()).into_iter())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>, _entity: EntityRef) -> usize {
        self.range.size(score_director.working_solution())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiplan_test::nqueens::{boxed_nqueens_director, nqueens_descriptor};
    use optiplan_test::NQueensSolution;

    #[test]
    fn test_static_typed_value_selector() {
        let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1]));
        let selector = StaticTypedValueSelector::new(vec![7i64, 9]);
        let values: Vec<i64> = selector
            .iter_typed(&*director, EntityRef::new(0, 0))
            .collect();
        assert_eq!(values, vec![7, 9]);
    }

    #[test]
    fn test_value_range_follows_working_solution() {
        let director = boxed_nqueens_director(NQueensSolution::with_rows(&[0, 1, 2]));
        let selector =
            FromValueRangeSelector::<NQueensSolution, i64>::new(&nqueens_descriptor(), 0, "row")
                .unwrap();
        let values: Vec<i64> = selector
            .iter_typed(&*director, EntityRef::new(0, 1))
            .collect();
        assert_eq!(values, vec![0, 1, 2]);
        assert_eq!(selector.size(&*director, EntityRef::new(0, 1)), 3);
    }

    #[test]
    fn test_value_range_of_unknown_type_is_config_error() {
        let result = FromValueRangeSelector::<NQueensSolution, u8>::new(&nqueens_descriptor(), 0, "row");
        assert!(result.unwrap_err().is_config());
    }
}
