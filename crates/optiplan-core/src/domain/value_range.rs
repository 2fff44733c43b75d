//! Value ranges of genuine planning variables.

use std::fmt;
use std::sync::Arc;

/// The values a genuine variable may take.
///
/// # Example
///
/// ```
/// use optiplan_core::ValueRange;
///
/// struct Board {
///     n: i64,
/// }
///
/// let fixed: ValueRange<Board, i64> = ValueRange::integers(0, 4);
/// let computed: ValueRange<Board, i64> = ValueRange::computed(|b: &Board| (0..b.n).collect());
///
/// let board = Board { n: 4 };
/// assert_eq!(fixed.values(&board), computed.values(&board));
/// assert_eq!(computed.size(&board), 4);
/// ```
pub enum ValueRange<S, V> {
    /// Same values for every solution.
    Fixed(Arc<[V]>),
    /// Values read from the working solution each time.
    Computed(fn(&S) -> Vec<V>),
}

impl<S, V: Clone> ValueRange<S, V> {
    pub fn fixed(values: impl Into<Vec<V>>) -> Self {
        ValueRange::Fixed(values.into().into())
    }

    pub fn computed(f: fn(&S) -> Vec<V>) -> Self {
        ValueRange::Computed(f)
    }

    /// Materializes the range for `solution`.
    pub fn values(&self, solution: &S) -> Vec<V> {
        match self {
            ValueRange::Fixed(values) => values.to_vec(),
            ValueRange::Computed(f) => f(solution),
        }
    }

    pub fn size(&self, solution: &S) -> usize {
        match self {
            ValueRange::Fixed(values) => values.len(),
            ValueRange::Computed(f) => f(solution).len(),
        }
    }

    pub fn is_empty(&self, solution: &S) -> bool {
        self.size(solution) == 0
    }
}

impl<S> ValueRange<S, i64> {
    /// Half-open integer interval `[from, to)`.
    pub fn integers(from: i64, to: i64) -> Self {
        ValueRange::Fixed((from..to).collect::<Vec<_>>().into())
    }
}

impl<S, V> Clone for ValueRange<S, V> {
    fn clone(&self) -> Self {
        match self {
            ValueRange::Fixed(values) => ValueRange::Fixed(Arc::clone(values)),
            ValueRange::Computed(f) => ValueRange::Computed(*f),
        }
    }
}

impl<S, V> fmt::Debug for ValueRange<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRange::Fixed(values) => write!(f, "ValueRange::Fixed({} values)", values.len()),
            ValueRange::Computed(_) => write!(f, "ValueRange::Computed"),
        }
    }
}
