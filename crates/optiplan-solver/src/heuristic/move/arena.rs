//! Reusable per-step move storage.

/// Arena for the moves of one step.
///
/// Phases fill the arena while the selector borrows the working solution,
/// then evaluate the moves by index once the borrow ends. `reset()` keeps
/// the allocation for the next step.
///
/// # Example
///
/// ```
/// use optiplan_solver::heuristic::r#move::MoveArena;
///
/// let mut arena: MoveArena<i32> = MoveArena::new();
/// arena.push(1);
/// arena.push(2);
/// arena.push(3);
/// assert_eq!(arena.len(), 3);
///
/// assert_eq!(arena.take(1), Some(2));
/// arena.reset();
/// assert!(arena.is_empty());
/// ```
#[derive(Debug)]
pub struct MoveArena<M> {
    moves: Vec<M>,
}

impl<M> MoveArena<M> {
    pub fn new() -> Self {
        Self { moves: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            moves: Vec::with_capacity(capacity),
        }
    }

    /// Empties the arena, keeping its capacity.
    pub fn reset(&mut self) {
        self.moves.clear();
    }

    pub fn push(&mut self, m: M) {
        self.moves.push(m);
    }

    pub fn extend(&mut self, moves: impl IntoIterator<Item = M>) {
        self.moves.extend(moves);
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&M> {
        self.moves.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[M] {
        &self.moves
    }

    /// Removes and returns the move at `index`.
    ///
    /// Indices of the other moves are invalidated; take the step's winner
    /// last, right before `reset()`.
    pub fn take(&mut self, index: usize) -> Option<M> {
        if index < self.moves.len() {
            Some(self.moves.swap_remove(index))
        } else {
            None
        }
    }
}

impl<M> Default for MoveArena<M> {
    fn default() -> Self {
        Self::new()
    }
}
