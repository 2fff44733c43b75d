//! Tests for selector module.

use rand::SeedableRng;

use crate::scope::SolverRng;

mod list_change;
mod move_selector;

fn rng() -> SolverRng {
    SolverRng::seed_from_u64(7)
}
