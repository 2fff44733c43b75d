//! Local search phase
//!
//! Improves an existing solution by iteratively applying moves
//! that are accepted according to an acceptance criterion.

mod acceptor;
mod forager;
mod phase;

pub use acceptor::{
    Acceptor, CompositeAcceptor, HillClimbingAcceptor, LateAcceptanceAcceptor, MoveCandidate,
    SimulatedAnnealingAcceptor, StepOutcome, TabuAcceptor,
};
pub use forager::LocalSearchForager;
pub use phase::LocalSearchPhase;
