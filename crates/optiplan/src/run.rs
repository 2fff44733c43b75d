//! Solver entry point that hides the configuration wiring.

use std::sync::Arc;

use optiplan_config::{
    AcceptorConfig, ConstructionHeuristicConfig, LocalSearchConfig, PhaseConfig, SolverConfig,
};
use optiplan_core::{ParseableScore, PlanningSolution, Result};
use optiplan_scoring::ScoreDirectorFactory;
use optiplan_solver::{PhaseComponents, SolverFactory, SolverOutcome};
use tracing::debug;

const CONFIG_FILE: &str = "solver.toml";
const DEFAULT_SECONDS_SPENT_LIMIT: u64 = 30;
const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

/// Construction heuristic followed by late acceptance local search, stopping
/// after 30 seconds.
pub fn default_solver_config() -> SolverConfig {
    SolverConfig::new()
        .with_termination_seconds(DEFAULT_SECONDS_SPENT_LIMIT)
        .with_phase(PhaseConfig::ConstructionHeuristic(
            ConstructionHeuristicConfig::default(),
        ))
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig {
            acceptor: Some(AcceptorConfig {
                late_acceptance_size: Some(DEFAULT_LATE_ACCEPTANCE_SIZE),
                ..AcceptorConfig::default()
            }),
            ..LocalSearchConfig::default()
        }))
}

/// Solves `solution` with the configuration in `solver.toml`.
///
/// Without the file, or when it lists no phases, the
/// [`default_solver_config`] phases are used. A configuration without any
/// termination gets the default time limit.
pub fn run_solver<S>(
    solution: S,
    director_factory: Arc<dyn ScoreDirectorFactory<S>>,
    components: PhaseComponents<S>,
) -> Result<SolverOutcome<S>>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
{
    #[cfg(feature = "console")]
    crate::console::init();

    let config = complete_config(SolverConfig::load(CONFIG_FILE).unwrap_or_default());
    debug!(?config, "Solver configuration");
    let mut solver = SolverFactory::new(config, director_factory, components).build_solver()?;
    solver.solve(solution)
}

fn complete_config(mut config: SolverConfig) -> SolverConfig {
    let defaults = default_solver_config();
    if config.phases.is_empty() {
        config.phases = defaults.phases;
    }
    if config.termination.as_ref().map_or(true, |t| t.is_empty()) {
        config.termination = defaults.termination;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiplan_config::{EnvironmentMode, TerminationConfig};

    #[test]
    fn test_empty_config_gets_default_phases_and_limit() {
        let config = complete_config(SolverConfig::default());
        assert_eq!(config.phases.len(), 2);
        assert_eq!(
            config.time_limit(),
            Some(std::time::Duration::from_secs(DEFAULT_SECONDS_SPENT_LIMIT))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configured_values_are_kept() {
        let config = complete_config(
            SolverConfig::new()
                .with_environment_mode(EnvironmentMode::FastAssert)
                .with_termination(TerminationConfig {
                    step_count_limit: Some(10),
                    ..TerminationConfig::default()
                })
                .with_phase(PhaseConfig::ConstructionHeuristic(
                    ConstructionHeuristicConfig::default(),
                )),
        );
        assert_eq!(config.phases.len(), 1);
        assert_eq!(config.environment_mode, EnvironmentMode::FastAssert);
        assert_eq!(config.termination.unwrap().step_count_limit, Some(10));
    }
}
