//! Configuration system for OptiPlan.
//!
//! Load solver configuration from TOML or YAML to control the environment
//! mode, terminations and phase policies without code changes. Move
//! selectors stay in code since their accessors cannot be named in a file;
//! the configuration only decorates them (order and caching).
//!
//! # Examples
//!
//! ```
//! use optiplan_config::{AcceptorConfig, PhaseConfig, SolverConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     [termination]
//!     seconds_spent_limit = 30
//!     unimproved_seconds_spent_limit = 5
//!
//!     [[phases]]
//!     type = "construction_heuristic"
//!     pick_early_type = "first_feasible_score"
//!
//!     [[phases]]
//!     type = "local_search"
//!     [phases.acceptor]
//!     entity_tabu_size = 7
//!     late_acceptance_size = 400
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.phases.len(), 2);
//! match &config.phases[1] {
//!     PhaseConfig::LocalSearch(ls) => {
//!         let acceptor = ls.acceptor.as_ref().unwrap();
//!         assert_eq!(acceptor.late_acceptance_size, Some(400));
//!     }
//!     other => panic!("unexpected phase {other:?}"),
//! }
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use optiplan_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;
use std::time::Duration;

use optiplan_core::OptiplanError;
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for OptiplanError {
    fn from(err: ConfigError) -> Self {
        OptiplanError::Config(err.to_string())
    }
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Environment mode affecting reproducibility and assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for reproducible results.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Number of threads for partitioned move evaluation.
    #[serde(default)]
    pub move_thread_count: MoveThreadCount,

    /// Solver-wide termination.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Score director configuration.
    #[serde(default)]
    pub score_director: Option<ScoreDirectorConfig>,

    /// Phase configurations, run in order.
    #[serde(default)]
    pub phases: Vec<PhaseConfig>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let MoveThreadCount::Count(0) = self.move_thread_count {
            return Err(ConfigError::Invalid(
                "move_thread_count must be at least 1".to_string(),
            ));
        }
        for phase in &self.phases {
            if let PhaseConfig::LocalSearch(ls) = phase {
                if let Some(acceptor) = &ls.acceptor {
                    acceptor.validate()?;
                }
                if let Some(ForagerConfig {
                    accepted_count_limit: Some(0),
                    ..
                }) = ls.forager
                {
                    return Err(ConfigError::Invalid(
                        "accepted_count_limit must be at least 1".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    pub fn with_termination(mut self, termination: TerminationConfig) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_move_thread_count(mut self, count: MoveThreadCount) -> Self {
        self.move_thread_count = count;
        self
    }

    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    /// Returns the termination time limit, if configured.
    ///
    /// ```
    /// use optiplan_config::SolverConfig;
    /// use std::time::Duration;
    ///
    /// let config = SolverConfig::from_toml_str(r#"
    ///     [termination]
    ///     seconds_spent_limit = 30
    /// "#).unwrap();
    ///
    /// assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
    /// ```
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    pub fn constraint_match_enabled(&self) -> bool {
        self.score_director
            .as_ref()
            .is_some_and(|sd| sd.constraint_match_enabled)
    }
}

/// Environment mode affecting reproducibility and assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Seeds the random generator from entropy when no seed is given.
    NonReproducible,

    /// Deterministic for a given seed, no extra checks.
    #[default]
    Reproducible,

    /// Checks every step score against a from-scratch calculation.
    FastAssert,

    /// Like `FastAssert`, and also checks every evaluated move and its undo.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_reproducible(&self) -> bool {
        !matches!(self, EnvironmentMode::NonReproducible)
    }

    pub fn is_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    pub fn is_fully_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FullAssert)
    }
}

/// Move thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveThreadCount {
    /// One worker per available core, at least 1.
    Auto,

    /// No partitioned move evaluation.
    #[default]
    None,

    /// Specific number of worker threads.
    Count(usize),
}

impl MoveThreadCount {
    /// Number of workers, or `None` when evaluation stays on the solver thread.
    pub fn resolve(&self) -> Option<usize> {
        match self {
            MoveThreadCount::None => None,
            MoveThreadCount::Count(n) => Some(*n),
            MoveThreadCount::Auto => Some(
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1),
            ),
        }
    }
}

/// Termination configuration. All configured limits are OR-ed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    pub milliseconds_spent_limit: Option<u64>,

    pub seconds_spent_limit: Option<u64>,

    pub minutes_spent_limit: Option<u64>,

    /// Target best score, e.g. `"0hard/0soft"`.
    pub best_score_limit: Option<String>,

    /// Stops as soon as the best solution is feasible.
    #[serde(default)]
    pub best_score_feasible: bool,

    pub step_count_limit: Option<u64>,

    /// Maximum steps since the last best solution improvement.
    pub unimproved_step_count_limit: Option<u64>,

    /// Maximum seconds since the last best solution improvement.
    pub unimproved_seconds_spent_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the summed time limit, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let millis = self.milliseconds_spent_limit.unwrap_or(0)
            + self.seconds_spent_limit.unwrap_or(0) * 1_000
            + self.minutes_spent_limit.unwrap_or(0) * 60_000;
        if millis > 0 {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }

    pub fn unimproved_time_limit(&self) -> Option<Duration> {
        self.unimproved_seconds_spent_limit.map(Duration::from_secs)
    }

    /// Returns true if no limit is set.
    pub fn is_empty(&self) -> bool {
        self.time_limit().is_none()
            && self.best_score_limit.is_none()
            && !self.best_score_feasible
            && self.step_count_limit.is_none()
            && self.unimproved_step_count_limit.is_none()
            && self.unimproved_seconds_spent_limit.is_none()
    }
}

/// Score director configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreDirectorConfig {
    /// Track constraint matches and indictments.
    #[serde(default)]
    pub constraint_match_enabled: bool,
}

/// Phase configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseConfig {
    ConstructionHeuristic(ConstructionHeuristicConfig),

    LocalSearch(LocalSearchConfig),

    ExhaustiveSearch(ExhaustiveSearchConfig),
}

impl PhaseConfig {
    pub fn termination(&self) -> Option<&TerminationConfig> {
        match self {
            PhaseConfig::ConstructionHeuristic(c) => c.termination.as_ref(),
            PhaseConfig::LocalSearch(c) => c.termination.as_ref(),
            PhaseConfig::ExhaustiveSearch(c) => c.termination.as_ref(),
        }
    }
}

/// Construction heuristic configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConstructionHeuristicConfig {
    #[serde(default)]
    pub pick_early_type: ConstructionPickEarlyType,

    /// Phase termination configuration.
    pub termination: Option<TerminationConfig>,
}

/// When the construction forager stops evaluating the values of a placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionPickEarlyType {
    /// Evaluate every value and keep the best.
    #[default]
    Never,

    /// First value whose score is not worse than the last step score.
    FirstNonDeterioratingScore,

    /// First value with a feasible score.
    FirstFeasibleScore,

    /// First value whose score delta to the last step score is feasible.
    FirstFeasibleScoreOrNonDeterioratingHard,
}

/// Local search configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocalSearchConfig {
    pub acceptor: Option<AcceptorConfig>,

    pub forager: Option<ForagerConfig>,

    /// Decorates the move selector supplied in code.
    pub move_selection: Option<MoveSelectionConfig>,

    /// Phase termination configuration.
    pub termination: Option<TerminationConfig>,
}

/// Acceptor configuration.
///
/// Every field that is set adds an acceptor; several are combined by
/// multiplying their weights. No field set means hill climbing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AcceptorConfig {
    pub entity_tabu_size: Option<usize>,

    pub value_tabu_size: Option<usize>,

    /// Tabu moves that improve the best score are accepted anyway.
    #[serde(default = "default_true")]
    pub aspiration_enabled: bool,

    /// Starting temperature as a score, e.g. `"0hard/400soft"`.
    pub simulated_annealing_starting_temperature: Option<String>,

    /// Per-step cooling factor used when no time limit drives the temperature.
    pub simulated_annealing_cooling_rate: Option<f64>,

    pub late_acceptance_size: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for AcceptorConfig {
    fn default() -> Self {
        Self {
            entity_tabu_size: None,
            value_tabu_size: None,
            aspiration_enabled: true,
            simulated_annealing_starting_temperature: None,
            simulated_annealing_cooling_rate: None,
            late_acceptance_size: None,
        }
    }
}

impl AcceptorConfig {

    pub fn is_hill_climbing(&self) -> bool {
        self.entity_tabu_size.is_none()
            && self.value_tabu_size.is_none()
            && self.simulated_annealing_starting_temperature.is_none()
            && self.late_acceptance_size.is_none()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, size) in [
            ("entity_tabu_size", self.entity_tabu_size),
            ("value_tabu_size", self.value_tabu_size),
            ("late_acceptance_size", self.late_acceptance_size),
        ] {
            if size == Some(0) {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        if let Some(rate) = self.simulated_annealing_cooling_rate {
            if !(rate > 0.0 && rate < 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "simulated_annealing_cooling_rate {rate} must lie in (0, 1)"
                )));
            }
        }
        if self.simulated_annealing_cooling_rate.is_some()
            && self.simulated_annealing_starting_temperature.is_none()
        {
            return Err(ConfigError::Invalid(
                "simulated_annealing_cooling_rate requires a starting temperature".to_string(),
            ));
        }
        Ok(())
    }
}

/// Forager configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForagerConfig {
    /// Stops the step after this many accepted moves.
    pub accepted_count_limit: Option<usize>,

    #[serde(default)]
    pub pick_early_type: LocalSearchPickEarlyType,
}

/// When the local search forager stops evaluating moves of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalSearchPickEarlyType {
    #[default]
    Never,

    /// First accepted move that improves the best score.
    FirstBestScoreImproving,

    /// First accepted move that improves the last step score.
    FirstLastStepScoreImproving,
}

/// Order and caching of the moves of a local search step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MoveSelectionConfig {
    #[serde(default)]
    pub selection_order: SelectionOrder,

    #[serde(default)]
    pub cache_type: CacheType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrder {
    /// Selector order.
    #[default]
    Original,

    /// Random order without replacement, reshuffled every step.
    Shuffled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Moves are generated on demand.
    #[default]
    JustInTime,

    /// Moves are materialized once per step.
    Step,

    /// Moves are materialized once per phase.
    Phase,
}

/// Exhaustive search configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExhaustiveSearchConfig {
    #[serde(default)]
    pub exhaustive_search_type: ExhaustiveSearchType,

    /// Only used by branch and bound; brute force explores depth first.
    pub node_exploration_type: Option<NodeExplorationType>,

    /// Ends the phase at the first complete assignment that improves the best score.
    #[serde(default)]
    pub stop_at_first_improving_solution: bool,

    /// Phase termination configuration.
    pub termination: Option<TerminationConfig>,
}

/// Exhaustive search types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustiveSearchType {
    /// Prunes with a score bounder.
    #[default]
    BranchAndBound,

    /// Explores every node.
    BruteForce,
}

/// Order in which expandable nodes are popped from the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeExplorationType {
    DepthFirst,
    BreadthFirst,
    ScoreFirst,
    #[default]
    OptimisticBoundFirst,
}
