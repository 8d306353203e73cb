//! Configuration loading and typed config structures for the trade-war
//! simulation.
//!
//! The canonical configuration lives in `tradewar-config.yaml` at the project
//! root (overridable with `TRADEWAR_CONFIG`). Every field has a default, so a
//! missing section, an empty file, or no file at all is valid. Reasoning
//! provider credentials are never read from YAML; see `tradewar-runner`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tradewar-config.yaml";

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "TRADEWAR_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Bus, memory, and reasoning bounds.
    #[serde(default)]
    pub simulation: SimulationBounds,

    /// Agent idle delays.
    #[serde(default)]
    pub agents: AgentTiming,

    /// Drift and snapshot periods.
    #[serde(default)]
    pub publisher: PublisherConfig,

    /// Filesystem paths, Redis, and the observer listener.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file.
    ///
    /// After parsing, `REDIS_URL` overrides `infrastructure.redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if `simulation.mailbox_capacity` is zero.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        if config.simulation.mailbox_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "simulation.mailbox_capacity",
                reason: "must be at least 1, or omitted for unbounded",
            });
        }
        config
            .infrastructure
            .apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from `TRADEWAR_CONFIG` or the default file, falling back to
    /// defaults when neither exists.
    ///
    /// Returns the config and the path it was read from, if any.
    ///
    /// # Errors
    ///
    /// Returns an error only when a file exists but cannot be read or parsed.
    pub fn load() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
        if path.exists() {
            Ok((Self::from_file(&path)?, Some(path)))
        } else {
            Ok((Self::parse("")?, None))
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Bounds on the bus, agent memory, and reasoning rounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBounds {
    /// Reasoning call timeout before the heuristic takes over.
    #[serde(default = "default_decision_timeout_ms")]
    pub decision_timeout_ms: u64,

    /// Tool-calling rounds before the provider loop gives up.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Events kept in the bus history ring.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Memory entries kept per agent.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Per-mailbox cap. Absent means unbounded.
    #[serde(default)]
    pub mailbox_capacity: Option<usize>,

    /// Events included in each snapshot.
    #[serde(default = "default_recent_events_limit")]
    pub recent_events_limit: usize,

    /// Recent events scanned for the policy timeline.
    #[serde(default = "default_timeline_window")]
    pub timeline_window: usize,

    /// Maximum timeline entries.
    #[serde(default = "default_timeline_limit")]
    pub timeline_limit: usize,

    /// Recent events visible to `detect_policy_changes`.
    #[serde(default = "default_tool_history_limit")]
    pub tool_history_limit: usize,
}

impl SimulationBounds {
    /// Decision timeout as a [`Duration`].
    pub const fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }
}

impl Default for SimulationBounds {
    fn default() -> Self {
        Self {
            decision_timeout_ms: default_decision_timeout_ms(),
            max_tool_rounds: default_max_tool_rounds(),
            history_capacity: default_history_capacity(),
            memory_capacity: default_memory_capacity(),
            mailbox_capacity: None,
            recent_events_limit: default_recent_events_limit(),
            timeline_window: default_timeline_window(),
            timeline_limit: default_timeline_limit(),
            tool_history_limit: default_tool_history_limit(),
        }
    }
}

/// Idle delay after each agent round.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentTiming {
    /// Country strategy agents.
    #[serde(default = "default_idle_ms")]
    pub country_idle_ms: u64,

    /// Market, game-theory, and negotiation agents.
    #[serde(default = "default_idle_ms")]
    pub analyst_idle_ms: u64,

    /// Scenario execution agent.
    #[serde(default = "default_scenario_idle_ms")]
    pub scenario_idle_ms: u64,
}

impl Default for AgentTiming {
    fn default() -> Self {
        Self {
            country_idle_ms: default_idle_ms(),
            analyst_idle_ms: default_idle_ms(),
            scenario_idle_ms: default_scenario_idle_ms(),
        }
    }
}

/// Periods of the background tasks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublisherConfig {
    /// Snapshot publisher period.
    #[serde(default = "default_period_ms")]
    pub snapshot_interval_ms: u64,

    /// World drift period.
    #[serde(default = "default_period_ms")]
    pub drift_interval_ms: u64,

    /// Welfare points kept in world history.
    #[serde(default = "default_world_history_limit")]
    pub world_history_limit: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: default_period_ms(),
            drift_interval_ms: default_period_ms(),
            world_history_limit: default_world_history_limit(),
        }
    }
}

/// Paths and connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Directory the file snapshot backend writes into.
    #[serde(default = "default_shared_dir")]
    pub shared_dir: PathBuf,

    /// Redis-compatible URL. When set, snapshots go to Redis instead of files.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Observer bind host.
    #[serde(default = "default_observer_host")]
    pub observer_host: String,

    /// Observer bind port.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,

    /// Static dashboard directory.
    #[serde(default = "default_dashboard_dir")]
    pub dashboard_dir: PathBuf,
}

impl InfrastructureConfig {
    /// Override settings from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("REDIS_URL").filter(|v| !v.trim().is_empty()) {
            self.redis_url = Some(url);
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            shared_dir: default_shared_dir(),
            redis_url: None,
            observer_host: default_observer_host(),
            observer_port: default_observer_port(),
            dashboard_dir: default_dashboard_dir(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_decision_timeout_ms() -> u64 {
    6000
}

const fn default_max_tool_rounds() -> u32 {
    3
}

const fn default_history_capacity() -> usize {
    200
}

const fn default_memory_capacity() -> usize {
    12
}

const fn default_recent_events_limit() -> usize {
    60
}

const fn default_timeline_window() -> usize {
    20
}

const fn default_timeline_limit() -> usize {
    12
}

const fn default_tool_history_limit() -> usize {
    50
}

const fn default_idle_ms() -> u64 {
    1600
}

const fn default_scenario_idle_ms() -> u64 {
    1200
}

const fn default_period_ms() -> u64 {
    1000
}

const fn default_world_history_limit() -> usize {
    120
}

fn default_shared_dir() -> PathBuf {
    PathBuf::from("shared")
}

fn default_observer_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_observer_port() -> u16 {
    8000
}

fn default_dashboard_dir() -> PathBuf {
    PathBuf::from("dashboard")
}

fn default_log_level() -> String {
    "info".to_owned()
}
