//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup. Once the tasks are running nothing in
//! steady state surfaces here; per-round and per-write failures are logged
//! where they happen.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tradewar_core::ConfigError,
    },

    /// Reasoning provider setup failed.
    #[error("reasoning error: {source}")]
    Reasoning {
        /// The underlying runner error.
        #[from]
        source: tradewar_runner::RunnerError,
    },

    /// Building the agent roster failed.
    #[error("agent error: {source}")]
    Agents {
        /// The underlying agent error.
        #[from]
        source: tradewar_agents::AgentError,
    },

    /// Opening the snapshot store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: tradewar_db::DbError,
    },
}
