//! Error types for the reasoning adapter.
//!
//! Uses `thiserror` for typed errors that surface through the reasoning
//! pipeline: provider configuration, prompt rendering, HTTP calls, and
//! response decoding. None of them ever stop an agent loop; the runtime
//! turns each into a cautious default result.

/// Errors that can occur during a reasoning round.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to load or render a prompt template.
    #[error("template render error: {0}")]
    Template(String),

    /// A provider returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
