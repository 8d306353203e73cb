//! Error types for the tradewar-agents crate.
//!
//! Tool dispatch failures are [`ToolError`](tradewar_types::ToolError) values
//! reported back to the reasoning provider; this enum covers roster assembly
//! and the failures a single round can absorb without stopping its loop.

use tradewar_world::WorldError;

/// Errors that can occur while building or running agents.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A world lookup failed (for example an unknown country).
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// Two agents were given the same name.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),
}
