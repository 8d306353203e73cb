//! Tool-call records and the tool error taxonomy.
//!
//! A [`ToolCall`] is what a reasoning round asked for; whether the call was
//! accepted is decided by the agent's dispatcher, which reports rejections as
//! [`ToolError`] values fed back to the provider instead of failing the round.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ReasoningMode, ToolName};

/// Errors raised while dispatching a tool call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// The name does not belong to the catalogue.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The tool exists but the calling agent did not declare it.
    #[error("tool {tool} is not declared by this agent")]
    NotDeclared {
        /// The rejected tool.
        tool: ToolName,
    },

    /// The argument map did not match the tool's schema.
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// The tool whose arguments were rejected.
        tool: ToolName,
        /// What was wrong with them.
        message: String,
    },

    /// A country argument named no country in the world.
    #[error("unknown country: {0}")]
    UnknownCountry(String),
}

/// One tool invocation requested during a reasoning round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ToolCall {
    /// Requested tool name, as the provider spelled it.
    pub name: String,
    /// JSON object of arguments.
    #[ts(type = "Record<string, unknown>")]
    pub arguments: serde_json::Value,
    /// Provider-assigned call id, when the provider uses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl ToolCall {
    /// A call with no provider id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            call_id: None,
        }
    }
}

/// Outcome of one reasoning round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReasoningResult {
    /// Free-text policy notes.
    pub thoughts: Vec<String>,
    /// Every tool call made (or, for the heuristic, planned) this round.
    pub tool_calls: Vec<ToolCall>,
    /// Summarizing memo handed to the agent's action policy.
    pub memo: String,
    /// Which path produced the result.
    pub mode: ReasoningMode,
}

impl ReasoningResult {
    /// Memo used whenever a round has to fall back to a cautious stance.
    pub const HOLD_MEMO: &'static str = "Hold position pending additional signals.";

    /// A cautious hold result carrying a single explanatory thought.
    pub fn hold(mode: ReasoningMode, thought: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            thoughts: vec![thought.into()],
            tool_calls,
            memo: Self::HOLD_MEMO.to_owned(),
            mode,
        }
    }
}
