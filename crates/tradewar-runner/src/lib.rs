//! Reasoning for the trade-war simulation agents.
//!
//! An agent hands the adapter its observation and the tools it has declared;
//! the adapter answers with a [`ReasoningResult`](tradewar_types::ReasoningResult).
//! Two strategies exist behind the same operation:
//!
//! - **Provider** -- a chat-completion backend (OpenAI-compatible or
//!   Anthropic) driving a bounded tool-calling conversation.
//! - **Heuristic** -- deterministic and offline, also the fallback when a
//!   provider round overruns its deadline.

pub mod adapter;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod schema;

pub use adapter::{ReasoningAdapter, Strategy, ToolExecutor};
pub use config::{LlmBackendConfig, ReasoningConfig};
pub use error::RunnerError;
pub use llm::{ChatMessage, ChatProvider, ChatRequest, LlmBackend, ProviderTurn};
pub use prompt::PromptEngine;
