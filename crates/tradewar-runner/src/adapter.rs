//! The reasoning adapter: one `reason` operation over two strategies.
//!
//! The strategy is picked once at process start. With a provider, each round
//! is a short tool-calling conversation: the model may request declared
//! tools, every request is executed synchronously through the caller's
//! [`ToolExecutor`], and the result is fed back before the next turn. After
//! `max_rounds` turns without a final answer the adapter gives up with a
//! cautious hold result. Without a provider, the heuristic answers.
//!
//! Deadlines are the caller's concern: wrap [`ReasoningAdapter::reason`] in
//! `tokio::time::timeout` and use [`ReasoningAdapter::heuristic`] on expiry.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};
use tradewar_types::{ReasoningMode, ReasoningResult, ToolError, ToolName};

use crate::config::{DEFAULT_TEMPERATURE, ReasoningConfig};
use crate::error::RunnerError;
use crate::heuristic::heuristic_reason;
use crate::llm::{ChatMessage, ChatProvider, ChatRequest, ProviderTurn, create_backend};
use crate::parse::final_result;
use crate::prompt::PromptEngine;

/// Default tool-calling rounds per reasoning call.
pub const DEFAULT_MAX_ROUNDS: u32 = 3;

/// Thought recorded when the round budget runs out.
pub const ROUND_BUDGET_THOUGHT: &str = "Timeout in tool loop; reverting to cautious posture.";

/// Executes tool calls on behalf of a reasoning round.
///
/// Implemented by each agent's toolbox; it decides which names the agent may
/// call and runs them against shared state.
pub trait ToolExecutor: Send {
    /// Run `tool` with `arguments` and return its JSON result.
    fn execute(&mut self, tool: &str, arguments: &Value) -> Result<Value, ToolError>;
}

/// Which strategy answers reasoning calls.
#[derive(Clone)]
pub enum Strategy {
    /// A network-backed provider.
    Provider(Arc<dyn ChatProvider>),
    /// The deterministic heuristic.
    Heuristic,
}

/// The reasoning adapter shared by every agent.
pub struct ReasoningAdapter {
    strategy: Strategy,
    prompts: PromptEngine,
    max_rounds: u32,
    temperature: f64,
}

impl ReasoningAdapter {
    /// An adapter that always uses the heuristic.
    pub const fn heuristic_only(prompts: PromptEngine) -> Self {
        Self {
            strategy: Strategy::Heuristic,
            prompts,
            max_rounds: DEFAULT_MAX_ROUNDS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// An adapter backed by `provider`.
    pub fn with_provider(provider: Arc<dyn ChatProvider>, prompts: PromptEngine) -> Self {
        Self {
            strategy: Strategy::Provider(provider),
            prompts,
            max_rounds: DEFAULT_MAX_ROUNDS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Build the adapter the configuration asks for.
    pub fn from_config(config: &ReasoningConfig) -> Result<Self, RunnerError> {
        let prompts = PromptEngine::new(config.templates_dir.as_deref())?;
        let adapter = match &config.backend {
            Some(backend) => Self::with_provider(Arc::new(create_backend(backend)), prompts),
            None => Self::heuristic_only(prompts),
        };
        Ok(adapter.with_temperature(config.temperature))
    }

    /// Set the tool-calling round budget.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Which mode results are tagged with.
    pub const fn mode(&self) -> ReasoningMode {
        match self.strategy {
            Strategy::Provider(_) => ReasoningMode::Provider,
            Strategy::Heuristic => ReasoningMode::Heuristic,
        }
    }

    /// Name of the live strategy for logging.
    pub fn strategy_name(&self) -> &str {
        match &self.strategy {
            Strategy::Provider(provider) => provider.name(),
            Strategy::Heuristic => "heuristic",
        }
    }

    /// The network-free heuristic, always available.
    pub fn heuristic(observation: &str, tools: &[ToolName]) -> ReasoningResult {
        heuristic_reason(observation, tools)
    }

    /// Reason about `observation` with the live strategy.
    ///
    /// # Errors
    ///
    /// Returns an error when the prompt cannot be rendered or the provider
    /// transport fails. Malformed answers and an exhausted round budget are
    /// not errors.
    pub async fn reason(
        &self,
        agent_name: &str,
        observation: &str,
        tools: &[ToolName],
        executor: &mut dyn ToolExecutor,
    ) -> Result<ReasoningResult, RunnerError> {
        match &self.strategy {
            Strategy::Heuristic => Ok(heuristic_reason(observation, tools)),
            Strategy::Provider(provider) => {
                self.provider_loop(provider.as_ref(), agent_name, observation, tools, executor)
                    .await
            }
        }
    }

    async fn provider_loop(
        &self,
        provider: &dyn ChatProvider,
        agent_name: &str,
        observation: &str,
        tools: &[ToolName],
        executor: &mut dyn ToolExecutor,
    ) -> Result<ReasoningResult, RunnerError> {
        let prompt = self.prompts.render(agent_name, observation, tools)?;
        let mut messages = vec![ChatMessage::System(prompt.system), ChatMessage::User(prompt.user)];
        let mut calls = Vec::new();

        for round in 0..self.max_rounds {
            let request = ChatRequest {
                messages: &messages,
                tools,
                require_tool: round == 0 && !tools.is_empty(),
                temperature: self.temperature,
            };
            match provider.complete(request).await? {
                ProviderTurn::Final(content) => {
                    debug!(
                        agent = agent_name,
                        round,
                        tool_calls = calls.len(),
                        "provider returned final answer"
                    );
                    return Ok(final_result(&content, calls));
                }
                ProviderTurn::ToolCalls(requested) => {
                    let mut results = Vec::with_capacity(requested.len());
                    for call in &requested {
                        let output = executor
                            .execute(&call.name, &call.arguments)
                            .unwrap_or_else(|e| {
                                warn!(agent = agent_name, tool = %call.name, error = %e, "tool call rejected");
                                json!({"error": e.to_string()})
                            });
                        results.push(ChatMessage::Tool {
                            call_id: call.call_id.clone().unwrap_or_else(|| call.name.clone()),
                            name: call.name.clone(),
                            content: output.to_string(),
                        });
                    }
                    messages.push(ChatMessage::Assistant {
                        content: None,
                        tool_calls: requested.clone(),
                    });
                    messages.extend(results);
                    calls.extend(requested);
                }
            }
        }

        warn!(
            agent = agent_name,
            rounds = self.max_rounds,
            tool_calls = calls.len(),
            "tool round budget exhausted, holding position"
        );
        Ok(ReasoningResult::hold(ReasoningMode::Provider, ROUND_BUDGET_THOUGHT, calls))
    }
}
