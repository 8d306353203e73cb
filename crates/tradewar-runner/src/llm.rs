//! Chat provider abstraction and HTTP backends with tool calling.
//!
//! [`ChatProvider`] is the seam the reasoning adapter talks to. It is
//! dyn-compatible (the async method returns a boxed future) so the adapter can
//! hold either a real backend or a test stub behind one `Arc`. The concrete
//! backends use enum dispatch, one variant per wire protocol, and keep their
//! request building and response decoding in pure functions.

use futures::future::BoxFuture;
use serde_json::{Value, json};
use tradewar_types::{ToolCall, ToolName};

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::RunnerError;
use crate::schema;

const MAX_TOKENS: u32 = 512;

// ---------------------------------------------------------------------------
// Conversation model
// ---------------------------------------------------------------------------

/// One message of a provider conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    /// Instructions establishing the strategist role.
    System(String),
    /// The observation prompt.
    User(String),
    /// A model turn that requested tools.
    Assistant {
        /// Accompanying text, if any.
        content: Option<String>,
        /// The requested calls.
        tool_calls: Vec<ToolCall>,
    },
    /// The result of one executed tool call.
    Tool {
        /// Id of the call this answers.
        call_id: String,
        /// Tool name.
        name: String,
        /// JSON-encoded result.
        content: String,
    },
}

/// A single request to a provider.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Conversation so far.
    pub messages: &'a [ChatMessage],
    /// Tools the model may call.
    pub tools: &'a [ToolName],
    /// Whether the model must call a tool this turn.
    pub require_tool: bool,
    /// Sampling temperature.
    pub temperature: f64,
}

/// What the provider did with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderTurn {
    /// The model asked for tools to be executed.
    ToolCalls(Vec<ToolCall>),
    /// The model answered with text (expected to hold a JSON object).
    Final(String),
}

/// A reasoning provider reachable over some transport.
pub trait ChatProvider: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Send one turn of the conversation.
    fn complete<'a>(
        &'a self,
        request: ChatRequest<'a>,
    ) -> BoxFuture<'a, Result<ProviderTurn, RunnerError>>;
}

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// An HTTP chat backend.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl ChatProvider for LlmBackend {
    fn name(&self) -> &str {
        match self {
            Self::OpenAi(backend) => &backend.label,
            Self::Anthropic(_) => "anthropic",
        }
    }

    fn complete<'a>(
        &'a self,
        request: ChatRequest<'a>,
    ) -> BoxFuture<'a, Result<ProviderTurn, RunnerError>> {
        match self {
            Self::OpenAi(backend) => Box::pin(backend.complete(request)),
            Self::Anthropic(backend) => Box::pin(backend.complete(request)),
        }
    }
}

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
    }
}

/// Decode a tool-call argument string, keeping unparsable text as a JSON
/// string so the toolbox rejects it as invalid arguments.
fn decode_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Send `body` on a prepared request and decode the JSON response.
async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    provider: &str,
) -> Result<Value, RunnerError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| RunnerError::LlmBackend(format!("{provider} request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(RunnerError::LlmBackend(format!(
            "{provider} returned {status}: {error_body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RunnerError::LlmBackend(format!("{provider} response parse failed: {e}")))
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Works with `OpenAI` and `OpenRouter`. Sends requests to
/// `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    label: String,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            label: config.label.clone(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<ProviderTurn, RunnerError> {
        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));
        let body = openai_request_body(&self.model, request);
        let json = post_json(
            self.client.post(&url).bearer_auth(&self.api_key),
            &body,
            &self.label,
        )
        .await?;
        extract_openai_turn(&json)
    }
}

fn openai_message(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::System(text) => json!({"role": "system", "content": text}),
        ChatMessage::User(text) => json!({"role": "user", "content": text}),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let calls: Vec<Value> = tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.call_id.clone().unwrap_or_else(|| call.name.clone()),
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            json!({"role": "assistant", "content": content, "tool_calls": calls})
        }
        ChatMessage::Tool {
            call_id, content, ..
        } => json!({"role": "tool", "tool_call_id": call_id, "content": content}),
    }
}

/// Build the chat completions request body.
pub fn openai_request_body(model: &str, request: ChatRequest<'_>) -> Value {
    let messages: Vec<Value> = request.messages.iter().map(openai_message).collect();
    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": request.temperature,
        "max_tokens": MAX_TOKENS,
        "response_format": {"type": "json_object"},
    });
    if !request.tools.is_empty()
        && let Some(map) = body.as_object_mut()
    {
        let tools: Vec<Value> = request.tools.iter().copied().map(schema::openai_tool).collect();
        map.insert("tools".to_owned(), Value::Array(tools));
        let choice = if request.require_tool { "required" } else { "auto" };
        map.insert("tool_choice".to_owned(), json!(choice));
    }
    body
}

/// Decode a chat completions response into a provider turn.
pub fn extract_openai_turn(json: &Value) -> Result<ProviderTurn, RunnerError> {
    let message = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| {
            RunnerError::LlmBackend("OpenAI response missing choices[0].message".to_owned())
        })?;

    let calls: Vec<ToolCall> = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .filter_map(|call| {
                    let function = call.get("function")?;
                    let name = function.get("name")?.as_str()?;
                    let arguments = function
                        .get("arguments")
                        .and_then(Value::as_str)
                        .map_or_else(|| json!({}), decode_arguments);
                    Some(ToolCall {
                        name: name.to_owned(),
                        arguments,
                        call_id: call.get("id").and_then(Value::as_str).map(ToOwned::to_owned),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if !calls.is_empty() {
        return Ok(ProviderTurn::ToolCalls(calls));
    }

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or("{}");
    Ok(ProviderTurn::Final(content.to_owned()))
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Anthropic uses a different request format from `OpenAI`:
/// - `x-api-key` header instead of `Authorization: Bearer`
/// - the system prompt is a top-level field
/// - tool calls and results are content blocks (`tool_use`, `tool_result`)
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<ProviderTurn, RunnerError> {
        let url = format!("{}/messages", self.api_url.trim_end_matches('/'));
        let body = anthropic_request_body(&self.model, request);
        let json = post_json(
            self.client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01"),
            &body,
            "anthropic",
        )
        .await?;
        extract_anthropic_turn(&json)
    }
}

/// Build the Messages API request body.
///
/// Consecutive tool results are folded into one `user` message, as the API
/// requires.
pub fn anthropic_request_body(model: &str, request: ChatRequest<'_>) -> Value {
    let mut system = Vec::new();
    let mut messages: Vec<Value> = Vec::new();
    let mut pending_results: Vec<Value> = Vec::new();

    let flush = |pending: &mut Vec<Value>, messages: &mut Vec<Value>| {
        if !pending.is_empty() {
            messages.push(json!({"role": "user", "content": std::mem::take(pending)}));
        }
    };

    for message in request.messages {
        match message {
            ChatMessage::System(text) => system.push(text.clone()),
            ChatMessage::User(text) => {
                flush(&mut pending_results, &mut messages);
                messages.push(json!({"role": "user", "content": text}));
            }
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                flush(&mut pending_results, &mut messages);
                let mut blocks: Vec<Value> = Vec::new();
                if let Some(text) = content.as_ref().filter(|t| !t.is_empty()) {
                    blocks.push(json!({"type": "text", "text": text}));
                }
                for call in tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.call_id.clone().unwrap_or_else(|| call.name.clone()),
                        "name": call.name,
                        "input": call.arguments,
                    }));
                }
                messages.push(json!({"role": "assistant", "content": blocks}));
            }
            ChatMessage::Tool {
                call_id, content, ..
            } => pending_results.push(json!({
                "type": "tool_result",
                "tool_use_id": call_id,
                "content": content,
            })),
        }
    }
    flush(&mut pending_results, &mut messages);

    let mut body = json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "temperature": request.temperature,
        "system": system.join("\n\n"),
        "messages": messages,
    });
    if !request.tools.is_empty()
        && let Some(map) = body.as_object_mut()
    {
        let tools: Vec<Value> = request
            .tools
            .iter()
            .copied()
            .map(schema::anthropic_tool)
            .collect();
        map.insert("tools".to_owned(), Value::Array(tools));
        let choice = if request.require_tool { "any" } else { "auto" };
        map.insert("tool_choice".to_owned(), json!({"type": choice}));
    }
    body
}

/// Decode a Messages API response into a provider turn.
pub fn extract_anthropic_turn(json: &Value) -> Result<ProviderTurn, RunnerError> {
    let blocks = json
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| RunnerError::LlmBackend("Anthropic response missing content".to_owned()))?;

    let calls: Vec<ToolCall> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("tool_use"))
        .filter_map(|b| {
            Some(ToolCall {
                name: b.get("name")?.as_str()?.to_owned(),
                arguments: b.get("input").cloned().unwrap_or_else(|| json!({})),
                call_id: b.get("id").and_then(Value::as_str).map(ToOwned::to_owned),
            })
        })
        .collect();
    if !calls.is_empty() {
        return Ok(ProviderTurn::ToolCalls(calls));
    }

    let text: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(RunnerError::LlmBackend(
            "Anthropic response has neither text nor tool_use blocks".to_owned(),
        ));
    }
    Ok(ProviderTurn::Final(text.join("")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    fn config(backend_type: BackendType) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type,
            label: "openrouter".to_owned(),
            api_url: "https://example.invalid/v1".to_owned(),
            api_key: "test".to_owned(),
            model: "test-model".to_owned(),
        }
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::System("be formal".to_owned()),
            ChatMessage::User("Agent: A".to_owned()),
            ChatMessage::Assistant {
                content: None,
                tool_calls: vec![
                    ToolCall {
                        name: "assess_retaliation_risk".to_owned(),
                        arguments: json!({"rate": 0.08}),
                        call_id: Some("call_1".to_owned()),
                    },
                    ToolCall {
                        name: "calculate_payoff_matrix".to_owned(),
                        arguments: json!({}),
                        call_id: Some("call_2".to_owned()),
                    },
                ],
            },
            ChatMessage::Tool {
                call_id: "call_1".to_owned(),
                name: "assess_retaliation_risk".to_owned(),
                content: "{\"retaliation_risk\":0.5}".to_owned(),
            },
            ChatMessage::Tool {
                call_id: "call_2".to_owned(),
                name: "calculate_payoff_matrix".to_owned(),
                content: "{}".to_owned(),
            },
        ]
    }

    #[test]
    fn openai_turn_with_tool_calls() {
        let json = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "assess_retaliation_risk", "arguments": "{\"rate\": 0.1}"}
                    }]
                }
            }]
        });
        let ProviderTurn::ToolCalls(calls) = extract_openai_turn(&json).unwrap() else {
            panic!("expected tool calls");
        };
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "assess_retaliation_risk");
        assert_eq!(calls[0].arguments, json!({"rate": 0.1}));
        assert_eq!(calls[0].call_id.as_deref(), Some("call_9"));
    }

    #[test]
    fn openai_turn_with_final_content() {
        let json = json!({"choices": [{"message": {"content": "{\"memo\": \"hold\"}"}}]});
        assert_eq!(
            extract_openai_turn(&json).unwrap(),
            ProviderTurn::Final("{\"memo\": \"hold\"}".to_owned())
        );
    }

    #[test]
    fn openai_turn_missing_choices_is_error() {
        let json = json!({"error": "rate_limit"});
        assert!(extract_openai_turn(&json).is_err());
    }

    #[test]
    fn openai_unparsable_arguments_are_kept_as_string() {
        let json = json!({
            "choices": [{"message": {"tool_calls": [{
                "id": "c", "function": {"name": "trigger_event", "arguments": "{not json"}
            }]}}]
        });
        let ProviderTurn::ToolCalls(calls) = extract_openai_turn(&json).unwrap() else {
            panic!("expected tool calls");
        };
        assert_eq!(calls[0].arguments, Value::String("{not json".to_owned()));
    }

    #[test]
    fn openai_body_requires_tool_on_first_round() {
        let messages = conversation();
        let tools = [ToolName::AssessRetaliationRisk];
        let body = openai_request_body(
            "m",
            ChatRequest {
                messages: &messages,
                tools: &tools,
                require_tool: true,
                temperature: 0.4,
            },
        );
        assert_eq!(body["tool_choice"], "required");
        assert_eq!(body["tools"][0]["function"]["name"], "assess_retaliation_risk");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(body["messages"][3]["role"], "tool");
        assert_eq!(body["messages"][3]["tool_call_id"], "call_1");
    }

    #[test]
    fn openai_body_without_tools_omits_tool_choice() {
        let messages = vec![ChatMessage::User("hi".to_owned())];
        let body = openai_request_body(
            "m",
            ChatRequest {
                messages: &messages,
                tools: &[],
                require_tool: true,
                temperature: 0.4,
            },
        );
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn anthropic_body_folds_tool_results() {
        let messages = conversation();
        let tools = [ToolName::AssessRetaliationRisk, ToolName::CalculatePayoffMatrix];
        let body = anthropic_request_body(
            "m",
            ChatRequest {
                messages: &messages,
                tools: &tools,
                require_tool: false,
                temperature: 0.4,
            },
        );
        assert_eq!(body["system"], "be formal");
        let sent = body["messages"].as_array().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1]["content"][0]["type"], "tool_use");
        assert_eq!(sent[2]["role"], "user");
        assert_eq!(sent[2]["content"].as_array().unwrap().len(), 2);
        assert_eq!(body["tool_choice"]["type"], "auto");
    }

    #[test]
    fn anthropic_turn_with_tool_use() {
        let json = json!({
            "content": [
                {"type": "text", "text": "Checking."},
                {"type": "tool_use", "id": "toolu_1", "name": "predict_response", "input": {"action": "tariff", "opponent": "Beta"}}
            ]
        });
        let ProviderTurn::ToolCalls(calls) = extract_anthropic_turn(&json).unwrap() else {
            panic!("expected tool calls");
        };
        assert_eq!(calls[0].call_id.as_deref(), Some("toolu_1"));
        assert_eq!(calls[0].arguments["opponent"], "Beta");
    }

    #[test]
    fn anthropic_turn_with_text() {
        let json = json!({"content": [{"type": "text", "text": "{\"memo\": \"m\"}"}]});
        assert_eq!(
            extract_anthropic_turn(&json).unwrap(),
            ProviderTurn::Final("{\"memo\": \"m\"}".to_owned())
        );
        assert!(extract_anthropic_turn(&json!({"content": []})).is_err());
    }

    #[test]
    fn create_backend_dispatches_correctly() {
        assert_eq!(create_backend(&config(BackendType::OpenAi)).name(), "openrouter");
        assert_eq!(create_backend(&config(BackendType::Anthropic)).name(), "anthropic");
    }
}
