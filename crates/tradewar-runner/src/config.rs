//! Reasoning provider configuration.
//!
//! All provider settings come from environment variables; credentials never
//! live in the YAML config. Resolution happens once at process start and the
//! outcome holds for the whole process: a requested provider whose key is
//! missing resolves to the heuristic.

use tracing::warn;

use crate::error::RunnerError;

/// Default model for OpenAI-compatible providers.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default model for the Anthropic provider.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.4;

const OPENAI_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1";

/// Complete reasoning configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningConfig {
    /// Provider name as requested by `LLM_PROVIDER`.
    pub requested: String,
    /// Resolved backend, or `None` for heuristic mode.
    pub backend: Option<LlmBackendConfig>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Directory with prompt template overrides.
    pub templates_dir: Option<String>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmBackendConfig {
    /// Wire protocol.
    pub backend_type: BackendType,
    /// Provider label for logging (`openai`, `openrouter`, `anthropic`).
    pub label: String,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Supported LLM wire protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions (`OpenAI`, `OpenRouter`).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl ReasoningConfig {
    /// Load configuration from environment variables.
    ///
    /// - `LLM_PROVIDER` -- `openai` (default), `openrouter`, `anthropic`,
    ///   or `heuristic`
    /// - `OPENAI_API_KEY`, `OPENROUTER_API_KEY`, `ANTHROPIC_API_KEY`
    /// - `OPENAI_MODEL` / `OPENROUTER_MODEL` (default `gpt-4o-mini`)
    /// - `ANTHROPIC_MODEL` (default `claude-3-5-haiku-latest`)
    /// - `LLM_API_URL` -- base URL override
    /// - `LLM_TEMPERATURE` -- default `0.4`
    /// - `TEMPLATES_DIR` -- prompt template override directory
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let requested = var("LLM_PROVIDER").map_or_else(|| "openai".to_owned(), |p| p.to_lowercase());

        let temperature = match var("LLM_TEMPERATURE") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|e| RunnerError::Config(format!("invalid LLM_TEMPERATURE: {e}")))?,
            None => DEFAULT_TEMPERATURE,
        };

        let openai_model = || {
            var("OPENAI_MODEL")
                .or_else(|| var("OPENROUTER_MODEL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_owned())
        };

        let backend = match requested.as_str() {
            "openai" => var("OPENAI_API_KEY").map(|api_key| LlmBackendConfig {
                backend_type: BackendType::OpenAi,
                label: "openai".to_owned(),
                api_url: var("LLM_API_URL").unwrap_or_else(|| OPENAI_URL.to_owned()),
                api_key,
                model: openai_model(),
            }),
            "openrouter" => var("OPENROUTER_API_KEY").map(|api_key| LlmBackendConfig {
                backend_type: BackendType::OpenAi,
                label: "openrouter".to_owned(),
                api_url: var("LLM_API_URL").unwrap_or_else(|| OPENROUTER_URL.to_owned()),
                api_key,
                model: openai_model(),
            }),
            "anthropic" | "claude" => var("ANTHROPIC_API_KEY").map(|api_key| LlmBackendConfig {
                backend_type: BackendType::Anthropic,
                label: "anthropic".to_owned(),
                api_url: var("LLM_API_URL").unwrap_or_else(|| ANTHROPIC_URL.to_owned()),
                api_key,
                model: var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_owned()),
            }),
            "heuristic" => None,
            other => {
                warn!(provider = other, "unknown LLM_PROVIDER, using heuristic reasoning");
                None
            }
        };

        Ok(Self {
            requested,
            backend,
            temperature,
            templates_dir: var("TEMPLATES_DIR"),
        })
    }

    /// Label of the live strategy.
    pub fn mode_label(&self) -> &str {
        self.backend.as_ref().map_or("heuristic", |b| b.label.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve(vars: &[(&str, &str)]) -> Result<ReasoningConfig, RunnerError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ReasoningConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn no_credentials_means_heuristic() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config.requested, "openai");
        assert!(config.backend.is_none());
        assert_eq!(config.mode_label(), "heuristic");
        assert!((config.temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);
    }

    #[test]
    fn openai_with_key_resolves_backend() {
        let config = resolve(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        let backend = config.backend.unwrap();
        assert_eq!(backend.backend_type, BackendType::OpenAi);
        assert_eq!(backend.api_url, OPENAI_URL);
        assert_eq!(backend.model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn openrouter_uses_its_own_key_and_url() {
        let config = resolve(&[
            ("LLM_PROVIDER", "OpenRouter"),
            ("OPENAI_API_KEY", "sk-wrong"),
            ("OPENROUTER_API_KEY", "or-test"),
            ("OPENROUTER_MODEL", "meta/llama"),
        ])
        .unwrap();
        let backend = config.backend.unwrap();
        assert_eq!(backend.label, "openrouter");
        assert_eq!(backend.api_key, "or-test");
        assert_eq!(backend.api_url, OPENROUTER_URL);
        assert_eq!(backend.model, "meta/llama");
    }

    #[test]
    fn provider_without_its_key_falls_back_to_heuristic() {
        let config = resolve(&[("LLM_PROVIDER", "anthropic"), ("OPENAI_API_KEY", "sk")]).unwrap();
        assert!(config.backend.is_none());
    }

    #[test]
    fn anthropic_defaults() {
        let config = resolve(&[("LLM_PROVIDER", "anthropic"), ("ANTHROPIC_API_KEY", "ak")]).unwrap();
        let backend = config.backend.unwrap();
        assert_eq!(backend.backend_type, BackendType::Anthropic);
        assert_eq!(backend.model, DEFAULT_ANTHROPIC_MODEL);
    }

    #[test]
    fn explicit_heuristic_ignores_keys() {
        let config = resolve(&[("LLM_PROVIDER", "heuristic"), ("OPENAI_API_KEY", "sk")]).unwrap();
        assert!(config.backend.is_none());
    }

    #[test]
    fn bad_temperature_is_a_config_error() {
        let err = resolve(&[("LLM_TEMPERATURE", "warm")]).unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn url_override_applies() {
        let config = resolve(&[
            ("OPENAI_API_KEY", "sk"),
            ("LLM_API_URL", "http://localhost:11434/v1"),
            ("TEMPLATES_DIR", "/etc/tradewar/templates"),
        ])
        .unwrap();
        assert_eq!(config.backend.unwrap().api_url, "http://localhost:11434/v1");
        assert_eq!(config.templates_dir.as_deref(), Some("/etc/tradewar/templates"));
    }
}
