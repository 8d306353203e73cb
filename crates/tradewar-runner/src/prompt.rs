//! Prompt template loading and rendering via `minijinja`.
//!
//! The default templates are compiled into the binary. When a templates
//! directory is configured (`TEMPLATES_DIR`), any `system.j2` or `user.j2`
//! found there replaces the built-in version, so operators can tune the
//! strategist persona without recompiling.

use std::path::Path;

use minijinja::{Environment, context};
use tradewar_types::ToolName;

use crate::error::RunnerError;

const DEFAULT_SYSTEM: &str = include_str!("../templates/system.j2");
const DEFAULT_USER: &str = include_str!("../templates/user.j2");

/// Manages prompt template loading and rendering.
pub struct PromptEngine {
    env: Environment<'static>,
}

/// The complete rendered prompt ready to send to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message establishing the strategist role and output format.
    pub system: String,
    /// User message naming the agent, its observation, and its tools.
    pub user: String,
}

impl PromptEngine {
    /// Create an engine with the built-in templates only.
    pub fn builtin() -> Result<Self, RunnerError> {
        Self::new(None)
    }

    /// Create an engine, overriding built-in templates from `templates_dir`.
    ///
    /// Missing override files are not an error; unreadable or invalid ones
    /// are.
    pub fn new(templates_dir: Option<&str>) -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        let system = load_template(templates_dir, "system.j2")?
            .unwrap_or_else(|| DEFAULT_SYSTEM.to_owned());
        let user = load_template(templates_dir, "user.j2")?
            .unwrap_or_else(|| DEFAULT_USER.to_owned());

        env.add_template_owned("system", system)
            .map_err(|e| RunnerError::Template(format!("failed to add system template: {e}")))?;
        env.add_template_owned("user", user)
            .map_err(|e| RunnerError::Template(format!("failed to add user template: {e}")))?;

        Ok(Self { env })
    }

    /// Render the prompt for one reasoning round.
    pub fn render(
        &self,
        agent_name: &str,
        observation: &str,
        tools: &[ToolName],
    ) -> Result<RenderedPrompt, RunnerError> {
        let tool_names: Vec<&str> = tools.iter().copied().map(ToolName::as_str).collect();
        let ctx = context! {
            agent_name => agent_name,
            observation => observation,
            tools => tool_names,
        };

        let system = self
            .env
            .get_template("system")
            .map_err(|e| RunnerError::Template(format!("missing system template: {e}")))?
            .render(&ctx)
            .map_err(|e| RunnerError::Template(format!("system render failed: {e}")))?;

        let user = self
            .env
            .get_template("user")
            .map_err(|e| RunnerError::Template(format!("missing user template: {e}")))?
            .render(&ctx)
            .map_err(|e| RunnerError::Template(format!("user render failed: {e}")))?;

        Ok(RenderedPrompt { system, user })
    }
}

/// Read an override template, if the directory holds one.
fn load_template(dir: Option<&str>, filename: &str) -> Result<Option<String>, RunnerError> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    let path = Path::new(dir).join(filename);
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| RunnerError::Template(format!("failed to read {}: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let unique = format!(
            "tradewar_{tag}_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn builtin_templates_render() {
        let engine = PromptEngine::builtin().unwrap();
        let prompt = engine
            .render(
                "Market Intelligence Agent",
                "Recent events: none",
                &[ToolName::MonitorTradeFlows, ToolName::PredictMarketImpact],
            )
            .unwrap();
        assert!(prompt.system.starts_with("You are a senior economic strategist"));
        assert!(prompt.system.contains("policy_notes"));
        assert!(prompt.user.contains("Agent: Market Intelligence Agent"));
        assert!(prompt.user.contains("Observation: Recent events: none"));
        assert!(prompt.user.contains("monitor_trade_flows, predict_market_impact"));
    }

    #[test]
    fn override_directory_replaces_one_template() {
        let dir = temp_dir("override");
        std::fs::write(dir.join("user.j2"), "{{ agent_name }} sees {{ observation }}").ok();

        let engine = PromptEngine::new(dir.to_str()).unwrap();
        let prompt = engine.render("Alpha", "calm", &[]).unwrap();
        assert_eq!(prompt.user, "Alpha sees calm");
        assert!(prompt.system.contains("senior economic strategist"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_override_is_an_error() {
        let dir = temp_dir("invalid");
        std::fs::write(dir.join("system.j2"), "{% if %}").ok();

        assert!(PromptEngine::new(dir.to_str()).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
