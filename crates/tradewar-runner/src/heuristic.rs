//! Deterministic, network-free reasoning.
//!
//! Used for the whole process when no provider credentials are available,
//! and as the fallback whenever a provider round overruns its deadline. The
//! tool calls it returns are illustrative only and are never executed.

use serde_json::json;
use tradewar_types::{ReasoningMode, ReasoningResult, ToolCall, ToolName};

/// Memo attached to every heuristic result.
pub const HEURISTIC_MEMO: &str = "Policy posture adjusted based on risk-weighted welfare outlook. \
Maintaining optionality for de-escalation if retaliation accelerates.";

/// Characters of the observation echoed into the first thought.
const OBSERVATION_PREVIEW_CHARS: usize = 160;

/// Produce the canned heuristic result for `observation` and `tools`.
pub fn heuristic_reason(observation: &str, tools: &[ToolName]) -> ReasoningResult {
    let preview: String = observation.chars().take(OBSERVATION_PREVIEW_CHARS).collect();
    let thoughts = vec![
        format!("Observation captured: {preview}"),
        "Assessing welfare risks and political pressure signals.".to_owned(),
    ];

    let mut tool_calls = Vec::new();
    if tools.contains(&ToolName::EvaluateTradePosition) {
        tool_calls.push(ToolCall::new(
            ToolName::EvaluateTradePosition.as_str(),
            json!({"country": "Country Alpha"}),
        ));
    }
    if tools.contains(&ToolName::ModelGameStructure) {
        tool_calls.push(ToolCall::new(
            ToolName::ModelGameStructure.as_str(),
            json!({"scenario": "repeat"}),
        ));
    }

    ReasoningResult {
        thoughts,
        tool_calls,
        memo: HEURISTIC_MEMO.to_owned(),
        mode: ReasoningMode::Heuristic,
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_is_deterministic() {
        let tools = [ToolName::EvaluateTradePosition];
        assert_eq!(heuristic_reason("obs", &tools), heuristic_reason("obs", &tools));
    }

    #[test]
    fn heuristic_plans_declared_tools_only() {
        let result = heuristic_reason("obs", &[ToolName::ModelGameStructure]);
        assert_eq!(result.mode, ReasoningMode::Heuristic);
        assert_eq!(result.tool_calls.len(), 1);
        assert_eq!(result.tool_calls[0].name, "model_game_structure");
        assert_eq!(result.tool_calls[0].arguments["scenario"], "repeat");

        let none = heuristic_reason("obs", &[ToolName::TriggerEvent]);
        assert!(none.tool_calls.is_empty());
        assert_eq!(none.memo, HEURISTIC_MEMO);
    }

    #[test]
    fn observation_preview_is_truncated_on_char_boundaries() {
        let long = "é".repeat(400);
        let result = heuristic_reason(&long, &[]);
        let preview = result.thoughts[0].trim_start_matches("Observation captured: ");
        assert_eq!(preview.chars().count(), 160);
        assert_eq!(result.thoughts[1], "Assessing welfare risks and political pressure signals.");
    }
}
