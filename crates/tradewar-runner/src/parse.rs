//! Final-answer parsing into a reasoning result.
//!
//! The provider is asked for `{policy_notes, decision, memo}` but models do
//! not always comply. This module tries several recovery strategies before
//! settling on a safe default: no notes, a `hold` decision, and the raw text
//! as the memo.

use serde::Deserialize;
use tracing::warn;
use tradewar_types::{ReasoningMode, ReasoningResult, ToolCall};

/// Decision used when the final answer cannot be read.
pub const HOLD_DECISION: &str = "hold";

/// The structured final answer of a provider conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PolicyDecision {
    /// Short formal notes.
    #[serde(default)]
    pub policy_notes: Vec<String>,
    /// One-word or one-line decision.
    #[serde(default)]
    pub decision: String,
    /// Summarizing memo.
    #[serde(default)]
    pub memo: String,
}

impl PolicyDecision {
    /// The memo, or the decision when the memo is blank.
    pub fn effective_memo(&self) -> &str {
        if self.memo.trim().is_empty() {
            &self.decision
        } else {
            &self.memo
        }
    }
}

/// Parse a final answer, trying in order:
/// 1. Direct `serde_json` deserialization
/// 2. JSON inside a markdown code block
/// 3. Trailing commas stripped
/// 4. Code block extracted, then trailing commas stripped
pub fn parse_final_answer(raw: &str) -> Option<PolicyDecision> {
    let trimmed = raw.trim();

    if let Ok(parsed) = serde_json::from_str::<PolicyDecision>(trimmed) {
        return Some(parsed);
    }

    if let Some(json_str) = extract_json_from_codeblock(trimmed)
        && let Ok(parsed) = serde_json::from_str::<PolicyDecision>(json_str)
    {
        return Some(parsed);
    }

    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(parsed) = serde_json::from_str::<PolicyDecision>(&cleaned) {
        return Some(parsed);
    }

    if let Some(json_str) = extract_json_from_codeblock(trimmed) {
        let cleaned_inner = strip_trailing_commas(json_str);
        if let Ok(parsed) = serde_json::from_str::<PolicyDecision>(&cleaned_inner) {
            return Some(parsed);
        }
    }

    None
}

/// Turn a provider's final text into a [`ReasoningResult`].
pub fn final_result(raw: &str, tool_calls: Vec<ToolCall>) -> ReasoningResult {
    let decision = parse_final_answer(raw).unwrap_or_else(|| {
        warn!(raw_response = raw, "malformed final answer, holding position");
        PolicyDecision {
            policy_notes: Vec::new(),
            decision: HOLD_DECISION.to_owned(),
            memo: if raw.trim().is_empty() {
                ReasoningResult::HOLD_MEMO.to_owned()
            } else {
                raw.trim().to_owned()
            },
        }
    });
    ReasoningResult {
        memo: decision.effective_memo().to_owned(),
        thoughts: decision.policy_notes,
        tool_calls,
        mode: ReasoningMode::Provider,
    }
}

/// Extract JSON content from a markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let body_start = |tag: &str| {
        text.find(tag).map(|i| {
            let after_tag = i.saturating_add(tag.len());
            text.get(after_tag..)
                .and_then(|s| s.find('\n'))
                .and_then(|nl| after_tag.checked_add(nl))
                .and_then(|pos| pos.checked_add(1))
                .unwrap_or(after_tag)
        })
    };
    let start = body_start("```json").or_else(|| body_start("```"))?;
    let remaining = text.get(start..)?;
    let end = remaining.find("```")?;
    remaining.get(..end).map(str::trim)
}

/// Strip trailing commas before closing braces and brackets.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    for (i, c) in chars.iter().copied().enumerate() {
        if c == ',' {
            let next = chars
                .iter()
                .skip(i.saturating_add(1))
                .find(|n| !n.is_whitespace())
                .copied();
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }
    result
}
