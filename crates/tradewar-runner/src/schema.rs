//! Tool descriptions and argument schemas offered to the provider.
//!
//! Argument names here must match the argument structs the agent toolbox
//! deserializes into.

use serde_json::{Value, json};
use tradewar_types::{Sector, ToolName};

/// One-line description shown to the model.
pub const fn description(tool: ToolName) -> &'static str {
    match tool {
        ToolName::EvaluateTradePosition => {
            "Summarize a country's trade balance, import exposure, and average tariff."
        }
        ToolName::CalculateTariffImpact => {
            "Estimate surplus, revenue, and deadweight effects of a tariff on one sector."
        }
        ToolName::ProposePolicyAction => "Record a proposed policy action with parameters.",
        ToolName::AssessRetaliationRisk => "Score the retaliation risk of a tariff rate.",
        ToolName::MonitorTradeFlows => "Report current sector trade flow for a country pair.",
        ToolName::DetectPolicyChanges => "List recent policy events on the bus.",
        ToolName::AnalyzeSupplyChains => "Score supply-chain stress for a sector.",
        ToolName::PredictMarketImpact => "Predict inflation and equity drawdown from a policy.",
        ToolName::ModelGameStructure => "Classify the strategic structure of a scenario.",
        ToolName::FindNashEquilibrium => "Find the equilibrium strategy profile.",
        ToolName::PredictResponse => "Predict an opponent's response to an action.",
        ToolName::CalculatePayoffMatrix => "Return the cooperate/defect payoff matrix.",
        ToolName::DetectNegotiationWindow => {
            "Check whether welfare losses open a negotiation window."
        }
        ToolName::GenerateDealProposal => "Draft a phased tariff rollback deal.",
        ToolName::EvaluateConcessionValue => "Score the value and risk of a concession offer.",
        ToolName::ManageBargainingRound => "Advance a bargaining round with the given offers.",
        ToolName::ExecuteSimulationRound => {
            "Recompute trade flow and return welfare for every country."
        }
        ToolName::GenerateWelfareReport => "Report welfare per country.",
        ToolName::DetectEquilibrium => "Check whether welfare has converged across countries.",
        ToolName::TriggerEvent => "Trigger a named scenario event.",
    }
}

fn object(properties: &Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// JSON schema of a tool's argument object.
pub fn parameters(tool: ToolName) -> Value {
    let sectors: Vec<&str> = Sector::ALL.into_iter().map(Sector::as_str).collect();
    let string_list = json!({"type": "array", "items": {"type": "string"}});
    let number_map = json!({"type": "object", "additionalProperties": {"type": "number"}});
    match tool {
        ToolName::EvaluateTradePosition => {
            object(&json!({"country": {"type": "string"}}), &["country"])
        }
        ToolName::CalculateTariffImpact => object(
            &json!({
                "country": {"type": "string"},
                "target_good": {"type": "string", "enum": sectors},
                "rate": {"type": "number"},
            }),
            &["country", "target_good", "rate"],
        ),
        ToolName::ProposePolicyAction => object(
            &json!({
                "action_type": {"type": "string"},
                "params": {"type": "object"},
            }),
            &["action_type"],
        ),
        ToolName::AssessRetaliationRisk => object(&json!({"rate": {"type": "number"}}), &["rate"]),
        ToolName::MonitorTradeFlows => {
            object(&json!({"country_pair": string_list}), &["country_pair"])
        }
        ToolName::AnalyzeSupplyChains => object(
            &json!({"sector": {"type": "string", "enum": sectors}}),
            &["sector"],
        ),
        ToolName::PredictMarketImpact => object(
            &json!({"policy": {"type": "object", "properties": {"rate": {"type": "number"}}}}),
            &["policy"],
        ),
        ToolName::ModelGameStructure => {
            object(&json!({"scenario": {"type": "string"}}), &["scenario"])
        }
        ToolName::FindNashEquilibrium => object(
            &json!({
                "players": string_list,
                "strategies": {"type": "object"},
            }),
            &["players"],
        ),
        ToolName::PredictResponse => object(
            &json!({
                "action": {"type": "string"},
                "opponent": {"type": "string"},
            }),
            &["action", "opponent"],
        ),
        ToolName::DetectNegotiationWindow => {
            object(&json!({"welfare_losses": number_map}), &[])
        }
        ToolName::GenerateDealProposal => object(
            &json!({"countries": string_list, "issues": string_list}),
            &["countries", "issues"],
        ),
        ToolName::EvaluateConcessionValue => {
            object(&json!({"offer": {"type": "object"}}), &["offer"])
        }
        ToolName::ManageBargainingRound => object(
            &json!({"offers": {"type": "array", "items": {"type": "object"}}}),
            &["offers"],
        ),
        ToolName::GenerateWelfareReport => object(&json!({"countries": number_map}), &[]),
        ToolName::DetectEquilibrium => object(&json!({"state": number_map}), &[]),
        ToolName::TriggerEvent => {
            object(&json!({"event_type": {"type": "string"}}), &["event_type"])
        }
        ToolName::DetectPolicyChanges
        | ToolName::CalculatePayoffMatrix
        | ToolName::ExecuteSimulationRound => object(&json!({}), &[]),
    }
}

/// Tool definition in `OpenAI` function-calling format.
pub fn openai_tool(tool: ToolName) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.as_str(),
            "description": description(tool),
            "parameters": parameters(tool),
        }
    })
}

/// Tool definition in Anthropic Messages format.
pub fn anthropic_tool(tool: ToolName) -> Value {
    json!({
        "name": tool.as_str(),
        "description": description(tool),
        "input_schema": parameters(tool),
    })
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_has_an_object_schema() {
        for tool in ToolName::ALL {
            let schema = parameters(tool);
            assert_eq!(schema["type"], "object", "{tool}");
            assert!(schema["properties"].is_object(), "{tool}");
            assert!(!description(tool).is_empty());
        }
    }

    #[test]
    fn openai_and_anthropic_shapes() {
        let openai = openai_tool(ToolName::AssessRetaliationRisk);
        assert_eq!(openai["function"]["name"], "assess_retaliation_risk");
        assert_eq!(openai["function"]["parameters"]["required"][0], "rate");

        let anthropic = anthropic_tool(ToolName::CalculateTariffImpact);
        assert_eq!(anthropic["name"], "calculate_tariff_impact");
        assert_eq!(
            anthropic["input_schema"]["properties"]["target_good"]["enum"][0],
            "electronics"
        );
    }
}
