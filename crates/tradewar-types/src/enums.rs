//! Enumeration types for the trade-war simulation.
//!
//! Sectors, bus topics, agent status, reasoning modes, and the closed set of
//! analytical tool identifiers. Every enum serializes to the snake/lower-case
//! string the dashboard and the reasoning provider see on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::tools::ToolError;

// ---------------------------------------------------------------------------
// Sectors
// ---------------------------------------------------------------------------

/// An economic sector keying tariffs, imports, exports, and trade flow.
///
/// The set is fixed at compile time, which is what guarantees that every
/// country map and the trade-flow map share the same keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Sector {
    /// Consumer and industrial electronics.
    Electronics,
    /// Vehicles and parts.
    Automotive,
    /// Farm output.
    Agriculture,
    /// Fuel and power.
    Energy,
    /// General manufactured goods.
    Manufacturing,
}

impl Sector {
    /// Every sector, in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Electronics,
        Self::Automotive,
        Self::Agriculture,
        Self::Energy,
        Self::Manufacturing,
    ];

    /// Wire name of the sector.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Automotive => "automotive",
            Self::Agriculture => "agriculture",
            Self::Energy => "energy",
            Self::Manufacturing => "manufacturing",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sector| sector.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sector: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// A topic partitioning published events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Topic {
    /// Internal memo emitted at the end of every reasoning round.
    Thought,
    /// Tariff decisions by country agents.
    Policy,
    /// Sector exposure updates.
    Market,
    /// Strategic classification of the game.
    Strategy,
    /// Negotiation window assessments and proposals.
    Negotiation,
    /// Scenario phase transitions.
    Scenario,
}

impl Topic {
    /// Wire name of the topic.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thought => "thought",
            Self::Policy => "policy",
            Self::Market => "market",
            Self::Strategy => "strategy",
            Self::Negotiation => "negotiation",
            Self::Scenario => "scenario",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a mailbox is registered for: one topic, or every topic (`"*"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TopicFilter {
    /// Only events published on this topic.
    Exact(Topic),
    /// Every published event, regardless of topic.
    Wildcard,
}

impl TopicFilter {
    /// The reserved wildcard key.
    pub const WILDCARD: &'static str = "*";

    /// Whether an event on `topic` is delivered to this filter.
    pub fn matches(self, topic: Topic) -> bool {
        match self {
            Self::Exact(t) => t == topic,
            Self::Wildcard => true,
        }
    }
}

impl From<Topic> for TopicFilter {
    fn from(topic: Topic) -> Self {
        Self::Exact(topic)
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(topic) => f.write_str(topic.as_str()),
            Self::Wildcard => f.write_str(Self::WILDCARD),
        }
    }
}

impl FromStr for TopicFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            Self::WILDCARD => Ok(Self::Wildcard),
            "thought" => Ok(Self::Exact(Topic::Thought)),
            "policy" => Ok(Self::Exact(Topic::Policy)),
            "market" => Ok(Self::Exact(Topic::Market)),
            "strategy" => Ok(Self::Exact(Topic::Strategy)),
            "negotiation" => Ok(Self::Exact(Topic::Negotiation)),
            "scenario" => Ok(Self::Exact(Topic::Scenario)),
            other => Err(format!("unknown topic: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent status and reasoning mode
// ---------------------------------------------------------------------------

/// Whether an agent is between rounds or inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AgentStatus {
    /// Sleeping between rounds or draining its inbox.
    #[default]
    Idle,
    /// Observing, reasoning, or acting.
    Working,
}

/// Which path produced a reasoning result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ReasoningMode {
    /// The network-backed reasoning provider answered.
    Provider,
    /// The deterministic heuristic answered (configured, or timeout fallback).
    Heuristic,
}

impl ReasoningMode {
    /// Label for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Heuristic => "heuristic",
        }
    }
}

// ---------------------------------------------------------------------------
// Tool identifiers
// ---------------------------------------------------------------------------

/// The closed catalogue of analytical tools an agent may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ToolName {
    /// Trade balance, import exposure, and average tariff for a country.
    EvaluateTradePosition,
    /// Surplus and revenue effects of a tariff on one good.
    CalculateTariffImpact,
    /// Echo a structured policy proposal.
    ProposePolicyAction,
    /// Probability of retaliation at a given tariff rate.
    AssessRetaliationRisk,
    /// Current trade flow for a country pair.
    MonitorTradeFlows,
    /// Recent policy-topic events from the bus history.
    DetectPolicyChanges,
    /// Supply-chain stress index for a sector.
    AnalyzeSupplyChains,
    /// Inflation and equity drawdown risk for a tariff policy.
    PredictMarketImpact,
    /// Classify the game being played.
    ModelGameStructure,
    /// Equilibrium for a set of players.
    FindNashEquilibrium,
    /// Likely opponent response to an action.
    PredictResponse,
    /// Cooperate/defect payoff matrix.
    CalculatePayoffMatrix,
    /// Whether a zone of possible agreement exists.
    DetectNegotiationWindow,
    /// Phased rollback deal proposal.
    GenerateDealProposal,
    /// Value and risk of a concession offer.
    EvaluateConcessionValue,
    /// Advance a bargaining round over offers.
    ManageBargainingRound,
    /// Recompute trade flow and return the welfare map.
    ExecuteSimulationRound,
    /// Rounded welfare report.
    GenerateWelfareReport,
    /// Whether welfare values have converged.
    DetectEquilibrium,
    /// Acknowledge a scenario trigger.
    TriggerEvent,
}

impl ToolName {
    /// Every tool, in catalogue order.
    pub const ALL: [Self; 20] = [
        Self::EvaluateTradePosition,
        Self::CalculateTariffImpact,
        Self::ProposePolicyAction,
        Self::AssessRetaliationRisk,
        Self::MonitorTradeFlows,
        Self::DetectPolicyChanges,
        Self::AnalyzeSupplyChains,
        Self::PredictMarketImpact,
        Self::ModelGameStructure,
        Self::FindNashEquilibrium,
        Self::PredictResponse,
        Self::CalculatePayoffMatrix,
        Self::DetectNegotiationWindow,
        Self::GenerateDealProposal,
        Self::EvaluateConcessionValue,
        Self::ManageBargainingRound,
        Self::ExecuteSimulationRound,
        Self::GenerateWelfareReport,
        Self::DetectEquilibrium,
        Self::TriggerEvent,
    ];

    /// Wire name of the tool.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EvaluateTradePosition => "evaluate_trade_position",
            Self::CalculateTariffImpact => "calculate_tariff_impact",
            Self::ProposePolicyAction => "propose_policy_action",
            Self::AssessRetaliationRisk => "assess_retaliation_risk",
            Self::MonitorTradeFlows => "monitor_trade_flows",
            Self::DetectPolicyChanges => "detect_policy_changes",
            Self::AnalyzeSupplyChains => "analyze_supply_chains",
            Self::PredictMarketImpact => "predict_market_impact",
            Self::ModelGameStructure => "model_game_structure",
            Self::FindNashEquilibrium => "find_nash_equilibrium",
            Self::PredictResponse => "predict_response",
            Self::CalculatePayoffMatrix => "calculate_payoff_matrix",
            Self::DetectNegotiationWindow => "detect_negotiation_window",
            Self::GenerateDealProposal => "generate_deal_proposal",
            Self::EvaluateConcessionValue => "evaluate_concession_value",
            Self::ManageBargainingRound => "manage_bargaining_round",
            Self::ExecuteSimulationRound => "execute_simulation_round",
            Self::GenerateWelfareReport => "generate_welfare_report",
            Self::DetectEquilibrium => "detect_equilibrium",
            Self::TriggerEvent => "trigger_event",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_round_trip_through_from_str() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
    }

    #[test]
    fn unknown_tool_name_is_rejected() {
        let err = "launch_missiles".parse::<ToolName>().unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "launch_missiles"));
    }

    #[test]
    fn tool_serde_matches_wire_name() {
        let json = serde_json::to_string(&ToolName::AssessRetaliationRisk).unwrap();
        assert_eq!(json, "\"assess_retaliation_risk\"");
    }

    #[test]
    fn wildcard_filter_parses_and_matches_everything() {
        let filter: TopicFilter = "*".parse().unwrap();
        assert_eq!(filter, TopicFilter::Wildcard);
        assert!(filter.matches(Topic::Policy));
        assert!(filter.matches(Topic::Thought));
    }

    #[test]
    fn exact_filter_matches_only_its_topic() {
        let filter: TopicFilter = "policy".parse().unwrap();
        assert!(filter.matches(Topic::Policy));
        assert!(!filter.matches(Topic::Market));
        assert!("tariffs".parse::<TopicFilter>().is_err());
    }

    #[test]
    fn sector_parsing_is_case_insensitive() {
        assert_eq!("Electronics".parse::<Sector>().unwrap(), Sector::Electronics);
        assert!("textiles".parse::<Sector>().is_err());
    }

    #[test]
    fn sector_map_keys_serialize_as_strings() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Sector::Energy, 1.5_f64);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"energy":1.5}"#);
    }
}
