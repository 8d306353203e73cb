//! Agent kinds and their action policies.
//!
//! Kinds differ only in the tools they declare, the topics they subscribe
//! to, how they observe, and how a round's tool results become events.
//! Everything else about the loop is shared (see [`crate::runtime`]).
//!
//! - [`country`] -- Tariff escalation and rollback, optional learning
//! - [`analysts`] -- Market, game theory, and negotiation briefings
//! - [`scenario`] -- The six-phase scenario cycle

pub mod analysts;
pub mod country;
pub mod scenario;

use std::time::Duration;

use tradewar_core::config::AgentTiming;
use tradewar_types::{Event, ToolName, Topic};
use tradewar_world::{SharedWorld, WorldState};

use crate::context::AgentContext;
use crate::error::AgentError;
use crate::tools::ToolResults;

pub use country::CountryPolicy;
pub use scenario::ScenarioPolicy;

const COUNTRY_TOOLS: [ToolName; 4] = [
    ToolName::EvaluateTradePosition,
    ToolName::CalculateTariffImpact,
    ToolName::ProposePolicyAction,
    ToolName::AssessRetaliationRisk,
];

const MARKET_TOOLS: [ToolName; 4] = [
    ToolName::MonitorTradeFlows,
    ToolName::DetectPolicyChanges,
    ToolName::AnalyzeSupplyChains,
    ToolName::PredictMarketImpact,
];

const GAME_THEORY_TOOLS: [ToolName; 4] = [
    ToolName::ModelGameStructure,
    ToolName::FindNashEquilibrium,
    ToolName::PredictResponse,
    ToolName::CalculatePayoffMatrix,
];

const NEGOTIATION_TOOLS: [ToolName; 4] = [
    ToolName::DetectNegotiationWindow,
    ToolName::GenerateDealProposal,
    ToolName::EvaluateConcessionValue,
    ToolName::ManageBargainingRound,
];

const SCENARIO_TOOLS: [ToolName; 4] = [
    ToolName::ExecuteSimulationRound,
    ToolName::GenerateWelfareReport,
    ToolName::DetectEquilibrium,
    ToolName::TriggerEvent,
];

/// Learning metrics reported by a learning country agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningSignal {
    /// Current aggression.
    pub aggression: f64,
    /// Smoothed welfare delta.
    pub effectiveness_score: f64,
}

/// The closed set of agent kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentKind {
    /// Steers one country's electronics tariff.
    Country(CountryPolicy),
    /// Reports sector exposure and market impact.
    MarketIntelligence,
    /// Classifies the strategic game.
    GameTheory,
    /// Watches for a negotiation window and drafts deals.
    Negotiation,
    /// Drives the scenario phase cycle.
    Scenario(ScenarioPolicy),
}

impl AgentKind {
    /// Tools this kind may call.
    pub const fn declared_tools(&self) -> &'static [ToolName] {
        match self {
            Self::Country(_) => &COUNTRY_TOOLS,
            Self::MarketIntelligence => &MARKET_TOOLS,
            Self::GameTheory => &GAME_THEORY_TOOLS,
            Self::Negotiation => &NEGOTIATION_TOOLS,
            Self::Scenario(_) => &SCENARIO_TOOLS,
        }
    }

    /// Topics this kind subscribes to. The scenario agent reads no inbox.
    pub const fn topics(&self) -> &'static [Topic] {
        match self {
            Self::Country(_) => &[Topic::Policy, Topic::Market, Topic::Strategy, Topic::Negotiation],
            Self::MarketIntelligence | Self::GameTheory => &[Topic::Policy, Topic::Scenario],
            Self::Negotiation => &[Topic::Policy, Topic::Strategy, Topic::Scenario],
            Self::Scenario(_) => &[],
        }
    }

    /// Sleep between rounds.
    pub const fn idle(&self, timing: &AgentTiming) -> Duration {
        let millis = match self {
            Self::Country(_) => timing.country_idle_ms,
            Self::MarketIntelligence | Self::GameTheory | Self::Negotiation => {
                timing.analyst_idle_ms
            }
            Self::Scenario(_) => timing.scenario_idle_ms,
        };
        Duration::from_millis(millis)
    }

    /// Build the observation string for reasoning.
    ///
    /// A pure projection of the context and the world.
    pub fn observe(&self, ctx: &AgentContext, world: &WorldState) -> String {
        if let Self::Scenario(scenario) = self {
            return scenario.observation();
        }
        let recent: Vec<_> = ctx.recent_memory(3).collect();
        let tariffs: Vec<String> = world
            .countries()
            .iter()
            .map(|(name, c)| {
                let rates = serde_json::to_string(c.tariffs()).unwrap_or_default();
                format!("{name}: {rates}")
            })
            .collect();
        format!(
            "Recent events: {}\nWelfare snapshot: {}\nTariffs: {{{}}}",
            serde_json::to_string(&recent).unwrap_or_default(),
            serde_json::to_string(&world.compute_welfare()).unwrap_or_default(),
            tariffs.join(", "),
        )
    }

    /// Turn a round's tool results and memo into outgoing events.
    ///
    /// Country agents also set their tariff on the shared world.
    pub fn advance(
        &mut self,
        ctx: &mut AgentContext,
        world: &SharedWorld,
        results: &ToolResults,
        memo: String,
    ) -> Result<Vec<Event>, AgentError> {
        let events = match self {
            Self::Country(policy) => return policy.advance(ctx, world, results, memo),
            Self::MarketIntelligence => analysts::market_briefing(ctx.name(), world, results),
            Self::GameTheory => analysts::strategy_briefing(ctx.name(), results),
            Self::Negotiation => analysts::negotiation_briefing(ctx.name(), results),
            Self::Scenario(scenario) => scenario.advance(ctx.name(), results),
        };
        Ok(vec![events])
    }

    /// Learning metrics, for learning country agents only.
    pub fn learning(&self) -> Option<LearningSignal> {
        match self {
            Self::Country(policy) if policy.is_learning() => Some(LearningSignal {
                aggression: policy.aggression(),
                effectiveness_score: policy.effectiveness_score(),
            }),
            _ => None,
        }
    }
}
