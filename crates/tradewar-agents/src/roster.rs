//! The standing roster of seven agents.

use std::collections::BTreeSet;

use tradewar_core::SimulationConfig;
use tradewar_world::{ALPHA, BETA, GAMMA};

use crate::error::AgentError;
use crate::policy::{AgentKind, CountryPolicy, ScenarioPolicy};
use crate::runtime::{Agent, AgentDeps, AgentSettings};

/// The learning country agent, whose metrics the snapshot reports.
pub const ALPHA_AGENT: &str = "Country Strategy Agent (Alpha)";
/// Country agent for Beta.
pub const BETA_AGENT: &str = "Country Strategy Agent (Beta)";
/// Country agent for Gamma.
pub const GAMMA_AGENT: &str = "Country Strategy Agent (Gamma)";
/// Market analyst.
pub const MARKET_AGENT: &str = "Market Intelligence Agent";
/// Game theorist.
pub const GAME_THEORY_AGENT: &str = "Game Theory & Strategy Agent";
/// Negotiator.
pub const NEGOTIATION_AGENT: &str = "Negotiation & Resolution Agent";
/// Scenario driver.
pub const SCENARIO_AGENT: &str = "Scenario Execution Agent";

/// Names and kinds of the standing roster, in start order.
pub fn roster_kinds() -> Vec<(&'static str, AgentKind)> {
    vec![
        (ALPHA_AGENT, AgentKind::Country(CountryPolicy::new(ALPHA, true))),
        (BETA_AGENT, AgentKind::Country(CountryPolicy::new(BETA, false))),
        (GAMMA_AGENT, AgentKind::Country(CountryPolicy::new(GAMMA, false))),
        (MARKET_AGENT, AgentKind::MarketIntelligence),
        (GAME_THEORY_AGENT, AgentKind::GameTheory),
        (NEGOTIATION_AGENT, AgentKind::Negotiation),
        (SCENARIO_AGENT, AgentKind::Scenario(ScenarioPolicy::new())),
    ]
}

/// Loop settings for `kind` under `config`.
pub fn settings_for(kind: &AgentKind, config: &SimulationConfig) -> AgentSettings {
    AgentSettings {
        decision_timeout: config.simulation.decision_timeout(),
        idle: kind.idle(&config.agents),
        memory_capacity: config.simulation.memory_capacity,
        tool_history_limit: config.simulation.tool_history_limit,
    }
}

/// Build agents for `kinds`, checking names are unique and every steered
/// country exists.
pub fn build_agents(
    kinds: Vec<(&str, AgentKind)>,
    deps: &AgentDeps,
    config: &SimulationConfig,
) -> Result<Vec<Agent>, AgentError> {
    let mut seen = BTreeSet::new();
    let mut agents = Vec::with_capacity(kinds.len());
    for (name, kind) in kinds {
        if !seen.insert(name.to_owned()) {
            return Err(AgentError::DuplicateName(name.to_owned()));
        }
        if let AgentKind::Country(policy) = &kind {
            deps.world.read(|w| w.country(policy.country()).map(|_| ()))?;
        }
        let settings = settings_for(&kind, config);
        agents.push(Agent::new(name, kind, deps.clone(), settings));
    }
    Ok(agents)
}

/// Build the standing roster.
pub fn build_roster(deps: &AgentDeps, config: &SimulationConfig) -> Result<Vec<Agent>, AgentError> {
    build_agents(roster_kinds(), deps, config)
}
