//! Analyst policies: market intelligence, game theory, negotiation.
//!
//! These agents never touch the world. Each turns its round's tool results
//! into one briefing event with a fixed narrative memo.

use serde_json::json;
use tradewar_types::{Event, Payload, ToolName, Topic, payload_from};
use tradewar_world::SharedWorld;

use crate::tools::ToolResults;

/// Strategic classification published by the game theory agent.
pub const CLASSIFICATION: &str = "Repeated Game";

/// Market exposure briefing.
pub fn market_briefing(source: &str, world: &SharedWorld, results: &ToolResults) -> Event {
    let trade_flow = world.read(|w| w.trade_flow().clone());
    Event::new(
        source,
        Topic::Market,
        "Sector exposure update",
        "Electronics sector experiencing compounding tariff shock; downstream inflation risk rising.",
        payload_from(json!({
            "trade_flow": trade_flow,
            "market_impact": results.json(ToolName::PredictMarketImpact),
            "supply_chain": results.json(ToolName::AnalyzeSupplyChains),
        })),
    )
}

/// Strategic classification briefing.
pub fn strategy_briefing(source: &str, results: &ToolResults) -> Event {
    Event::new(
        source,
        Topic::Strategy,
        "Strategic classification",
        "Scenario classified as Repeated Game; escalation risk elevated. \
         Recommend calibrated de-escalation with conditional rollback.",
        payload_from(json!({
            "classification": CLASSIFICATION,
            "payoff_matrix": results.json(ToolName::CalculatePayoffMatrix),
            "equilibrium": results.json(ToolName::FindNashEquilibrium),
        })),
    )
}

/// Negotiation briefing: a proposal when a window is open, a hold otherwise.
pub fn negotiation_briefing(source: &str, results: &ToolResults) -> Event {
    if results.negotiation_window().unwrap_or(false) {
        Event::new(
            source,
            Topic::Negotiation,
            "Negotiation window opened",
            "ZOPA detected. Propose phased rollback: 30% immediate, 40% after review, \
             30% after 90-day stability window.",
            payload_from(json!({"proposal": results.json(ToolName::GenerateDealProposal)})),
        )
    } else {
        Event::new(
            source,
            Topic::Negotiation,
            "Negotiation assessment",
            "No credible ZOPA; hold position while signaling limited rollback capacity.",
            Payload::new(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use tradewar_world::analysis;
    use tradewar_world::build_world;

    use super::*;
    use crate::tools::{NegotiationWindow, ToolOutput};

    #[test]
    fn market_briefing_embeds_trade_flow_and_empty_results() {
        let world = SharedWorld::new(build_world());
        let event = market_briefing("Market Intelligence Agent", &world, &ToolResults::default());
        assert_eq!(event.topic(), Topic::Market);
        assert_eq!(event.field("market_impact").unwrap(), &json!({}));
        assert!(event.field("trade_flow").unwrap()["energy"].is_number());
    }

    #[test]
    fn strategy_briefing_carries_payoffs() {
        let mut results = ToolResults::default();
        results.record(
            ToolName::CalculatePayoffMatrix,
            ToolOutput::PayoffMatrix(analysis::payoff_matrix()),
        );
        let event = strategy_briefing("Game Theory & Strategy Agent", &results);
        assert_eq!(event.field("classification").unwrap(), CLASSIFICATION);
        assert_eq!(event.field("payoff_matrix").unwrap()["Defect"]["Cooperate"], 4.0);
        assert!(event.memo().contains("de-escalation"));
    }

    #[test]
    fn negotiation_depends_on_window() {
        let closed = negotiation_briefing("N", &ToolResults::default());
        assert_eq!(closed.title(), "Negotiation assessment");
        assert!(closed.payload().is_empty());

        let mut results = ToolResults::default();
        results.record(
            ToolName::DetectNegotiationWindow,
            ToolOutput::NegotiationWindow(NegotiationWindow { window: true }),
        );
        results.record(
            ToolName::GenerateDealProposal,
            ToolOutput::DealProposal(analysis::deal_proposal(
                vec!["Country Alpha".to_owned()],
                vec!["electronics".to_owned()],
            )),
        );
        let open = negotiation_briefing("N", &results);
        assert_eq!(open.title(), "Negotiation window opened");
        assert_eq!(
            open.field("proposal").unwrap()["rollback_schedule"][0],
            "30% immediate"
        );
    }
}
