//! Pure economic formulas behind the analyst tool catalogue.
//!
//! Every function here either takes plain values or reads a borrowed
//! [`WorldState`]; none of them mutates anything. The agent toolbox parses
//! tool arguments, calls into this module, and serializes the typed result
//! back to the reasoning provider.
//!
//! Values are rounded to two decimals unless a function says otherwise.

use std::collections::BTreeMap;

use serde::Serialize;
use tradewar_types::Sector;

use crate::country::CountryState;

/// Welfare below this level opens a negotiation window.
pub const NEGOTIATION_WELFARE_THRESHOLD: f64 = 95.0;

/// Welfare spread below this level counts as equilibrium.
pub const EQUILIBRIUM_SPREAD: f64 = 1.5;

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Convert a collection length to `f64` for averaging.
pub fn count_as_f64(len: usize) -> f64 {
    // Collection sizes here are tiny; precision loss is not reachable.
    #[allow(clippy::cast_precision_loss)]
    let count = len as f64;
    count
}

// ---------------------------------------------------------------------------
// Country strategy
// ---------------------------------------------------------------------------

/// Result of `evaluate_trade_position`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradePosition {
    /// Total exports minus total imports.
    pub trade_balance: f64,
    /// Total imports.
    pub import_exposure: f64,
    /// Mean tariff across sectors, three decimals.
    pub average_tariff: f64,
}

/// Summarize a country's trade balance and tariff level.
pub fn trade_position(country: &CountryState) -> TradePosition {
    let sectors = count_as_f64(country.tariffs().len()).max(1.0);
    TradePosition {
        trade_balance: round_to(country.total_exports() - country.total_imports(), 2),
        import_exposure: round_to(country.total_imports(), 2),
        average_tariff: round_to(country.total_tariffs() / sectors, 3),
    }
}

/// Result of `calculate_tariff_impact`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffImpact {
    /// Lost consumer surplus (negative).
    pub consumer_surplus_change: f64,
    /// Gained producer surplus.
    pub producer_surplus_change: f64,
    /// Tariff revenue collected.
    pub government_revenue: f64,
    /// Consumer change net of producer gain and revenue.
    pub deadweight_loss: f64,
}

/// Partial-equilibrium impact of a tariff on one import volume.
pub fn tariff_impact(import_volume: f64, rate: f64) -> TariffImpact {
    let consumer = -(import_volume * rate);
    let producer = import_volume * rate * 0.5;
    let revenue = import_volume * rate * 0.7;
    TariffImpact {
        consumer_surplus_change: round_to(consumer, 2),
        producer_surplus_change: round_to(producer, 2),
        government_revenue: round_to(revenue, 2),
        deadweight_loss: round_to(consumer - producer - revenue, 2),
    }
}

/// Result of `assess_retaliation_risk`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetaliationRisk {
    /// Probability-like score in `[0.4, 1.0]`.
    pub retaliation_risk: f64,
}

/// Retaliation risk for a tariff `rate`: `min(1, 0.4 + 1.2 * rate)`.
pub fn retaliation_risk(rate: f64) -> RetaliationRisk {
    RetaliationRisk {
        retaliation_risk: round_to(rate.mul_add(1.2, 0.4).min(1.0), 2),
    }
}

// ---------------------------------------------------------------------------
// Market intelligence
// ---------------------------------------------------------------------------

/// Result of `analyze_supply_chains`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyChainStress {
    /// Sector analyzed.
    pub sector: Sector,
    /// `0.35 + flow / 20`.
    pub stress_index: f64,
}

/// Supply-chain stress for a sector given its current trade flow.
pub fn supply_chain_stress(sector: Sector, flow: Option<f64>) -> SupplyChainStress {
    SupplyChainStress {
        sector,
        stress_index: round_to(0.35 + flow.unwrap_or(1.0) / 20.0, 2),
    }
}

/// Result of `predict_market_impact`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketImpact {
    /// `min(1, 0.2 + 2.4 * rate)`.
    pub inflation_risk: f64,
    /// `min(1, 0.1 + 1.6 * rate)`.
    pub equity_drawdown: f64,
}

/// Market reaction to a tariff `rate`.
pub fn market_impact(rate: f64) -> MarketImpact {
    MarketImpact {
        inflation_risk: round_to(rate.mul_add(2.4, 0.2).min(1.0), 2),
        equity_drawdown: round_to(rate.mul_add(1.6, 0.1).min(1.0), 2),
    }
}

// ---------------------------------------------------------------------------
// Game theory
// ---------------------------------------------------------------------------

/// Result of `model_game_structure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStructure {
    /// Scenario description as supplied.
    pub scenario: String,
    /// `Repeated Game` or `Prisoner's Dilemma`.
    pub structure: String,
}

/// Classify a scenario description.
pub fn game_structure(scenario: &str) -> GameStructure {
    let structure = if scenario.contains("repeat") {
        "Repeated Game"
    } else {
        "Prisoner's Dilemma"
    };
    GameStructure {
        scenario: scenario.to_owned(),
        structure: structure.to_owned(),
    }
}

/// Result of `find_nash_equilibrium`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NashEquilibrium {
    /// The equilibrium strategy profile.
    pub equilibrium: String,
    /// Comma-joined player names.
    pub players: String,
}

/// Equilibrium of the tariff game; always mutual de-escalation.
pub fn nash_equilibrium(players: &[String]) -> NashEquilibrium {
    NashEquilibrium {
        equilibrium: "mutual_deescalation".to_owned(),
        players: players.join(","),
    }
}

/// Result of `predict_response`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictedResponse {
    /// Opponent whose response is predicted.
    pub opponent: String,
    /// `proportional_retaliation` or `wait`.
    pub likely_response: String,
}

/// Predict how `opponent` answers `action`.
pub fn predicted_response(action: &str, opponent: &str) -> PredictedResponse {
    let likely = if action.contains("tariff") {
        "proportional_retaliation"
    } else {
        "wait"
    };
    PredictedResponse {
        opponent: opponent.to_owned(),
        likely_response: likely.to_owned(),
    }
}

/// Two-player payoff matrix keyed by own move, then opponent move.
pub type PayoffMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// The symmetric cooperate/defect payoff matrix.
pub fn payoff_matrix() -> PayoffMatrix {
    let row = |cooperate: f64, defect: f64| {
        BTreeMap::from([
            ("Cooperate".to_owned(), cooperate),
            ("Defect".to_owned(), defect),
        ])
    };
    BTreeMap::from([
        ("Cooperate".to_owned(), row(3.0, 1.0)),
        ("Defect".to_owned(), row(4.0, 2.0)),
    ])
}

// ---------------------------------------------------------------------------
// Negotiation
// ---------------------------------------------------------------------------

/// Whether any country's welfare has dropped below the negotiation threshold.
///
/// An empty map never opens a window.
pub fn negotiation_window(welfare: &BTreeMap<String, f64>) -> bool {
    welfare
        .values()
        .copied()
        .reduce(f64::min)
        .is_some_and(|lowest| lowest < NEGOTIATION_WELFARE_THRESHOLD)
}

/// Phased rollback schedule attached to every deal proposal.
pub const ROLLBACK_SCHEDULE: [&str; 3] = ["30% immediate", "40% after review", "30% after 90 days"];

/// Result of `generate_deal_proposal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealProposal {
    /// Parties to the deal.
    pub countries: Vec<String>,
    /// Issues on the table.
    pub issues: Vec<String>,
    /// Tariff rollback tranches.
    pub rollback_schedule: Vec<String>,
}

/// Draft a phased-rollback deal.
pub fn deal_proposal(countries: Vec<String>, issues: Vec<String>) -> DealProposal {
    DealProposal {
        countries,
        issues,
        rollback_schedule: ROLLBACK_SCHEDULE.iter().map(|s| (*s).to_owned()).collect(),
    }
}

/// Result of `evaluate_concession_value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcessionValue {
    /// Expected value of accepting.
    pub value_score: f64,
    /// Risk of accepting.
    pub risk_score: f64,
}

/// Score a concession offer.
pub const fn concession_value() -> ConcessionValue {
    ConcessionValue {
        value_score: 0.62,
        risk_score: 0.38,
    }
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// Round every welfare value to two decimals.
pub fn welfare_report(welfare: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    welfare
        .iter()
        .map(|(name, value)| (name.clone(), round_to(*value, 2)))
        .collect()
}

/// Whether welfare across countries has converged.
///
/// An empty map is never in equilibrium.
pub fn equilibrium(welfare: &BTreeMap<String, f64>) -> bool {
    let mut values = welfare.values().copied();
    let Some(first) = values.next() else {
        return false;
    };
    let (low, high) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    high - low < EQUILIBRIUM_SPREAD
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn welfare(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn retaliation_risk_at_eight_percent() {
        assert!(close(retaliation_risk(0.08).retaliation_risk, 0.50));
    }

    #[test]
    fn retaliation_risk_caps_at_one() {
        assert!(close(retaliation_risk(0.5).retaliation_risk, 1.0));
    }

    #[test]
    fn negotiation_window_opens_below_threshold() {
        assert!(negotiation_window(&welfare(&[("A", 90.0), ("B", 97.0)])));
        assert!(!negotiation_window(&welfare(&[("A", 96.0), ("B", 97.0)])));
        assert!(!negotiation_window(&BTreeMap::new()));
    }

    #[test]
    fn equilibrium_requires_narrow_spread() {
        assert!(equilibrium(&welfare(&[("A", 99.0), ("B", 100.0)])));
        assert!(!equilibrium(&welfare(&[("A", 97.0), ("B", 100.0)])));
        assert!(!equilibrium(&BTreeMap::new()));
    }

    #[test]
    fn tariff_impact_splits_surplus() {
        let impact = tariff_impact(100.0, 0.1);
        assert!(close(impact.consumer_surplus_change, -10.0));
        assert!(close(impact.producer_surplus_change, 5.0));
        assert!(close(impact.government_revenue, 7.0));
        assert!(close(impact.deadweight_loss, -22.0));
    }

    #[test]
    fn market_impact_scales_with_rate() {
        let impact = market_impact(0.1);
        assert!(close(impact.inflation_risk, 0.44));
        assert!(close(impact.equity_drawdown, 0.26));
    }

    #[test]
    fn supply_chain_stress_defaults_missing_flow() {
        assert!(close(supply_chain_stress(Sector::Energy, None).stress_index, 0.4));
        assert!(close(supply_chain_stress(Sector::Energy, Some(8.0)).stress_index, 0.75));
    }

    #[test]
    fn game_structure_and_response() {
        assert_eq!(game_structure("repeat").structure, "Repeated Game");
        assert_eq!(game_structure("one-shot").structure, "Prisoner's Dilemma");
        assert_eq!(
            predicted_response("raise tariff", "Beta").likely_response,
            "proportional_retaliation"
        );
        assert_eq!(predicted_response("hold", "Beta").likely_response, "wait");
    }

    #[test]
    fn payoff_matrix_rewards_unilateral_defection() {
        let matrix = payoff_matrix();
        let defect = matrix.get("Defect").unwrap();
        assert!(close(*defect.get("Cooperate").unwrap(), 4.0));
    }

    #[test]
    fn round_to_handles_places() {
        assert!(close(round_to(1.23456, 2), 1.23));
        assert!(close(round_to(1.23456, 3), 1.235));
    }
}
