//! Denormalized documents written to the persistence boundary.
//!
//! The snapshot publisher folds bus history and world state into a
//! [`StateDocument`] once per period. The dashboard reads it (and the bare
//! event list) without ever touching the live simulation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentStatus, Sector};
use crate::structs::Event;

/// Economic fields of one country as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountryView {
    /// Gross domestic product.
    pub gdp: f64,
    /// Exports per sector.
    pub exports: BTreeMap<Sector, f64>,
    /// Imports per sector.
    pub imports: BTreeMap<Sector, f64>,
    /// Tariff rate per sector, within `[0, 0.5]`.
    pub tariffs: BTreeMap<Sector, f64>,
    /// Last assigned welfare index.
    pub welfare: f64,
    /// Domestic political pressure.
    pub political_pressure: f64,
    /// Narrative posture label.
    pub strategic_posture: String,
}

/// Learning metrics of the learning-enabled country agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LearningMetrics {
    /// Current aggression parameter.
    pub alpha_aggression: f64,
    /// Exponentially smoothed welfare delta.
    pub effectiveness_score: f64,
    /// Human-readable trend.
    pub note: String,
}

/// One entry of the policy timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimelineEntry {
    /// When the underlying event was produced.
    pub timestamp: DateTime<Utc>,
    /// Its title.
    pub label: String,
}

/// Health of the persistence side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemHealth {
    /// Active snapshot backend (`file` or `redis`).
    pub backend: String,
}

/// The full `state` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StateDocument {
    /// When the document was assembled.
    pub timestamp: DateTime<Utc>,
    /// Latest scenario phase.
    pub phase: String,
    /// Latest scenario round.
    pub round: u64,
    /// Latest strategic classification.
    pub classification: String,
    /// Learning agent metrics.
    pub learning: LearningMetrics,
    /// Per-country economic fields.
    pub countries: BTreeMap<String, CountryView>,
    /// Trade flow per sector.
    pub trade_flow: BTreeMap<Sector, f64>,
    /// Freshly computed welfare per country.
    pub welfare_impact: BTreeMap<String, f64>,
    /// Recent events, oldest first.
    pub events: Vec<Event>,
    /// Scenario, policy, and negotiation milestones.
    pub policy_timeline: Vec<TimelineEntry>,
    /// Status of every agent.
    pub agent_status: BTreeMap<String, AgentStatus>,
    /// Persistence backend health.
    pub system_health: SystemHealth,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn state_document_field_names_match_dashboard_contract() {
        let doc = StateDocument {
            timestamp: Utc::now(),
            phase: "Cold Start".to_owned(),
            round: 1,
            classification: "Repeated Game".to_owned(),
            learning: LearningMetrics {
                alpha_aggression: 0.55,
                effectiveness_score: 0.0,
                note: String::new(),
            },
            countries: BTreeMap::new(),
            trade_flow: BTreeMap::new(),
            welfare_impact: BTreeMap::new(),
            events: Vec::new(),
            policy_timeline: Vec::new(),
            agent_status: BTreeMap::new(),
            system_health: SystemHealth {
                backend: "file".to_owned(),
            },
        };
        let json = serde_json::to_value(&doc).unwrap();
        for key in [
            "timestamp",
            "phase",
            "round",
            "classification",
            "learning",
            "countries",
            "trade_flow",
            "welfare_impact",
            "events",
            "policy_timeline",
            "agent_status",
            "system_health",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["system_health"]["backend"], "file");
    }
}
