//! Per-country economic state.
//!
//! [`CountryState`] keeps its maps private so the two invariants hold after
//! every call: each map carries exactly the fixed sector set, and every
//! tariff lies in `[MIN_TARIFF, MAX_TARIFF]`.

use std::collections::BTreeMap;

use serde::Serialize;
use tradewar_types::{CountryView, Sector};

use crate::analysis::round_to;

/// Lowest tariff rate a sector can carry.
pub const MIN_TARIFF: f64 = 0.0;

/// Highest tariff rate a sector can carry.
pub const MAX_TARIFF: f64 = 0.5;

/// Imports and exports never drift below this volume.
pub const FLOW_FLOOR: f64 = 20.0;

/// Clamp a requested tariff rate into the legal band. `NaN` maps to zero.
pub fn clamp_tariff(rate: f64) -> f64 {
    if rate.is_nan() {
        return MIN_TARIFF;
    }
    rate.clamp(MIN_TARIFF, MAX_TARIFF)
}

/// Economic state of one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryState {
    name: String,
    gdp: f64,
    exports: BTreeMap<Sector, f64>,
    imports: BTreeMap<Sector, f64>,
    tariffs: BTreeMap<Sector, f64>,
    welfare: f64,
    political_pressure: f64,
    strategic_posture: String,
}

impl CountryState {
    /// Create a country with a uniform tariff across sectors.
    ///
    /// `exports` and `imports` are evaluated once per sector, so the maps
    /// always cover the full sector set.
    pub fn new(
        name: impl Into<String>,
        gdp: f64,
        exports: impl Fn(Sector) -> f64,
        imports: impl Fn(Sector) -> f64,
        tariff: f64,
    ) -> Self {
        let rate = clamp_tariff(tariff);
        Self {
            name: name.into(),
            gdp,
            exports: Sector::ALL.into_iter().map(|s| (s, exports(s))).collect(),
            imports: Sector::ALL.into_iter().map(|s| (s, imports(s))).collect(),
            tariffs: Sector::ALL.into_iter().map(|s| (s, rate)).collect(),
            welfare: 100.0,
            political_pressure: 0.5,
            strategic_posture: String::from("Neutral"),
        }
    }

    /// Set the political pressure and posture label.
    #[must_use]
    pub fn with_politics(mut self, pressure: f64, posture: impl Into<String>) -> Self {
        self.political_pressure = pressure;
        self.strategic_posture = posture.into();
        self
    }

    /// Country name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gross domestic product.
    pub const fn gdp(&self) -> f64 {
        self.gdp
    }

    /// Exports per sector.
    pub const fn exports(&self) -> &BTreeMap<Sector, f64> {
        &self.exports
    }

    /// Imports per sector.
    pub const fn imports(&self) -> &BTreeMap<Sector, f64> {
        &self.imports
    }

    /// Tariff rate per sector.
    pub const fn tariffs(&self) -> &BTreeMap<Sector, f64> {
        &self.tariffs
    }

    /// Tariff rate on one sector.
    pub fn tariff(&self, sector: Sector) -> f64 {
        self.tariffs.get(&sector).copied().unwrap_or(MIN_TARIFF)
    }

    /// Import volume of one sector.
    pub fn import_volume(&self, sector: Sector) -> f64 {
        self.imports.get(&sector).copied().unwrap_or(0.0)
    }

    /// Last assigned welfare index.
    pub const fn welfare(&self) -> f64 {
        self.welfare
    }

    /// Domestic political pressure.
    pub const fn political_pressure(&self) -> f64 {
        self.political_pressure
    }

    /// Narrative posture label.
    pub fn strategic_posture(&self) -> &str {
        &self.strategic_posture
    }

    /// Sum of all sector tariffs.
    pub fn total_tariffs(&self) -> f64 {
        self.tariffs.values().sum()
    }

    /// Sum of all sector imports.
    pub fn total_imports(&self) -> f64 {
        self.imports.values().sum()
    }

    /// Sum of all sector exports.
    pub fn total_exports(&self) -> f64 {
        self.exports.values().sum()
    }

    /// Set a sector tariff, clamped to the legal band. Returns the stored rate.
    pub fn set_tariff(&mut self, sector: Sector, rate: f64) -> f64 {
        let clamped = clamp_tariff(rate);
        self.tariffs.insert(sector, clamped);
        clamped
    }

    /// Decay imports and exports by each sector's tariff rate.
    pub(crate) fn drift(&mut self) {
        for (sector, volume) in &mut self.imports {
            let tariff = self.tariffs.get(sector).copied().unwrap_or(0.05);
            *volume = round_to((*volume * (1.0 - tariff * 0.01)).max(FLOW_FLOOR), 2);
        }
        for (sector, volume) in &mut self.exports {
            let tariff = self.tariffs.get(sector).copied().unwrap_or(0.05);
            *volume = round_to((*volume * (1.0 - tariff * 0.008)).max(FLOW_FLOOR), 2);
        }
    }

    pub(crate) const fn assign_welfare(&mut self, welfare: f64) {
        self.welfare = welfare;
    }

    /// Published view of this country.
    pub fn view(&self) -> CountryView {
        CountryView {
            gdp: self.gdp,
            exports: self.exports.clone(),
            imports: self.imports.clone(),
            tariffs: self.tariffs.clone(),
            welfare: self.welfare,
            political_pressure: self.political_pressure,
            strategic_posture: self.strategic_posture.clone(),
        }
    }
}
