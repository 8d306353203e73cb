//! The shared economic model and its transition functions.
//!
//! [`WorldState`] owns every country plus the per-sector trade flow. All
//! mutators are deterministic given their inputs; the only time-dependent
//! one, [`WorldState::gravity_trade_flow`], takes the clock reading as an
//! argument.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use tradewar_types::{CountryView, Sector};

use crate::analysis::{count_as_f64, round_to};
use crate::country::CountryState;
use crate::error::WorldError;

/// Seconds since the Unix epoch, the clock input of the gravity model.
#[allow(clippy::cast_precision_loss)]
pub fn epoch_seconds(now: DateTime<Utc>) -> f64 {
    now.timestamp_millis() as f64 / 1000.0
}

/// Trade flow never drops below this level.
pub const MIN_TRADE_FLOW: f64 = 0.5;

/// Default number of welfare points kept in [`WorldState::history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 120;

/// Welfare of every country at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelfarePoint {
    /// When the point was recorded.
    pub timestamp: DateTime<Utc>,
    /// Welfare per country.
    pub welfare: BTreeMap<String, f64>,
}

/// All countries and the sector trade flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldState {
    countries: BTreeMap<String, CountryState>,
    trade_flow: BTreeMap<Sector, f64>,
    history: VecDeque<WelfarePoint>,
    history_limit: usize,
}

impl WorldState {
    /// Build a world from its countries and a uniform starting trade flow.
    pub fn new(countries: impl IntoIterator<Item = CountryState>, trade_flow: f64) -> Self {
        Self {
            countries: countries
                .into_iter()
                .map(|c| (c.name().to_owned(), c))
                .collect(),
            trade_flow: Sector::ALL.into_iter().map(|s| (s, trade_flow)).collect(),
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Cap the number of retained welfare points.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Look up a country by name.
    pub fn country(&self, name: &str) -> Result<&CountryState, WorldError> {
        self.countries
            .get(name)
            .ok_or_else(|| WorldError::CountryNotFound(name.to_owned()))
    }

    /// All countries keyed by name.
    pub const fn countries(&self) -> &BTreeMap<String, CountryState> {
        &self.countries
    }

    /// Country names in stable order.
    pub fn country_names(&self) -> Vec<String> {
        self.countries.keys().cloned().collect()
    }

    /// Trade flow per sector.
    pub const fn trade_flow(&self) -> &BTreeMap<Sector, f64> {
        &self.trade_flow
    }

    /// Recorded welfare points, oldest first.
    pub const fn history(&self) -> &VecDeque<WelfarePoint> {
        &self.history
    }

    /// Published view of every country.
    pub fn country_views(&self) -> BTreeMap<String, CountryView> {
        self.countries
            .iter()
            .map(|(name, c)| (name.clone(), c.view()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Set one country's sector tariff, clamped to `[0, 0.5]`.
    ///
    /// Returns the rate actually stored.
    pub fn apply_tariff(
        &mut self,
        country: &str,
        sector: Sector,
        rate: f64,
    ) -> Result<f64, WorldError> {
        let state = self
            .countries
            .get_mut(country)
            .ok_or_else(|| WorldError::CountryNotFound(country.to_owned()))?;
        let applied = state.set_tariff(sector, rate);
        debug!(country, sector = sector.as_str(), requested = rate, applied, "tariff set");
        Ok(applied)
    }

    /// Recompute sector trade flow with the gravity model.
    ///
    /// `now_secs` drives the slow oscillation term; pass seconds since the
    /// Unix epoch in production and a fixed value in tests.
    pub fn gravity_trade_flow(&mut self, now_secs: f64) -> &BTreeMap<Sector, f64> {
        let total_gdp: f64 = self.countries.values().map(CountryState::gdp).sum();
        let tariff_effect: f64 = self
            .countries
            .values()
            .map(CountryState::total_tariffs)
            .sum();
        let baseline = total_gdp / 1000.0 * 0.8;
        for (sector, flow) in &mut self.trade_flow {
            let name_len = sector.as_str().len();
            let bias = 0.02_f64.mul_add(count_as_f64(name_len.rem_euclid(3)), 1.0);
            let wave = 0.06_f64.mul_add((now_secs / 6.0 + count_as_f64(name_len)).sin(), 1.0);
            let raw = baseline * tariff_effect.mul_add(-0.01, 1.0) * bias * wave;
            *flow = round_to(raw.max(MIN_TRADE_FLOW), 2);
        }
        &self.trade_flow
    }

    /// Decay every country's imports and exports by its sector tariffs.
    pub fn apply_sector_drift(&mut self) {
        for country in self.countries.values_mut() {
            country.drift();
        }
    }

    /// Welfare per country from current tariffs, volumes, and trade flow.
    ///
    /// Pure: reads the world and returns a fresh map without assigning it.
    pub fn compute_welfare(&self) -> BTreeMap<String, f64> {
        let flow_factor = self.trade_flow.values().sum::<f64>() / 100.0;
        self.countries
            .iter()
            .map(|(name, c)| {
                let tariff_drag = c.total_tariffs() * 5.0;
                let import_exposure = c.total_imports() / 1000.0;
                let export_exposure = c.total_exports() / 1000.0;
                let welfare =
                    100.0 - tariff_drag - import_exposure - export_exposure + flow_factor;
                (name.clone(), round_to(welfare, 2))
            })
            .collect()
    }

    /// Store computed welfare on each named country. Unknown names are ignored.
    pub fn assign_welfare(&mut self, welfare: &BTreeMap<String, f64>) {
        for (name, value) in welfare {
            if let Some(country) = self.countries.get_mut(name) {
                country.assign_welfare(*value);
            }
        }
    }

    /// Append a welfare point, evicting the oldest beyond the history limit.
    pub fn record_history(&mut self, timestamp: DateTime<Utc>, welfare: BTreeMap<String, f64>) {
        self.history.push_back(WelfarePoint { timestamp, welfare });
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }
}
