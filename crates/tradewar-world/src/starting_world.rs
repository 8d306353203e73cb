//! Default starting world for the trade-war simulation.
//!
//! Three countries over the five fixed sectors. Export and import bases are
//! spread across sectors with a fixed weighting so electronics carries the
//! most volume and energy the least.

use tradewar_types::Sector;

use crate::analysis::round_to;
use crate::country::CountryState;
use crate::state::WorldState;

/// Name of the learning-enabled country.
pub const ALPHA: &str = "Country Alpha";
/// Name of the import-security country.
pub const BETA: &str = "Country Beta";
/// Name of the coalition-hedge country.
pub const GAMMA: &str = "Country Gamma";

/// Starting trade flow in every sector.
pub const STARTING_TRADE_FLOW: f64 = 8.0;

/// Relative weight of a sector in a country's trade volume.
pub const fn sector_factor(sector: Sector) -> f64 {
    match sector {
        Sector::Electronics => 1.2,
        Sector::Automotive => 1.0,
        Sector::Agriculture => 0.8,
        Sector::Energy => 0.7,
        Sector::Manufacturing => 0.9,
    }
}

/// Spread `base` across sectors by [`sector_factor`].
fn spread(base: f64) -> impl Fn(Sector) -> f64 {
    move |sector| round_to(base * sector_factor(sector), 2)
}

/// Build the three-country starting world.
pub fn build_world() -> WorldState {
    WorldState::new(
        [
            CountryState::new(ALPHA, 2100.0, spread(180.0), spread(140.0), 0.08)
                .with_politics(0.6, "Export defense"),
            CountryState::new(BETA, 1800.0, spread(140.0), spread(170.0), 0.06)
                .with_politics(0.55, "Import security"),
            CountryState::new(GAMMA, 1500.0, spread(120.0), spread(110.0), 0.05)
                .with_politics(0.48, "Coalition hedge"),
        ],
        STARTING_TRADE_FLOW,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn starting_world_has_three_countries() {
        let world = build_world();
        assert_eq!(world.country_names(), vec![ALPHA, BETA, GAMMA]);
    }

    #[test]
    fn sector_volumes_follow_weights() {
        let world = build_world();
        let alpha = world.country(ALPHA).unwrap();
        assert!(close(*alpha.exports().get(&Sector::Electronics).unwrap(), 216.0));
        assert!(close(alpha.import_volume(Sector::Energy), 98.0));
        assert!(close(alpha.tariff(Sector::Electronics), 0.08));
        assert_eq!(alpha.strategic_posture(), "Export defense");
    }

    #[test]
    fn starting_trade_flow_is_uniform() {
        let world = build_world();
        assert_eq!(world.trade_flow().len(), Sector::ALL.len());
        assert!(world.trade_flow().values().all(|f| close(*f, 8.0)));
    }

    #[test]
    fn starting_welfare_is_below_baseline() {
        let world = build_world();
        let welfare = world.compute_welfare();
        for value in welfare.values() {
            assert!(*value < 100.0);
        }
    }
}
