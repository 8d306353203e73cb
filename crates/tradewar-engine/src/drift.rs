//! The world's own periodic drift.
//!
//! Every period the trade flow is recomputed from the gravity model, sector
//! volumes decay under their tariffs, fresh welfare is stored on every
//! country, and a welfare point is appended to the bounded history. Keeping
//! this here leaves the snapshot publisher read-only.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, info};
use tradewar_world::{SharedWorld, epoch_seconds};

/// Run one drift step at `now`. Returns the welfare it assigned.
pub fn drift_once(world: &SharedWorld, now: DateTime<Utc>) -> BTreeMap<String, f64> {
    world.write(|w| {
        w.gravity_trade_flow(epoch_seconds(now));
        w.apply_sector_drift();
        let welfare = w.compute_welfare();
        w.assign_welfare(&welfare);
        w.record_history(now, welfare.clone());
        welfare
    })
}

/// Drift the world forever, once per `interval`.
pub async fn run_drift(world: SharedWorld, interval: Duration) {
    info!(interval_ms = interval.as_millis(), "world drift started");
    loop {
        let welfare = drift_once(&world, Utc::now());
        debug!(welfare = ?welfare, "world drifted");
        sleep(interval).await;
    }
}
