//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read the latest published snapshot via the shared
//! [`AppState`]. Nothing here touches the world or the bus.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness and publish count |
//! | `GET` | `/api/state` | Latest `state` document |
//! | `GET` | `/api/events` | Latest `events` list, optionally filtered |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use tradewar_types::{Event, Topic};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Only events on this topic (wire name, e.g. `policy`).
    pub topic: Option<String>,
    /// Keep only the newest `limit` events.
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness, how many snapshots have been published, and the
/// persistence backend named by the latest one.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let backend = snapshot
        .state
        .as_ref()
        .map(|doc| doc.system_health.backend.clone());
    Json(serde_json::json!({
        "status": "ok",
        "snapshots_published": snapshot.published,
        "backend": backend,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/state
// ---------------------------------------------------------------------------

/// Return the latest `state` document.
///
/// Responds `503` until the publisher has run once.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let document = state.latest().await.ok_or(ObserverError::NotReady)?;
    Ok(Json(serde_json::to_value(document.as_ref())?))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// Return the recent-events list of the latest snapshot, oldest first.
///
/// Before the first publish the list is empty.
///
/// # Query Parameters
///
/// - `topic`: keep events on this topic only.
/// - `limit`: keep the newest `limit` events.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let topic = params.topic.as_deref().map(parse_topic).transpose()?;
    let document = state.latest().await;

    let mut events: Vec<&Event> = document
        .as_deref()
        .map(|doc| doc.events.iter().collect())
        .unwrap_or_default();
    if let Some(topic) = topic {
        events.retain(|e| e.topic() == topic);
    }
    if let Some(limit) = params.limit {
        let skip = events.len().saturating_sub(limit);
        events = events.split_off(skip);
    }

    Ok(Json(serde_json::to_value(&events)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a topic wire name, returning an [`ObserverError`] on failure.
fn parse_topic(s: &str) -> Result<Topic, ObserverError> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|e| ObserverError::InvalidQuery(format!("topic {s}: {e}")))
}
