//! Axum router construction for the Observer API.
//!
//! [`build_router`] assembles the REST and `WebSocket` routes with CORS
//! enabled. [`with_static`] adds the dashboard and the shared snapshot
//! directory as static files served with no-cache headers.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// `Cache-Control` value for static responses; dashboards poll `shared/`.
pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Build the API router.
///
/// The router includes:
/// - `GET /health` -- liveness
/// - `GET /api/state` -- latest `state` document
/// - `GET /api/events` -- latest `events` list
/// - `GET /ws/state` -- `WebSocket` snapshot stream
///
/// CORS is configured to allow any origin for development.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ws/state", get(ws::ws_state))
        .route("/api/state", get(handlers::get_state))
        .route("/api/events", get(handlers::list_events))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Add static file serving to `api`.
///
/// `/shared/*` maps into `shared_dir`; every other unmatched path maps into
/// `dashboard_dir`, with `/` serving `index.html`.
pub fn with_static(api: Router, dashboard_dir: &Path, shared_dir: &Path) -> Router {
    let files = Router::new()
        .nest_service("/shared", ServeDir::new(shared_dir))
        .fallback_service(ServeDir::new(dashboard_dir))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_CACHE),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ));
    api.merge(files)
}
