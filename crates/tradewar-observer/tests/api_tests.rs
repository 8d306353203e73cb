//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use tradewar_observer::router::{NO_CACHE, build_router, with_static};
use tradewar_observer::state::AppState;
use tradewar_types::{
    AgentStatus, Event, LearningMetrics, Payload, StateDocument, SystemHealth, Topic,
};

fn document(phase: &str) -> StateDocument {
    let event = |source: &str, topic: Topic, title: &str| {
        Event::new(source, topic, title, "", Payload::new())
    };
    let events = vec![
        event("Scenario Execution Agent", Topic::Scenario, "Phase update"),
        event("Country Strategy Agent (Beta)", Topic::Policy, "Country Beta policy update"),
        event("Country Strategy Agent (Gamma)", Topic::Policy, "Country Gamma policy update"),
    ];
    let mut agent_status = BTreeMap::new();
    agent_status.insert("Scenario Execution Agent".to_owned(), AgentStatus::Working);
    StateDocument {
        timestamp: Utc::now(),
        phase: phase.to_owned(),
        round: 2,
        classification: "Repeated Game".to_owned(),
        learning: LearningMetrics {
            alpha_aggression: 0.55,
            effectiveness_score: 0.0,
            note: "Policy effectiveness deteriorating; de-escalation bias increased.".to_owned(),
        },
        countries: BTreeMap::new(),
        trade_flow: BTreeMap::new(),
        welfare_impact: BTreeMap::new(),
        events,
        policy_timeline: Vec::new(),
        agent_status,
        system_health: SystemHealth {
            backend: "file".to_owned(),
        },
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: axum::Router, uri: &str) -> axum::response::Response {
    router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health_before_first_publish() {
    let state = Arc::new(AppState::new());
    let response = get(build_router(state), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["snapshots_published"], 0);
    assert!(json["backend"].is_null());
}

#[tokio::test]
async fn test_state_unavailable_until_published() {
    let state = Arc::new(AppState::new());
    let response = get(build_router(state), "/api/state").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn test_state_returns_latest_document() {
    let state = Arc::new(AppState::new());
    state.publish(document("Cold Start")).await;
    state.publish(document("Escalation")).await;

    let response = get(build_router(Arc::clone(&state)), "/api/state").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["phase"], "Escalation");
    assert_eq!(json["round"], 2);
    assert_eq!(json["agent_status"]["Scenario Execution Agent"], "working");
    assert_eq!(json["system_health"]["backend"], "file");

    let health = body_to_json(get(build_router(state), "/health").await.into_body()).await;
    assert_eq!(health["snapshots_published"], 2);
    assert_eq!(health["backend"], "file");
}

#[tokio::test]
async fn test_events_empty_before_publish() {
    let state = Arc::new(AppState::new());
    let response = get(build_router(state), "/api/events").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_events_filter_and_limit() {
    let state = Arc::new(AppState::new());
    state.publish(document("Cold Start")).await;

    let all = get(build_router(Arc::clone(&state)), "/api/events").await;
    let all = body_to_json(all.into_body()).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let policy = body_to_json(
        get(build_router(Arc::clone(&state)), "/api/events?topic=policy&limit=1")
            .await
            .into_body(),
    )
    .await;
    let policy = policy.as_array().unwrap();
    assert_eq!(policy.len(), 1);
    assert_eq!(policy[0]["title"], "Country Gamma policy update");
}

#[tokio::test]
async fn test_events_rejects_unknown_topic() {
    let state = Arc::new(AppState::new());
    let response = get(build_router(state), "/api/events?topic=weather").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_publish_reaches_subscribers() {
    let state = AppState::new();
    let mut rx = state.subscribe();
    assert_eq!(state.publish(document("Initial Shock")).await, 1);
    let received = rx.recv().await.unwrap();
    assert_eq!(received.phase, "Initial Shock");
}

#[tokio::test]
async fn test_static_files_are_not_cached() {
    let root = std::env::temp_dir()
        .join(format!("tradewar-observer-static-{}", std::process::id()));
    let dashboard = root.join("dashboard");
    let shared = root.join("shared");
    std::fs::create_dir_all(&dashboard).unwrap();
    std::fs::create_dir_all(&shared).unwrap();
    std::fs::write(dashboard.join("index.html"), "<html>tradewar</html>").unwrap();
    std::fs::write(shared.join("state.json"), r#"{"phase":"Cold Start"}"#).unwrap();

    let state = Arc::new(AppState::new());
    let router = with_static(build_router(state), &dashboard, &shared);

    let index = get(router.clone(), "/").await;
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(
        index.headers().get(header::CACHE_CONTROL).unwrap(),
        NO_CACHE
    );

    let shared_doc = get(router.clone(), "/shared/state.json").await;
    assert_eq!(shared_doc.status(), StatusCode::OK);
    assert_eq!(shared_doc.headers().get(header::PRAGMA).unwrap(), "no-cache");
    let json = body_to_json(shared_doc.into_body()).await;
    assert_eq!(json["phase"], "Cold Start");

    let api = get(router, "/health").await;
    assert_eq!(api.status(), StatusCode::OK);

    std::fs::remove_dir_all(&root).unwrap();
}
