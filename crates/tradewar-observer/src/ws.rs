//! `WebSocket` handler for real-time snapshot streaming.
//!
//! Clients connect to `GET /ws/state`, immediately receive the latest
//! `state` document if there is one, and then one JSON text frame per
//! published snapshot.
//!
//! If a client falls behind, lagged messages are silently skipped and
//! the client resumes from the most recent snapshot.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use tradewar_types::StateDocument;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming snapshots.
///
/// # Route
///
/// `GET /ws/state`
pub async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize and send one document. Returns `false` when the client is gone.
async fn send_document(socket: &mut WebSocket, document: &StateDocument) -> bool {
    let json = match serde_json::to_string(document) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "failed to serialize snapshot");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the latest so no publish falls in between.
    let mut rx = state.subscribe();
    if let Some(latest) = state.latest().await
        && !send_document(&mut socket, &latest).await
    {
        debug!("WebSocket client disconnected (initial send failed)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(document) => {
                        if !send_document(&mut socket, &document).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket error");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
