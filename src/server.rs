//! HTTP surface: REST routes for every container plus a WebSocket that
//! streams state changes to the dashboard UI.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::onboarding::routes::onboarding_routes;
use crate::onboarding::{OnboardingEvent, OnboardingState};
use crate::session::routes::session_routes;
use crate::session::{SessionEvent, TeamSession};
use crate::workspaces::routes::workspace_routes;
use crate::workspaces::{WorkspaceEvent, WorkspaceRegistryState};

/// Frames sent to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full state, sent on connect and after a client falls behind.
    Snapshot {
        workspaces: WorkspaceRegistryState,
        session: Option<TeamSession>,
        onboarding: OnboardingState,
    },
    Workspaces { event: WorkspaceEvent },
    Session { event: SessionEvent },
    Onboarding { event: OnboardingEvent },
}

/// Build the full router over `state`.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/reset", post(reset))
        .route("/ws", get(ws_handler))
        .merge(workspace_routes())
        .merge(session_routes())
        .merge(onboarding_routes())
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "booking-console"
    }))
}

/// POST /api/reset
///
/// Wipes all persisted state and restarts onboarding.
async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    state.reset().await;
    StatusCode::NO_CONTENT
}

// ── WebSocket ───────────────────────────────────────────────────────────

async fn snapshot(state: &AppState) -> WsMessage {
    WsMessage::Snapshot {
        workspaces: state.workspaces.snapshot().await,
        session: state.sessions.current_session().await,
        onboarding: state.onboarding.snapshot().await,
    }
}

async fn send_json(socket: &mut WebSocket, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize WS frame");
            true
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Subscribe before the snapshot so no change falls between the two
    let mut workspace_rx = state.workspaces.subscribe();
    let mut session_rx = state.sessions.subscribe();
    let mut onboarding_rx = state.onboarding.subscribe();

    if !send_json(&mut socket, &snapshot(&state).await).await {
        warn!("Failed to send initial snapshot, client disconnected");
        return;
    }

    loop {
        let outgoing = tokio::select! {
            result = workspace_rx.recv() => match result {
                Ok(event) => WsMessage::Workspaces { event },
                Err(RecvError::Lagged(n)) => {
                    warn!(missed = n, "WS client lagged behind workspace events");
                    snapshot(&state).await
                }
                Err(RecvError::Closed) => break,
            },
            result = session_rx.recv() => match result {
                Ok(event) => WsMessage::Session { event },
                Err(RecvError::Lagged(n)) => {
                    warn!(missed = n, "WS client lagged behind session events");
                    snapshot(&state).await
                }
                Err(RecvError::Closed) => break,
            },
            result = onboarding_rx.recv() => match result {
                Ok(event) => WsMessage::Onboarding { event },
                Err(RecvError::Lagged(n)) => {
                    warn!(missed = n, "WS client lagged behind onboarding events");
                    snapshot(&state).await
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                    continue;
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("WebSocket client disconnected");
                    break;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    break;
                }
                Some(Ok(_)) => {
                    debug!("Ignoring client frame, the event stream is read-only");
                    continue;
                }
            },
        };

        if !send_json(&mut socket, &outgoing).await {
            debug!("Client disconnected during send");
            break;
        }
    }

    info!("WebSocket connection closed");
}
