//! REST endpoints for team sign-in and the member search.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::model::TeamMember;
use crate::app::AppState;

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// GET /api/session
///
/// The signed-in member, or 404 when nobody is signed in.
async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.sessions.current_session().await {
        Some(session) => (StatusCode::OK, Json(serde_json::json!(session))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No active session"})),
        ),
    }
}

/// POST /api/session
///
/// Signs in the given member.
async fn sign_in(
    State(state): State<AppState>,
    Json(member): Json<TeamMember>,
) -> impl IntoResponse {
    if member.id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Member id is required"})),
        );
    }
    let session = state
        .sessions
        .sign_in(&member, state.navigator.as_ref())
        .await;
    (StatusCode::OK, Json(serde_json::json!(session)))
}

/// DELETE /api/session
async fn sign_out(State(state): State<AppState>) -> impl IntoResponse {
    state.sessions.sign_out(state.navigator.as_ref()).await;
    StatusCode::NO_CONTENT
}

/// GET /api/team/members?q=
///
/// Directory members matching `q` by name or email.
async fn search_members(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let members: Vec<TeamMember> = state
        .directory
        .search(&query.q)
        .into_iter()
        .cloned()
        .collect();
    Json(members)
}

/// Build the session REST routes.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/session",
            get(get_session).post(sign_in).delete(sign_out),
        )
        .route("/api/team/members", get(search_members))
}
