//! REST endpoints for the workspace list and selection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use super::model::Workspace;
use crate::app::AppState;

/// Body of `PUT /api/workspaces/selection`.
#[derive(Debug, Deserialize)]
struct SelectionRequest {
    id: Option<String>,
}

/// Body of `POST /api/workspaces`.
#[derive(Debug, Deserialize)]
struct CreateWorkspaceRequest {
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    description: String,
}

/// GET /api/workspaces
///
/// The list in display order plus the current selection.
async fn get_workspaces(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.workspaces.snapshot().await)
}

/// PUT /api/workspaces
///
/// Replaces the whole list. The selection is revalidated against it.
async fn put_workspaces(
    State(state): State<AppState>,
    Json(workspaces): Json<Vec<Workspace>>,
) -> impl IntoResponse {
    info!(count = workspaces.len(), "Workspace list replaced via REST");
    state.workspaces.set_workspaces(workspaces).await;
    Json(state.workspaces.snapshot().await)
}

/// POST /api/workspaces
///
/// Creates a workspace with a fresh id and derived initials, color, link and
/// prefix, appended to the list.
async fn create_workspace(
    State(state): State<AppState>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Workspace name is required"})),
        );
    }
    let mut workspace = Workspace::new(req.name.trim(), req.email);
    workspace.description = req.description;
    info!(workspace_id = %workspace.id, "Workspace created via REST");
    state.workspaces.upsert_workspace(workspace.clone()).await;
    (StatusCode::CREATED, Json(serde_json::json!(workspace)))
}

/// PUT /api/workspaces/{id}
///
/// Inserts or replaces one workspace. The path id wins over the body's.
async fn upsert_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut workspace): Json<Workspace>,
) -> impl IntoResponse {
    workspace.id = id;
    state.workspaces.upsert_workspace(workspace).await;
    Json(state.workspaces.snapshot().await)
}

/// DELETE /api/workspaces/{id}
async fn delete_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.workspaces.remove_workspace(&id).await {
        (StatusCode::OK, Json(serde_json::json!(state.workspaces.snapshot().await)))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Workspace not found"})),
        )
    }
}

/// PUT /api/workspaces/selection
///
/// `{"id": null}` clears the selection; an unknown id is a 404.
async fn put_selection(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> impl IntoResponse {
    match req.id {
        None => {
            state.workspaces.set_selected_workspace(None).await;
            (StatusCode::OK, Json(serde_json::json!(state.workspaces.snapshot().await)))
        }
        Some(id) => {
            if state.workspaces.select_by_id(&id).await {
                (StatusCode::OK, Json(serde_json::json!(state.workspaces.snapshot().await)))
            } else {
                (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "Workspace not found"})),
                )
            }
        }
    }
}

/// Build the workspace REST routes.
pub fn workspace_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/workspaces",
            get(get_workspaces)
                .put(put_workspaces)
                .post(create_workspace),
        )
        .route("/api/workspaces/selection", put(put_selection))
        .route(
            "/api/workspaces/{id}",
            put(upsert_workspace).delete(delete_workspace),
        )
}
