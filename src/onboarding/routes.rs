//! REST endpoints for the onboarding wizard.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use super::state::OnboardingStep;
use crate::app::AppState;

/// GET /api/onboarding
///
/// Current step, furthest step, captured data and completion time.
async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.onboarding.snapshot().await)
}

/// GET /api/onboarding/steps
///
/// Progress indicator: every step with its title and whether it was reached,
/// plus the jump policy in force.
async fn get_steps(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.onboarding.snapshot().await;
    Json(serde_json::json!({
        "jumpPolicy": state.onboarding.policy(),
        "steps": snapshot.steps(),
    }))
}

/// POST /api/onboarding/next
async fn next(State(state): State<AppState>) -> impl IntoResponse {
    state.onboarding.next().await;
    Json(state.onboarding.snapshot().await)
}

/// POST /api/onboarding/back
async fn back(State(state): State<AppState>) -> impl IntoResponse {
    state.onboarding.back().await;
    Json(state.onboarding.snapshot().await)
}

/// POST /api/onboarding/goto/{step}
///
/// Any integer is accepted and clamped.
async fn go_to(State(state): State<AppState>, Path(step): Path<String>) -> impl IntoResponse {
    let n = match step.trim().parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Step must be an integer"})),
            );
        }
    };
    state.onboarding.go_to(n).await;
    (
        StatusCode::OK,
        Json(serde_json::json!(state.onboarding.snapshot().await)),
    )
}

/// PUT /api/onboarding/steps/{step}
///
/// Merges the JSON body into that step's captured data.
async fn save_step(
    State(state): State<AppState>,
    Path(step): Path<String>,
    Json(data): Json<serde_json::Value>,
) -> impl IntoResponse {
    let Some(step) = step
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(OnboardingStep::from_number)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Unknown onboarding step"})),
        );
    };
    state.onboarding.save_step_data(step, data).await;
    (
        StatusCode::OK,
        Json(serde_json::json!(state.onboarding.snapshot().await)),
    )
}

/// POST /api/onboarding/complete
async fn complete(State(state): State<AppState>) -> impl IntoResponse {
    state.onboarding.complete(state.navigator.as_ref()).await;
    Json(state.onboarding.snapshot().await)
}

/// Build the onboarding REST routes.
pub fn onboarding_routes() -> Router<AppState> {
    Router::new()
        .route("/api/onboarding", get(get_status))
        .route("/api/onboarding/steps", get(get_steps))
        .route("/api/onboarding/next", post(next))
        .route("/api/onboarding/back", post(back))
        .route("/api/onboarding/goto/{step}", post(go_to))
        .route("/api/onboarding/steps/{step}", put(save_step))
        .route("/api/onboarding/complete", post(complete))
}
