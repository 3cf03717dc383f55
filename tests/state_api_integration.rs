//! Integration tests for the state REST API and the event WebSocket.
//!
//! Each test spins up an Axum server on a random port over an in-memory
//! store, then drives it through reqwest and tokio-tungstenite.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use booking_console::app::AppState;
use booking_console::navigation::{RecordingNavigator, Route};
use booking_console::onboarding::JumpPolicy;
use booking_console::server::app_routes;
use booking_console::session::{MemberDirectory, Role, TeamMember};
use booking_console::store::MemoryMedium;
use booking_console::workspaces::Workspace;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    port: u16,
    state: AppState,
    medium: Arc<MemoryMedium>,
    nav: Arc<RecordingNavigator>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }
}

fn directory() -> MemberDirectory {
    MemberDirectory::new(vec![
        TeamMember {
            id: "m1".into(),
            name: "Maria Lopez".into(),
            email: "maria@glow.example".into(),
            role: Role::Manager,
        },
        TeamMember {
            id: "m2".into(),
            name: "Sam Chen".into(),
            email: "sam@glow.example".into(),
            role: Role::Staff,
        },
    ])
}

/// Start an Axum server on a random port over `medium`.
async fn start_server_with(medium: Arc<MemoryMedium>) -> TestServer {
    let nav = Arc::new(RecordingNavigator::new());
    let state = AppState::new(medium.clone(), JumpPolicy::Any, directory(), nav.clone());
    state.hydrate().await;
    let app = app_routes(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        port,
        state,
        medium,
        nav,
    }
}

async fn start_server() -> TestServer {
    start_server_with(Arc::new(MemoryMedium::new())).await
}

/// Parse a WS text frame into a serde_json::Value.
fn parse_ws_json(msg: &Message) -> Value {
    match msg {
        Message::Text(txt) => serde_json::from_str(txt).expect("invalid JSON from server"),
        other => panic!("expected Text frame, got {:?}", other),
    }
}

// ── Health ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let body: Value = reqwest::get(server.url("/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

// ── Workspaces ──────────────────────────────────────────────────────────

#[tokio::test]
async fn workspaces_put_select_and_survive_restart() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();
        let glow = Workspace::new("Glow Studio", "hi@glow.example");
        let fade = Workspace::new("Fade Barbers", "hi@fade.example");

        let resp = client
            .put(server.url("/api/workspaces"))
            .json(&vec![glow.clone(), fade.clone()])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["workspaces"].as_array().unwrap().len(), 2);
        assert!(body["selectedWorkspace"].is_null());

        let resp = client
            .put(server.url("/api/workspaces/selection"))
            .json(&json!({"id": fade.id}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["selectedWorkspace"]["id"], fade.id.as_str());

        // A second server over the same medium sees the same selection.
        let restarted = start_server_with(server.medium.clone()).await;
        let body: Value = reqwest::get(restarted.url("/api/workspaces"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["selectedWorkspace"]["name"], "Fade Barbers");
        assert_eq!(body["workspaces"][0]["id"], glow.id.as_str());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn selecting_unknown_workspace_is_not_found() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = reqwest::Client::new()
            .put(server.url("/api/workspaces/selection"))
            .json(&json!({"id": "nope"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        assert!(server.state.workspaces.selected_workspace().await.is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn dropping_selected_workspace_clears_selection() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();
        let a = Workspace::new("A", "a@x.example");
        let b = Workspace::new("B", "b@x.example");

        client
            .put(server.url("/api/workspaces"))
            .json(&vec![a.clone(), b.clone()])
            .send()
            .await
            .unwrap();
        client
            .put(server.url("/api/workspaces/selection"))
            .json(&json!({"id": a.id}))
            .send()
            .await
            .unwrap();

        let body: Value = client
            .put(server.url("/api/workspaces"))
            .json(&vec![b.clone()])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["selectedWorkspace"].is_null());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn workspace_create_upsert_and_delete() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(server.url("/api/workspaces"))
            .json(&json!({"name": "Glow Beauty Studio", "email": "hi@glow.example"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let created: Value = resp.json().await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["initials"], "GB");
        assert_eq!(created["bookingLink"], "glow-beauty-studio");

        let resp = client
            .post(server.url("/api/workspaces"))
            .json(&json!({"name": "   "}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let mut edited: Workspace = serde_json::from_value(created).unwrap();
        edited.name = "Glow Spa".to_string();
        edited.id = "ignored".to_string();
        let body: Value = client
            .put(server.url(&format!("/api/workspaces/{id}")))
            .json(&edited)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["workspaces"].as_array().unwrap().len(), 1);
        assert_eq!(body["workspaces"][0]["id"], id.as_str());
        assert_eq!(body["workspaces"][0]["name"], "Glow Spa");

        let resp = client
            .delete(server.url(&format!("/api/workspaces/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let resp = client
            .delete(server.url(&format!("/api/workspaces/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        assert!(server.state.workspaces.workspaces().await.is_empty());
    })
    .await
    .expect("test timed out");
}

// ── Session ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_sign_in_and_out() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();

        let resp = client.get(server.url("/api/session")).send().await.unwrap();
        assert_eq!(resp.status(), 404);

        let resp = client
            .post(server.url("/api/session"))
            .json(&json!({
                "id": "m1",
                "name": "Maria Lopez",
                "email": "maria@glow.example",
                "role": "Super Admin"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["role"], "Super Admin");
        assert_eq!(server.nav.last(), Some(Route::TeamPortal));

        let body: Value = client
            .get(server.url("/api/session"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["id"], "m1");

        let resp = client
            .delete(server.url("/api/session"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
        assert_eq!(server.nav.last(), Some(Route::TeamLogin));
        assert!(server.state.sessions.current_session().await.is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn sign_in_without_id_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = reqwest::Client::new()
            .post(server.url("/api/session"))
            .json(&json!({"id": "  ", "name": "Nobody"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert!(server.nav.routes().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn member_search_filters_by_name_or_email() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;

        let all: Vec<Value> = reqwest::get(server.url("/api/team/members"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let found: Vec<Value> = reqwest::get(server.url("/api/team/members?q=SAM"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], "m2");
    })
    .await
    .expect("test timed out");
}

// ── Onboarding ──────────────────────────────────────────────────────────

#[tokio::test]
async fn onboarding_navigation_clamps_and_resumes() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(server.url("/api/onboarding"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["currentStep"], 1);

        let body: Value = client
            .post(server.url("/api/onboarding/back"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["currentStep"], 1);

        let body: Value = client
            .post(server.url("/api/onboarding/goto/99"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["currentStep"], 4);

        let body: Value = client
            .post(server.url("/api/onboarding/goto/-3"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["currentStep"], 1);

        let resp = client
            .post(server.url("/api/onboarding/goto/two"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        client
            .post(server.url("/api/onboarding/next"))
            .send()
            .await
            .unwrap();

        let restarted = start_server_with(server.medium.clone()).await;
        let body: Value = reqwest::get(restarted.url("/api/onboarding"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["currentStep"], 2);
        assert_eq!(body["highestStep"], 4);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn onboarding_step_data_merges_and_completes() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();

        client
            .put(server.url("/api/onboarding/steps/1"))
            .json(&json!({"businessName": "Glow", "phone": "555"}))
            .send()
            .await
            .unwrap();
        let body: Value = client
            .put(server.url("/api/onboarding/steps/1"))
            .json(&json!({"phone": "556"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["stepData"]["1"]["businessName"], "Glow");
        assert_eq!(body["stepData"]["1"]["phone"], "556");

        let resp = client
            .put(server.url("/api/onboarding/steps/7"))
            .json(&json!({"x": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let body: Value = client
            .post(server.url("/api/onboarding/complete"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["completedAt"].is_string());
        assert_eq!(server.nav.last(), Some(Route::Dashboard));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn onboarding_steps_describe_progress() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();
        client
            .post(server.url("/api/onboarding/goto/3"))
            .send()
            .await
            .unwrap();

        let body: Value = client
            .get(server.url("/api/onboarding/steps"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["jumpPolicy"], "any");
        let steps = body["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0]["title"], "Business details");
        assert_eq!(steps[2]["current"], true);
        assert_eq!(steps[3]["visited"], false);
        assert_eq!(steps[3]["isLast"], true);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn reset_wipes_state_and_restarts_onboarding() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();
        client
            .put(server.url("/api/workspaces"))
            .json(&vec![Workspace::new("Glow Studio", "hi@glow.example")])
            .send()
            .await
            .unwrap();
        client
            .post(server.url("/api/session"))
            .json(&json!({"id": "m1"}))
            .send()
            .await
            .unwrap();
        client
            .post(server.url("/api/onboarding/next"))
            .send()
            .await
            .unwrap();

        let resp = client.post(server.url("/api/reset")).send().await.unwrap();
        assert_eq!(resp.status(), 204);

        assert!(server.medium.is_empty().await);
        assert!(server.state.workspaces.workspaces().await.is_empty());
        assert!(server.state.sessions.current_session().await.is_none());
        assert_eq!(
            server.nav.routes(),
            vec![Route::TeamPortal, Route::Onboarding]
        );
    })
    .await
    .expect("test timed out");
}

// ── WebSocket ───────────────────────────────────────────────────────────

#[tokio::test]
async fn ws_sends_snapshot_on_connect() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        server
            .state
            .workspaces
            .set_workspaces(vec![Workspace::new("Glow Studio", "hi@glow.example")])
            .await;

        let (mut ws, _) = connect_async(server.ws_url()).await.unwrap();
        let msg = ws.next().await.unwrap().unwrap();
        let json = parse_ws_json(&msg);

        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["workspaces"]["workspaces"][0]["name"], "Glow Studio");
        assert!(json["session"].is_null());
        assert_eq!(json["onboarding"]["currentStep"], 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_streams_events_from_rest_mutations() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();

        let (mut ws, _) = connect_async(server.ws_url()).await.unwrap();
        let _snapshot = ws.next().await.unwrap().unwrap();

        client
            .post(server.url("/api/onboarding/next"))
            .send()
            .await
            .unwrap();
        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["type"], "onboarding");
        assert_eq!(json["event"]["type"], "step_changed");
        assert_eq!(json["event"]["step"], 2);

        client
            .post(server.url("/api/session"))
            .json(&json!({"id": "m2", "name": "Sam Chen"}))
            .send()
            .await
            .unwrap();
        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["type"], "session");
        assert_eq!(json["event"]["type"], "signed_in");
        assert_eq!(json["event"]["session"]["role"], "Staff");

        let ws_one = Workspace::new("Glow Studio", "hi@glow.example");
        client
            .put(server.url("/api/workspaces"))
            .json(&vec![ws_one])
            .send()
            .await
            .unwrap();
        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["type"], "workspaces");
        assert_eq!(json["event"]["type"], "workspaces_changed");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_answers_ping_and_closes_cleanly() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let (mut ws, _) = connect_async(server.ws_url()).await.unwrap();
        let _snapshot = ws.next().await.unwrap().unwrap();

        ws.send(Message::Ping(vec![1, 2, 3].into())).await.unwrap();
        let msg = ws.next().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Pong(_)));

        ws.send(Message::Close(None)).await.unwrap();
    })
    .await
    .expect("test timed out");
}
