//! Shared helpers for the threadpost conformance test suite.
//!
//! Provides two in-process servers, each bound to an ephemeral port on
//! `127.0.0.1`:
//!
//! - [`spawn_mock_graph`]: a stand-in for the Threads Graph API that records
//!   every request and replays scripted container statuses.
//! - [`spawn_connector`]: the real connector router, pointed at a mock Graph
//!   API and configured with millisecond timings so tests run quickly.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use threadpost_connector::{
    build_router, config::ConnectorConfig, threads::ReadinessPolicy, GraphClient, PublishTiming,
    Publisher, SystemClock,
};

/// API key the spawned connector expects in `X-API-Key`.
pub const API_KEY: &str = "conformance-key";

/// Threads user id the spawned connector publishes as.
pub const USER_ID: &str = "1234";

/// Access token the spawned connector sends to the Graph API.
pub const ACCESS_TOKEN: &str = "conformance-token";

// ---------------------------------------------------------------------------
// Mock Graph API
// ---------------------------------------------------------------------------

/// One request received by the mock Graph API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphRequest {
    /// `POST /{user_id}/threads` with its form fields.
    Create(HashMap<String, String>),
    /// `GET /{creation_id}`.
    Status(String),
    /// `POST /{user_id}/threads_publish` with its form fields.
    Publish(HashMap<String, String>),
}

/// How the mock Graph API should answer.
#[derive(Debug, Clone, Default)]
pub struct GraphScript {
    /// Status answers, one per status request, as `(status, error_message)`.
    /// `FINISHED` once exhausted.
    pub statuses: Vec<(String, Option<String>)>,
    /// When set, every create request fails with this Graph error message.
    pub create_error: Option<String>,
}

impl GraphScript {
    pub fn with_statuses(statuses: &[&str]) -> Self {
        Self {
            statuses: statuses.iter().map(|s| (s.to_string(), None)).collect(),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct GraphState {
    requests: Vec<GraphRequest>,
    statuses: VecDeque<(String, Option<String>)>,
    create_error: Option<String>,
    containers: usize,
}

/// Handle to a running mock Graph API.
#[derive(Clone)]
pub struct MockGraph {
    /// Base URL including the version segment, e.g. `http://127.0.0.1:5123/v1.0`.
    pub base_url: String,
    state: Arc<Mutex<GraphState>>,
}

impl MockGraph {
    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<GraphRequest> {
        self.state.lock().expect("mock graph lock").requests.clone()
    }

    /// Form fields of every container creation, in order.
    pub fn creates(&self) -> Vec<HashMap<String, String>> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                GraphRequest::Create(form) => Some(form),
                _ => None,
            })
            .collect()
    }

    /// Form fields of every publish call, in order.
    pub fn publishes(&self) -> Vec<HashMap<String, String>> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                GraphRequest::Publish(form) => Some(form),
                _ => None,
            })
            .collect()
    }

    /// Number of status polls received.
    pub fn status_polls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, GraphRequest::Status(_)))
            .count()
    }
}

type Shared = Arc<Mutex<GraphState>>;

async fn mock_create(
    State(state): State<Shared>,
    Path(_user_id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().expect("mock graph lock");
    state.requests.push(GraphRequest::Create(form));

    if let Some(message) = state.create_error.clone() {
        let body = json!({
            "error": {
                "message": message,
                "type": "OAuthException",
                "code": 100,
                "error_user_title": "Invalid request",
                "error_user_msg": "The post could not be created.",
                "fbtrace_id": "conformance"
            }
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    state.containers += 1;
    Json(json!({ "id": format!("c{}", state.containers) })).into_response()
}

async fn mock_status(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().expect("mock graph lock");
    state.requests.push(GraphRequest::Status(id.clone()));

    let (status, error_message) = state
        .statuses
        .pop_front()
        .unwrap_or_else(|| ("FINISHED".to_string(), None));

    let mut body = json!({ "id": id, "status": status });
    if let Some(message) = error_message {
        body["error_message"] = json!(message);
    }
    Json(body).into_response()
}

async fn mock_publish(
    State(state): State<Shared>,
    Path(_user_id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let creation_id = form.get("creation_id").cloned().unwrap_or_default();
    state
        .lock()
        .expect("mock graph lock")
        .requests
        .push(GraphRequest::Publish(form));
    Json(json!({ "id": format!("post-{creation_id}") })).into_response()
}

async fn mock_debug_token() -> Json<serde_json::Value> {
    Json(json!({ "data": { "is_valid": true, "expires_at": 0, "scopes": ["threads_basic"] } }))
}

/// Start a mock Graph API that answers according to `script`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_mock_graph(script: GraphScript) -> MockGraph {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let state: Shared = Arc::new(Mutex::new(GraphState {
        statuses: script.statuses.into(),
        create_error: script.create_error,
        ..GraphState::default()
    }));

    let api = Router::new()
        .route("/debug_token", get(mock_debug_token))
        .route("/{user_id}/threads", post(mock_create))
        .route("/{user_id}/threads_publish", post(mock_publish))
        .route("/{id}", get(mock_status))
        .with_state(Arc::clone(&state));
    let router = Router::new().nest("/v1.0", api);

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock graph api error");
    });

    MockGraph {
        base_url: format!("http://{addr}/v1.0"),
        state,
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Start an in-process connector that publishes through `graph` and return
/// its base URL, e.g. `http://127.0.0.1:51234`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound or the server fails.
pub async fn spawn_connector(graph: &MockGraph) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let config = ConnectorConfig {
        threads_user_id: USER_ID.into(),
        threads_access_token: ACCESS_TOKEN.into(),
        api_key: API_KEY.into(),
        bind_addr: addr,
        graph_api_base: graph.base_url.clone(),
        timing: PublishTiming {
            readiness: ReadinessPolicy {
                interval: Duration::from_millis(50),
                deadline: Duration::from_secs(2),
            },
            publish_delay: Duration::ZERO,
            link_reply_delay: Duration::ZERO,
        },
        http_timeout: Duration::from_secs(5),
    };

    let client = GraphClient::from_config(&config).expect("build graph client");
    let publisher = Publisher::new(Arc::new(client), Arc::new(SystemClock), config.timing);
    let router = build_router(config, Arc::new(publisher));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance connector error");
    });

    format!("http://{addr}")
}
