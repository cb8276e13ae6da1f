//! Shared test utilities for waymark integration tests.
//!
//! - [`ScriptedProvider`]: a [`Provider`] that replays queued answers and
//!   records the prompts it was given.
//! - [`FakeUpstream`]: a local axum server standing in for the Gemini and
//!   Mistral HTTP APIs.
//! - [`temp_store`]: a [`StateStore`] backed by a temp directory.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::task::JoinHandle;

use waymark_core::provider::{CompletionRequest, Provider, ProviderError, ProviderKind};
use waymark_store::StateStore;

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Script {
    answers: VecDeque<Result<String, ProviderError>>,
    prompts: Vec<String>,
}

/// In-memory [`Provider`] with a queue of canned answers.
///
/// Clones share the same queue, so a test can register one clone and keep
/// another to inspect calls afterwards. An exhausted queue answers with
/// `InvalidResponse`.
#[derive(Clone)]
pub struct ScriptedProvider {
    kind: ProviderKind,
    configured: bool,
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            configured: true,
            script: Arc::default(),
        }
    }

    /// A provider that reports no usable credential.
    pub fn unconfigured(kind: ProviderKind) -> Self {
        Self {
            configured: false,
            ..Self::new(kind)
        }
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn with_error(self, err: ProviderError) -> Self {
        self.push(Err(err));
        self
    }

    /// Queue an HTTP failure with the given status.
    pub fn with_http_error(self, status: u16) -> Self {
        let kind = self.kind;
        self.with_error(ProviderError::Http {
            provider: kind,
            status,
            body: "scripted failure".to_owned(),
        })
    }

    fn push(&self, answer: Result<String, ProviderError>) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .answers
            .push_back(answer);
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.script
            .lock()
            .expect("script lock poisoned")
            .prompts
            .clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut script = self.script.lock().expect("script lock poisoned");
        script.prompts.push(request.prompt.clone());
        script
            .answers
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::InvalidResponse {
                    provider: self.kind,
                    message: "script exhausted".to_owned(),
                })
            })
    }
}

// ---------------------------------------------------------------------------
// Fake upstream HTTP server
// ---------------------------------------------------------------------------

/// A request captured by [`FakeUpstream`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct UpstreamState {
    routes: Mutex<HashMap<String, (StatusCode, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local HTTP server with canned responses per path. Unknown paths get 404.
/// The server stops when the value is dropped.
pub struct FakeUpstream {
    addr: SocketAddr,
    state: Arc<UpstreamState>,
    task: JoinHandle<()>,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(UpstreamState::default());
        let app = Router::new()
            .fallback(record_and_respond)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake upstream");
        let addr = listener.local_addr().expect("fake upstream has no address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond(&self, path: &str, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).expect("invalid status code");
        self.state
            .routes
            .lock()
            .expect("routes lock poisoned")
            .insert(path.to_owned(), (status, body.into()));
    }

    pub fn respond_json(&self, path: &str, status: u16, body: serde_json::Value) {
        self.respond(path, status, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("requests lock poisoned")
            .clone()
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn record_and_respond(
    State(state): State<Arc<UpstreamState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state
        .requests
        .lock()
        .expect("requests lock poisoned")
        .push(RecordedRequest {
            path: path.clone(),
            headers,
            body: json,
        });

    let canned = state
        .routes
        .lock()
        .expect("routes lock poisoned")
        .get(&path)
        .cloned();
    match canned {
        Some((status, body)) => (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "no canned response").into_response(),
    }
}

// ---------------------------------------------------------------------------
// State store
// ---------------------------------------------------------------------------

/// A [`StateStore`] writing to `state.json` inside a fresh temp directory.
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn temp_store() -> (tempfile::TempDir, StateStore) {
    let dir = tempfile::TempDir::new().expect("failed to create temp dir");
    let store = StateStore::new(dir.path().join("state.json"));
    (dir, store)
}
