//! Shared test helpers
//!
//! Provides an in-process stand-in for the document processing &
//! persistence service, plus request-building utilities for router tests.
#![allow(dead_code)]

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use sims_common::events::EventBus;
use sims_di::services::StaticCredentials;
use sims_di::AppState;

/// Observable state of the mock document service
#[derive(Clone, Default)]
pub struct MockState {
    /// Number of upload requests received
    pub uploads: Arc<Mutex<usize>>,
    /// Bodies of approval submissions received, in order
    pub submits: Arc<Mutex<Vec<Value>>>,
    /// Canned approval result; when None the mock echoes the approved count
    pub submit_result: Arc<Mutex<Option<Value>>>,
    /// Authorization header of the most recent request
    pub last_authorization: Arc<Mutex<Option<String>>>,
}

impl MockState {
    fn record_authorization(&self, headers: &HeaderMap) {
        *self.last_authorization.lock().unwrap() = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
    }
}

/// Handle to a running mock document service
pub struct MockDocumentService {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockDocumentService {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn upload_count(&self) -> usize {
        *self.state.uploads.lock().unwrap()
    }

    pub fn submit_count(&self) -> usize {
        self.state.submits.lock().unwrap().len()
    }

    pub fn last_submit(&self) -> Option<Value> {
        self.state.submits.lock().unwrap().last().cloned()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// Canned `result` object returned by the approve endpoint
    pub fn set_submit_result(&self, result: Value) {
        *self.state.submit_result.lock().unwrap() = Some(result);
    }
}

/// Review data shaped like the document service's `review_data` field:
/// 45 records, of which 35 need an update and 10 are informational.
pub fn sample_review_data() -> Vec<Value> {
    (1..=45)
        .map(|i| {
            let needs_update = i <= 35;
            json!({
                "student_id": i,
                "matric_no": format!("NYSC/2021/{:04}", i),
                "student_name": format!("Student {:02}", i),
                "current_class_of_degree": if needs_update {
                    "Second Class Lower"
                } else {
                    "Second Class Upper"
                },
                "proposed_class_of_degree": "Second Class Upper",
                "match_confidence": if i % 5 == 0 { "partial" } else { "exact" },
                "needs_update": needs_update,
                "source": if i % 2 == 0 { "table" } else { "text" },
                "row_number": i + 1
            })
        })
        .collect()
}

async fn mock_upload(
    State(state): State<MockState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.record_authorization(&headers);
    *state.uploads.lock().unwrap() += 1;

    let mut filename = String::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if let Some(name) = field.file_name() {
            filename = name.to_string();
        }
        let _ = field.bytes().await;
    }

    // A fixed filename triggers the extraction-failure path
    if filename == "reject-me.docx" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "success": false,
                "message": "No result tables found in document"
            })),
        )
            .into_response();
    }

    Json(json!({
        "success": true,
        "session_id": "abc123",
        "summary": {"total_extracted": 50, "total_matched": 45, "ready_for_review": 45}
    }))
    .into_response()
}

async fn mock_fetch_session(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Response {
    state.record_authorization(&headers);

    match session_id.as_str() {
        "abc123" => Json(json!({
            "success": true,
            "session_id": "abc123",
            "original_filename": "report.docx",
            "summary": {"total_extracted": 50, "total_matched": 45, "ready_for_review": 45},
            "review_data": sample_review_data(),
            "expires_at": "2099-01-01T00:00:00Z"
        }))
        .into_response(),
        "expired-id" => (
            StatusCode::GONE,
            Json(json!({"success": false, "message": "Import session expired"})),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Import session not found"})),
        )
            .into_response(),
    }
}

async fn mock_submit(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record_authorization(&headers);

    if session_id == "reject-submit" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "message": "Records service unavailable"})),
        )
            .into_response();
    }

    let approved = body["approvals"]
        .as_array()
        .map(|approvals| {
            approvals
                .iter()
                .filter(|decision| decision["approved"] == json!(true))
                .count()
        })
        .unwrap_or(0);
    state.submits.lock().unwrap().push(body);

    let result = state
        .submit_result
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| json!({"updated_count": approved, "error_count": 0, "errors": []}));

    Json(json!({"success": true, "result": result})).into_response()
}

/// Start a mock document service on an ephemeral port
pub async fn spawn_mock_service() -> MockDocumentService {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/documents/import", post(mock_upload))
        .route("/api/documents/import/:session_id", get(mock_fetch_session))
        .route(
            "/api/documents/import/:session_id/approve",
            post(mock_submit),
        )
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockDocumentService { addr, state }
}

/// App state wired to a document service base URL with test credentials
pub fn test_state(base_url: &str) -> AppState {
    let credentials = Arc::new(StaticCredentials::new("test-token"));
    let event_bus = EventBus::new(100);
    AppState::new(base_url, credentials, event_bus).unwrap()
}

/// Hand-rolled multipart body for router tests
///
/// Returns (content-type header value, body bytes).
pub fn multipart_body(field_name: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "sims-di-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field_name, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}
