//! sims-di library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sims_common::events::EventBus;

use crate::models::ImportSession;
use crate::services::{
    ApprovalCommitter, ReviewLedger, SessionClient, SharedCredentials, UploadGate,
};

/// One loaded review session: the immutable session descriptor plus the
/// mutable decision ledger
#[derive(Debug, Clone)]
pub struct ReviewSession {
    /// Session descriptor as fetched from the document service
    pub session: ImportSession,
    /// Client-local decision state
    pub ledger: ReviewLedger,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded review sessions keyed by session id; the single lock makes
    /// every ledger operation atomic with respect to readers
    pub sessions: Arc<RwLock<HashMap<String, ReviewSession>>>,
    /// Upload gate for candidate documents
    pub upload_gate: Arc<UploadGate>,
    /// Session store client
    pub session_client: Arc<SessionClient>,
    /// Approval committer
    pub committer: Arc<ApprovalCommitter>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Build state for a document service at `base_url`
    pub fn new(
        base_url: &str,
        credentials: SharedCredentials,
        event_bus: EventBus,
    ) -> Result<Self, ApiError> {
        let upload_gate = Arc::new(UploadGate::new(base_url, credentials.clone())?);
        let session_client = Arc::new(SessionClient::new(base_url, credentials)?);
        let committer = Arc::new(ApprovalCommitter::new(session_client.clone()));

        Ok(Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            upload_gate,
            session_client,
            committer,
            event_bus,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
