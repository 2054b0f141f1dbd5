//! Document service session client
//!
//! Fetches an import session's review data and submits committed decisions.
//! All access to the remote session store goes through this client; wire
//! payloads are snake_case JSON mapped into the typed domain model at this
//! boundary, so a shape mismatch surfaces as a transport error instead of a
//! runtime surprise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{ApprovalDecision, ImportSession, ImportSummary, ReviewRecord, UpdateResult};
use crate::services::credentials::SharedCredentials;

/// Session reads answer from storage; no server-side parsing involved
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Batch persistence of approvals can take tens of seconds
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = "SIMS-DI/0.1.0";

/// Session fetch errors
///
/// NotFound and Expired are unrecoverable for the current session; the only
/// valid recovery is a fresh upload. Transport may be retried in place.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Session id unknown or already consumed (HTTP 404)
    #[error("Import session not found: {0}")]
    NotFound(String),

    /// Session past its expiry instant (HTTP 410)
    #[error("Import session expired: {0}")]
    Expired(String),

    /// Network failure, timeout, or malformed response
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Approval submission errors
///
/// NoApprovals and AlreadyCommitted are raised by the approval committer
/// before any request is made; Failed covers transport failures and error
/// responses from the document service.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No record is currently approved; nothing to submit
    #[error("No approved records to submit")]
    NoApprovals,

    /// Decisions for this ledger were already accepted by the server
    #[error("Approvals for session {0} were already submitted")]
    AlreadyCommitted(String),

    /// Transport failure or error response from the document service
    #[error("Approval submission failed: {0}")]
    Failed(String),
}

/// Success payload of the session fetch endpoint
#[derive(Debug, Deserialize)]
struct SessionResponse {
    success: bool,
    session_id: String,
    original_filename: String,
    summary: ImportSummary,
    review_data: Vec<ReviewRecord>,
    expires_at: DateTime<Utc>,
}

/// Request payload of the approval endpoint
#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    session_id: &'a str,
    approvals: &'a [ApprovalDecision],
}

/// Result object inside the approval endpoint's success payload
#[derive(Debug, Deserialize)]
struct UpdateResultBody {
    updated_count: u32,
    error_count: u32,
    #[serde(default)]
    errors: Vec<String>,
}

/// Success payload of the approval endpoint
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    success: bool,
    result: UpdateResultBody,
}

/// Error payload of the document service
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[allow(dead_code)]
    success: bool,
    message: String,
}

/// Client for the document service's session store
pub struct SessionClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: SharedCredentials,
}

impl SessionClient {
    /// Create a session client for the document service at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        credentials: SharedCredentials,
    ) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch the full session plus its ordered review records
    ///
    /// The server signals expiry (410) distinctly from an unknown id (404);
    /// both are surfaced as distinct variants so the caller can message
    /// appropriately.
    pub async fn fetch_session(
        &self,
        session_id: &str,
    ) -> Result<(ImportSession, Vec<ReviewRecord>), FetchError> {
        if session_id.trim().is_empty() {
            return Err(FetchError::NotFound("(empty session id)".to_string()));
        }

        let url = format!("{}/api/documents/import/{}", self.base_url, session_id);
        tracing::debug!(session_id = %session_id, url = %url, "Fetching import session");

        let response = self
            .authorized(self.http_client.get(&url).timeout(FETCH_TIMEOUT))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(FetchError::NotFound(session_id.to_string()));
        }
        if status == 410 {
            return Err(FetchError::Expired(session_id.to_string()));
        }
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("Document service returned status {}", status));
            return Err(FetchError::Transport(message));
        }

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Transport(format!("Malformed session response: {}", e)))?;

        if !body.success {
            return Err(FetchError::Transport(
                "Document service reported failure without detail".to_string(),
            ));
        }

        let session = ImportSession {
            session_id: body.session_id,
            original_filename: body.original_filename,
            summary: body.summary,
            expires_at: body.expires_at,
        };

        tracing::info!(
            session_id = %session.session_id,
            records = body.review_data.len(),
            expires_at = %session.expires_at,
            "Import session retrieved"
        );

        Ok((session, body.review_data))
    }

    /// Submit the complete decision set for a session
    ///
    /// Sends every decision, approved or not, so the server has the full
    /// picture; guarding against empty submissions is the committer's job.
    /// Partial success is a valid [`UpdateResult`], never an error here.
    pub async fn submit_approvals(
        &self,
        session_id: &str,
        decisions: &[ApprovalDecision],
    ) -> Result<UpdateResult, SubmitError> {
        let url = format!("{}/api/documents/import/{}/approve", self.base_url, session_id);
        let approved = decisions.iter().filter(|d| d.approved).count();
        tracing::debug!(
            session_id = %session_id,
            decisions = decisions.len(),
            approved = approved,
            "Submitting approval decisions"
        );

        let request_body = SubmitRequest {
            session_id,
            approvals: decisions,
        };

        let response = self
            .authorized(
                self.http_client
                    .post(&url)
                    .timeout(SUBMIT_TIMEOUT)
                    .json(&request_body),
            )
            .send()
            .await
            .map_err(|e| SubmitError::Failed(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("Document service returned status {}", status));
            return Err(SubmitError::Failed(message));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| SubmitError::Failed(format!("Malformed update response: {}", e)))?;

        let result = UpdateResult {
            success: body.success,
            updated_count: body.result.updated_count,
            error_count: body.result.error_count,
            errors: body.result.errors,
        };

        tracing::info!(
            session_id = %session_id,
            updated = result.updated_count,
            failed = result.error_count,
            "Approval batch processed by document service"
        );

        Ok(result)
    }
}
