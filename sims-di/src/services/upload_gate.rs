//! Upload gate for candidate documents
//!
//! Validates a candidate file locally before spending a network round trip,
//! then hands it to the document service's extraction endpoint as a
//! multipart upload. Validation failures never produce a request.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ImportSummary, UploadedDocument};
use crate::services::credentials::SharedCredentials;

/// Recognized document extension (compared case-insensitively)
const DOCUMENT_EXTENSION: &str = ".docx";
/// Upload size ceiling: 10 MiB
const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;
/// Server-side extraction can take a while on large documents
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = "SIMS-DI/0.1.0";

/// Local validation failures, resolved before any request is made
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Filename does not end in the recognized document extension
    #[error("Unsupported file type: {0} (expected .docx)")]
    UnsupportedExtension(String),

    /// Zero-byte file
    #[error("File is empty")]
    EmptyFile,

    /// File exceeds the upload ceiling
    #[error("File too large: {size} bytes (limit is 10 MiB)")]
    TooLarge {
        /// Declared file size in bytes
        size: u64,
    },
}

/// Upload gate errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// Rejected locally; no request was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network failure, non-2xx status, or malformed response body
    #[error("Upload failed: {0}")]
    Failed(String),
}

/// Success payload of the import endpoint
#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    session_id: String,
    summary: ImportSummary,
}

/// Error payload of the document service
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[allow(dead_code)]
    success: bool,
    message: String,
}

/// Upload gate service
pub struct UploadGate {
    http_client: reqwest::Client,
    base_url: String,
    credentials: SharedCredentials,
}

impl UploadGate {
    /// Create an upload gate for the document service at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        credentials: SharedCredentials,
    ) -> Result<Self, UploadError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Validate a candidate file without touching the network
    ///
    /// Deterministic for a given name and size: extension must be `.docx`
    /// and the size must be in `1..=10 MiB`.
    pub fn validate(filename: &str, size: u64) -> Result<(), ValidationError> {
        if !filename.to_ascii_lowercase().ends_with(DOCUMENT_EXTENSION) {
            return Err(ValidationError::UnsupportedExtension(filename.to_string()));
        }
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size > MAX_DOCUMENT_BYTES {
            return Err(ValidationError::TooLarge { size });
        }
        Ok(())
    }

    /// Upload a document and receive the new import session
    ///
    /// Runs [`UploadGate::validate`] first; a validation failure surfaces as
    /// `UploadError::Validation` with no request made. The caller owns retry
    /// on `UploadError::Failed`.
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedDocument, UploadError> {
        Self::validate(filename, bytes.len() as u64)?;

        let url = format!("{}/api/documents/import", self.base_url);
        tracing::debug!(
            filename = %filename,
            size = bytes.len(),
            url = %url,
            "Uploading document for extraction"
        );

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            .map_err(|e| UploadError::Failed(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("document", part);

        let mut request = self
            .http_client
            .post(&url)
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form);
        if let Some(token) = self.credentials.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UploadError::Failed(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("Document service returned status {}", status));
            return Err(UploadError::Failed(message));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Failed(format!("Malformed upload response: {}", e)))?;

        if !body.success {
            return Err(UploadError::Failed(
                "Document service reported failure without detail".to_string(),
            ));
        }

        tracing::info!(
            session_id = %body.session_id,
            total_extracted = body.summary.total_extracted,
            total_matched = body.summary.total_matched,
            ready_for_review = body.summary.ready_for_review,
            "Document accepted for review"
        );

        Ok(UploadedDocument {
            session_id: body.session_id,
            original_filename: filename.to_string(),
            summary: body.summary,
        })
    }
}
