//! Import session models
//!
//! A session is the document service's time-boxed container for one
//! upload's extracted and matched records. The client never mutates it;
//! after `expires_at` the service answers 410 and the only recovery is a
//! fresh upload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counts produced by the server-side extraction/matching step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows extracted from the document
    pub total_extracted: u32,

    /// Rows matched to a student record
    pub total_matched: u32,

    /// Matched rows awaiting human review
    pub ready_for_review: u32,
}

/// Result of a successful document upload
///
/// The upload response carries no expiry; the full [`ImportSession`]
/// (including `expires_at`) only exists once the session is fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    /// Session id issued by the document service
    pub session_id: String,

    /// Name of the uploaded file (known locally, echoed for display)
    pub original_filename: String,

    /// Extraction/matching summary
    pub summary: ImportSummary,
}

/// Import session as returned by the document service's fetch endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    /// Opaque session id issued by the document service
    pub session_id: String,

    /// Name of the originally uploaded file
    pub original_filename: String,

    /// Extraction/matching summary
    pub summary: ImportSummary,

    /// Instant after which the session is no longer retrievable
    pub expires_at: DateTime<Utc>,
}

impl ImportSession {
    /// Whether the session is past its expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
