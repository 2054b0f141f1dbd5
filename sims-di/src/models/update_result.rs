//! Batch update result and outcome classification

use serde::{Deserialize, Serialize};

/// Result of a batch approval submission, as reported by the document
/// service
///
/// Partial success (`error_count > 0` with `updated_count > 0`) is a valid
/// result, not an error; the caller reports it as a mixed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Overall outcome flag from the service
    pub success: bool,

    /// Records successfully persisted
    pub updated_count: u32,

    /// Records that failed to persist
    pub error_count: u32,

    /// One diagnostic per failure; not positionally mapped to the input
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Three-way classification of an [`UpdateResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    /// Every record the server attempted was persisted
    FullSuccess,
    /// Some records persisted, some failed
    PartialSuccess,
    /// Nothing was persisted
    TotalFailure,
}

impl CommitOutcome {
    /// Classify a server-reported result
    pub fn classify(result: &UpdateResult) -> Self {
        if result.updated_count == 0 {
            CommitOutcome::TotalFailure
        } else if result.error_count > 0 {
            CommitOutcome::PartialSuccess
        } else {
            CommitOutcome::FullSuccess
        }
    }

    /// Whether the server persisted at least one record, consuming the
    /// session's decision set
    pub fn consumed_session(&self) -> bool {
        matches!(
            self,
            CommitOutcome::FullSuccess | CommitOutcome::PartialSuccess
        )
    }

    /// String representation for logs and API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitOutcome::FullSuccess => "full_success",
            CommitOutcome::PartialSuccess => "partial_success",
            CommitOutcome::TotalFailure => "total_failure",
        }
    }
}
