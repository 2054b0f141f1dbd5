//! Approval committer
//!
//! Projects the review ledger into a decision batch, submits it through the
//! session client, and classifies the server's verdict. Refuses locally,
//! with no network call, when there is nothing to submit or when the ledger
//! was already consumed by an earlier submission.

use std::sync::Arc;

use crate::models::{CommitOutcome, UpdateResult};
use crate::services::review_ledger::ReviewLedger;
use crate::services::session_client::{SessionClient, SubmitError};

/// Outcome of a commit: the classification plus the server's raw result
#[derive(Debug, Clone)]
pub struct CommitReport {
    /// Three-way outcome classification
    pub outcome: CommitOutcome,
    /// Raw server result, including per-failure diagnostics
    pub result: UpdateResult,
}

/// Approval committer service
pub struct ApprovalCommitter {
    client: Arc<SessionClient>,
}

impl ApprovalCommitter {
    /// Create a committer submitting through `client`
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }

    /// Submit the ledger's decisions for one session
    ///
    /// All records are projected, not just the filtered view; the server
    /// ignores entries that require no change. On full or partial success
    /// the ledger is marked consumed: the same decision set can never be
    /// silently re-sent, and only a fresh session fetch re-arms submission.
    pub async fn commit(
        &self,
        session_id: &str,
        ledger: &mut ReviewLedger,
    ) -> Result<CommitReport, SubmitError> {
        if ledger.is_consumed() {
            return Err(SubmitError::AlreadyCommitted(session_id.to_string()));
        }
        if ledger.approved_count() == 0 {
            return Err(SubmitError::NoApprovals);
        }

        let decisions = ledger.decisions();
        let result = self.client.submit_approvals(session_id, &decisions).await?;
        let outcome = CommitOutcome::classify(&result);

        if outcome.consumed_session() {
            ledger.mark_consumed();
        }

        tracing::info!(
            session_id = %session_id,
            outcome = outcome.as_str(),
            updated = result.updated_count,
            failed = result.error_count,
            "Approval commit finished"
        );

        Ok(CommitReport { outcome, result })
    }
}
