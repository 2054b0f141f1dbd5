//! Review ledger
//!
//! Client-local working copy of one session's review records. Holds the
//! approve/reject decisions while a reviewer works through the session;
//! never contacts the network. The ledger is owned by exactly one session
//! flow and mutated behind a single lock, so every operation here is one
//! atomic transition with respect to readers.
//!
//! Per-record states: informational (`needs_update = false`, terminal),
//! pending (`needs_update = true, approved = false`), approved
//! (`needs_update = true, approved = true`). Only explicit reviewer action
//! moves a record between pending and approved.

use serde::{Deserialize, Serialize};

use crate::models::{ApprovalDecision, ReviewRecord};

/// Filter applied to the ledger view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFilter {
    /// Every record in the session
    #[default]
    All,
    /// Records whose proposed value differs from the value on file
    NeedsUpdate,
    /// Records the reviewer has approved
    Approved,
    /// Actionable records not (or no longer) approved
    Rejected,
}

impl RecordFilter {
    fn matches(&self, record: &ReviewRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::NeedsUpdate => record.needs_update,
            RecordFilter::Approved => record.approved,
            RecordFilter::Rejected => record.needs_update && !record.approved,
        }
    }
}

/// Case-insensitive substring match against matric number OR student name
fn matches_search(record: &ReviewRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    record.matric_no.to_lowercase().contains(&term)
        || record.student_name.to_lowercase().contains(&term)
}

/// Ground-truth counts over the full record collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatistics {
    /// All records in the session
    pub total: usize,
    /// Records proposing an actual change
    pub needs_update: usize,
    /// Records currently approved
    pub approved: usize,
    /// Informational records (no change required)
    pub no_update_needed: usize,
}

/// In-memory review ledger for one import session
#[derive(Debug, Clone)]
pub struct ReviewLedger {
    records: Vec<ReviewRecord>,
    consumed: bool,
}

impl ReviewLedger {
    /// Build a ledger from freshly fetched review records
    ///
    /// Enforces the ingest invariant: a record that requires no update can
    /// never arrive approved.
    pub fn new(mut records: Vec<ReviewRecord>) -> Self {
        for record in &mut records {
            if record.is_informational() && record.approved {
                tracing::warn!(
                    matric_no = %record.matric_no,
                    "Clearing approval flag on informational record"
                );
                record.approved = false;
            }
        }

        Self {
            records,
            consumed: false,
        }
    }

    /// Full record collection, in server order
    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    /// Number of records in the session
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the session holds no records at all
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Set the approval decision for every record with this matric number
    ///
    /// Matric numbers are unique within a session; if duplicates slip
    /// through upstream, all of them are updated so a half-applied decision
    /// cannot go undetected. Informational records are left untouched.
    /// Returns the number of records the decision was applied to.
    pub fn set_approval(&mut self, matric_no: &str, approved: bool) -> usize {
        let mut applied = 0;
        for record in self.records.iter_mut().filter(|r| r.matric_no == matric_no) {
            if record.is_informational() {
                tracing::debug!(
                    matric_no = %matric_no,
                    "Ignoring approval on informational record"
                );
                continue;
            }
            record.approved = approved;
            applied += 1;
        }
        applied
    }

    /// Apply a decision to every actionable record in the current view
    ///
    /// Scoped to the records matching `search_term` and `filter`: bulk
    /// actions affect what the reviewer is looking at, not the whole
    /// session. One call is one transition; a reader behind the same lock
    /// never observes a partially applied bulk update.
    pub fn bulk_set_approval(
        &mut self,
        approved: bool,
        search_term: &str,
        filter: RecordFilter,
    ) -> usize {
        let mut applied = 0;
        for record in self.records.iter_mut() {
            if record.is_informational() {
                continue;
            }
            if !matches_search(record, search_term) || !filter.matches(record) {
                continue;
            }
            record.approved = approved;
            applied += 1;
        }

        if applied > 0 {
            tracing::info!(
                approved = approved,
                applied = applied,
                filter = ?filter,
                "Bulk approval applied"
            );
        }
        applied
    }

    /// Pure filtered view of the ledger; never mutates the collection
    pub fn filter(&self, search_term: &str, filter: RecordFilter) -> Vec<&ReviewRecord> {
        self.records
            .iter()
            .filter(|r| matches_search(r, search_term) && filter.matches(r))
            .collect()
    }

    /// Counts over the full collection, regardless of any active filter
    pub fn statistics(&self) -> LedgerStatistics {
        let mut stats = LedgerStatistics {
            total: self.records.len(),
            needs_update: 0,
            approved: 0,
            no_update_needed: 0,
        };

        for record in &self.records {
            if record.needs_update {
                stats.needs_update += 1;
            } else {
                stats.no_update_needed += 1;
            }
            if record.approved {
                stats.approved += 1;
            }
        }
        stats
    }

    /// Number of records currently approved
    pub fn approved_count(&self) -> usize {
        self.records.iter().filter(|r| r.approved).count()
    }

    /// Project the full collection into submission decisions
    ///
    /// Every record is projected, not just the filtered view, so no
    /// decision is lost to an active filter at submit time.
    pub fn decisions(&self) -> Vec<ApprovalDecision> {
        self.records.iter().map(ApprovalDecision::from).collect()
    }

    /// Whether a successful submission has consumed this ledger
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Mark the ledger consumed after the server accepted its decisions
    ///
    /// A consumed ledger rejects further submissions; only a fresh session
    /// fetch produces a submittable ledger again.
    pub fn mark_consumed(&mut self) {
        self.consumed = true;
    }
}
