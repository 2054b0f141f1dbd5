//! Review record model
//!
//! One candidate class-of-degree update awaiting human approval, as
//! extracted from an uploaded document and matched by the document service
//! against a student record.

use serde::{Deserialize, Serialize};

/// Server confidence that a document row corresponds to a specific student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    /// Matric number matched a student record exactly
    Exact,
    /// Student located by fuzzy name matching
    Partial,
}

/// Extraction provenance of a review record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    /// Row of a result table in the document
    Table,
    /// Free-text paragraph
    Text,
    /// Provenance tag this client does not recognize
    #[serde(other)]
    Unknown,
}

/// One candidate student update within an import session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Student primary key in the records service
    pub student_id: i64,

    /// Matriculation number; unique within a session and used as the
    /// mutation key for approval decisions
    pub matric_no: String,

    /// Student display name
    pub student_name: String,

    /// Class of degree currently on file (None when nothing is recorded)
    pub current_class_of_degree: Option<String>,

    /// Class of degree extracted from the uploaded document
    pub proposed_class_of_degree: String,

    /// Match confidence reported by the document service
    pub match_confidence: MatchConfidence,

    /// Whether the proposed value meaningfully differs from the value on
    /// file; records where this is false are informational only
    pub needs_update: bool,

    /// Client-local approval decision; never sent by the server, so it
    /// defaults to false on ingest
    #[serde(default)]
    pub approved: bool,

    /// Extraction provenance
    pub source: ExtractionSource,

    /// Source document row for traceability
    pub row_number: Option<u32>,
}

impl ReviewRecord {
    /// A record that proposes no change; it can never be approved
    pub fn is_informational(&self) -> bool {
        !self.needs_update
    }
}

/// Projection of a [`ReviewRecord`] sent to the document service at commit
/// time; a read-only snapshot of the decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Student primary key
    pub student_id: i64,

    /// Matriculation number
    pub matric_no: String,

    /// Value the server should persist when approved
    pub proposed_class_of_degree: String,

    /// Whether the reviewer approved this update
    pub approved: bool,
}

impl From<&ReviewRecord> for ApprovalDecision {
    fn from(record: &ReviewRecord) -> Self {
        Self {
            student_id: record.student_id,
            matric_no: record.matric_no.clone(),
            proposed_class_of_degree: record.proposed_class_of_degree.clone(),
            approved: record.approved,
        }
    }
}
