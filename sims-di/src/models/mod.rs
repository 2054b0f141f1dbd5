//! Data models for sims-di (Document Import module)
//!
//! Domain types for the import review workflow. Wire payloads from the
//! document service are snake_case JSON; these types double as the typed
//! schema at that boundary, so a shape mismatch is a parse error rather
//! than a runtime surprise.

pub mod import_session;
pub mod review_record;
pub mod update_result;

pub use import_session::{ImportSession, ImportSummary, UploadedDocument};
pub use review_record::{ApprovalDecision, ExtractionSource, MatchConfidence, ReviewRecord};
pub use update_result::{CommitOutcome, UpdateResult};
