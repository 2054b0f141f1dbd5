//! Service components for the document import workflow
//!
//! One file per component, in the order a session flows through them:
//! upload gate → session client → review ledger → approval committer.
//! The two HTTP clients take a [`credentials::CredentialProvider`] at
//! construction; nothing here reads ambient credential state.

pub mod approval_committer;
pub mod credentials;
pub mod review_ledger;
pub mod session_client;
pub mod upload_gate;

pub use approval_committer::{ApprovalCommitter, CommitReport};
pub use credentials::{CredentialProvider, SharedCredentials, StaticCredentials};
pub use review_ledger::{LedgerStatistics, RecordFilter, ReviewLedger};
pub use session_client::{FetchError, SessionClient, SubmitError};
pub use upload_gate::{UploadError, UploadGate, ValidationError};
