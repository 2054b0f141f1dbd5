//! Event types for the SIMS event system
//!
//! Provides shared event definitions and EventBus for SIMS portal modules.
//! Events are broadcast via EventBus and can be serialized for SSE
//! transmission to connected portal UIs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// SIMS import lifecycle events
///
/// Each event carries its own timestamp so SSE consumers can order and
/// display them without trusting delivery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportEvent {
    /// Document passed local validation and was handed to the document service
    DocumentUploadStarted {
        /// Client-side correlation id (no session id exists yet)
        upload_id: Uuid,
        /// Uploaded file name
        filename: String,
        /// When the upload was dispatched
        timestamp: DateTime<Utc>,
    },

    /// Document service extracted and matched the upload into a session
    DocumentUploadCompleted {
        /// Correlation id from the matching DocumentUploadStarted event
        upload_id: Uuid,
        /// Session id issued by the document service
        session_id: String,
        /// Records ready for human review
        ready_for_review: u32,
        /// When the service's response arrived
        timestamp: DateTime<Utc>,
    },

    /// Upload rejected locally or failed at the document service
    DocumentUploadFailed {
        /// Correlation id from the matching DocumentUploadStarted event
        upload_id: Uuid,
        /// Human-readable failure description
        message: String,
        /// When the failure was observed
        timestamp: DateTime<Utc>,
    },

    /// Review session fetched and a fresh ledger initialized
    SessionLoaded {
        /// Session id
        session_id: String,
        /// Total records in the session
        record_count: usize,
        /// Records that propose an actual change
        needs_update: usize,
        /// When the ledger was initialized
        timestamp: DateTime<Utc>,
    },

    /// Approval decisions changed (single record or bulk)
    ApprovalsChanged {
        /// Session id
        session_id: String,
        /// Records the change was applied to
        changed: usize,
        /// Approved records after the change
        approved_total: usize,
        /// When the change was applied
        timestamp: DateTime<Utc>,
    },

    /// Decision batch accepted by the document service
    ApprovalsSubmitted {
        /// Session id
        session_id: String,
        /// Records persisted server-side
        updated_count: u32,
        /// Records that failed server-side
        error_count: u32,
        /// When the result arrived
        timestamp: DateTime<Utc>,
    },

    /// Session reported gone by the document service (expired or unknown)
    SessionUnavailable {
        /// Session id
        session_id: String,
        /// Why the session is gone
        reason: String,
        /// When the condition was observed
        timestamp: DateTime<Utc>,
    },
}

impl ImportEvent {
    /// Event type name, used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            ImportEvent::DocumentUploadStarted { .. } => "DocumentUploadStarted",
            ImportEvent::DocumentUploadCompleted { .. } => "DocumentUploadCompleted",
            ImportEvent::DocumentUploadFailed { .. } => "DocumentUploadFailed",
            ImportEvent::SessionLoaded { .. } => "SessionLoaded",
            ImportEvent::ApprovalsChanged { .. } => "ApprovalsChanged",
            ImportEvent::ApprovalsSubmitted { .. } => "ApprovalsSubmitted",
            ImportEvent::SessionUnavailable { .. } => "SessionUnavailable",
        }
    }
}

/// Event bus for broadcasting import events to subscribers
///
/// Thin wrapper over `tokio::sync::broadcast`; cloning shares the underlying
/// channel. Subscribers that fall behind lose the oldest events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ImportEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Channel capacity the bus was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ImportEvent,
    ) -> Result<usize, broadcast::error::SendError<ImportEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Import progress events are advisory; a workflow must not fail because
    /// no SSE client is connected.
    pub fn emit_lossy(&self, event: ImportEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event emitted with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> ImportEvent {
        ImportEvent::SessionLoaded {
            session_id: "abc123".to_string(),
            record_count: 45,
            needs_update: 35,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn event_type_names_match_variants() {
        assert_eq!(sample_event().event_type(), "SessionLoaded");

        let event = ImportEvent::DocumentUploadFailed {
            upload_id: Uuid::new_v4(),
            message: "File too large".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "DocumentUploadFailed");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["type"], "SessionLoaded");
        assert_eq!(json["session_id"], "abc123");
        assert_eq!(json["record_count"], 45);
    }

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let count = bus.emit(sample_event()).unwrap();
        assert_eq!(count, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type(), "SessionLoaded");
    }

    #[test]
    fn emit_without_subscribers_errors_but_lossy_does_not_panic() {
        let bus = EventBus::new(16);
        assert!(bus.emit(sample_event()).is_err());
        bus.emit_lossy(sample_event());
    }
}
