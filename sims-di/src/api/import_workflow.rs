//! Import workflow API handlers
//!
//! POST /import/upload, session load/review endpoints, and final
//! submission. A session must be loaded before any approval mutation is
//! meaningful; mutations against an unloaded session id answer 404.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sims_common::events::ImportEvent;

use crate::error::{ApiError, ApiResult};
use crate::models::{CommitOutcome, ImportSession, ImportSummary, ReviewRecord, UpdateResult};
use crate::services::{FetchError, LedgerStatistics, RecordFilter, ReviewLedger};
use crate::{AppState, ReviewSession};

/// Request body ceiling for uploads: the 10 MiB document limit plus
/// multipart framing overhead
const UPLOAD_BODY_LIMIT: usize = 11 * 1024 * 1024;

/// POST /import/upload response
#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub session_id: String,
    pub original_filename: String,
    pub summary: ImportSummary,
}

/// Session view returned by load and get
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: ImportSession,
    pub records: Vec<ReviewRecord>,
    pub statistics: LedgerStatistics,
}

/// GET /import/session/{id}/records query parameters
#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    /// Case-insensitive substring matched against matric number or name
    #[serde(default)]
    pub search: String,
    /// View filter (all, needs_update, approved, rejected)
    #[serde(default)]
    pub filter: RecordFilter,
}

/// GET /import/session/{id}/records response
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub matched: usize,
    pub records: Vec<ReviewRecord>,
}

/// POST /import/session/{id}/approval request
#[derive(Debug, Deserialize)]
pub struct SetApprovalRequest {
    pub matric_no: String,
    pub approved: bool,
}

/// POST /import/session/{id}/bulk-approval request
#[derive(Debug, Deserialize)]
pub struct BulkApprovalRequest {
    pub approved: bool,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filter: RecordFilter,
}

/// Response to both approval mutations
#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    /// Records the decision was applied to
    pub applied: usize,
    pub statistics: LedgerStatistics,
}

/// POST /import/session/{id}/submit response
#[derive(Debug, Serialize)]
pub struct SubmitApprovalsResponse {
    pub outcome: CommitOutcome,
    pub result: UpdateResult,
}

/// POST /import/upload
///
/// Validate and upload a candidate document. Validation failures answer
/// 400 without any call to the document service.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadDocumentResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("document") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|name| name.to_string())
            .ok_or_else(|| {
                ApiError::BadRequest("Missing filename on document field".to_string())
            })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read document field: {}", e)))?;
        file = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Missing document field".to_string()))?;

    let upload_id = Uuid::new_v4();
    state.event_bus.emit_lossy(ImportEvent::DocumentUploadStarted {
        upload_id,
        filename: filename.clone(),
        timestamp: Utc::now(),
    });

    match state.upload_gate.upload(&filename, bytes).await {
        Ok(uploaded) => {
            state
                .event_bus
                .emit_lossy(ImportEvent::DocumentUploadCompleted {
                    upload_id,
                    session_id: uploaded.session_id.clone(),
                    ready_for_review: uploaded.summary.ready_for_review,
                    timestamp: Utc::now(),
                });

            Ok(Json(UploadDocumentResponse {
                session_id: uploaded.session_id,
                original_filename: uploaded.original_filename,
                summary: uploaded.summary,
            }))
        }
        Err(err) => {
            state.event_bus.emit_lossy(ImportEvent::DocumentUploadFailed {
                upload_id,
                message: err.to_string(),
                timestamp: Utc::now(),
            });
            *state.last_error.write().await = Some(err.to_string());
            Err(err.into())
        }
    }
}

/// POST /import/session/{session_id}/load
///
/// Fetch the session from the document service and initialize a fresh
/// review ledger, replacing any previously loaded ledger for the same id.
/// This is the explicit re-fetch that re-arms submission after a commit.
pub async fn load_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    match state.session_client.fetch_session(&session_id).await {
        Ok((session, records)) => {
            let ledger = ReviewLedger::new(records);
            let statistics = ledger.statistics();

            state.event_bus.emit_lossy(ImportEvent::SessionLoaded {
                session_id: session.session_id.clone(),
                record_count: statistics.total,
                needs_update: statistics.needs_update,
                timestamp: Utc::now(),
            });

            let response = SessionResponse {
                session: session.clone(),
                records: ledger.records().to_vec(),
                statistics,
            };

            state
                .sessions
                .write()
                .await
                .insert(session.session_id.clone(), ReviewSession { session, ledger });

            Ok(Json(response))
        }
        Err(err) => {
            if matches!(err, FetchError::NotFound(_) | FetchError::Expired(_)) {
                // Unrecoverable for this session: drop any stale ledger so
                // the caller starts over with a fresh upload.
                state.sessions.write().await.remove(&session_id);
                state.event_bus.emit_lossy(ImportEvent::SessionUnavailable {
                    session_id: session_id.clone(),
                    reason: err.to_string(),
                    timestamp: Utc::now(),
                });
            }
            *state.last_error.write().await = Some(err.to_string());
            Err(err.into())
        }
    }
}

/// GET /import/session/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let sessions = state.sessions.read().await;
    let review = sessions
        .get(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("No loaded session: {}", session_id)))?;

    Ok(Json(SessionResponse {
        session: review.session.clone(),
        records: review.ledger.records().to_vec(),
        statistics: review.ledger.statistics(),
    }))
}

/// GET /import/session/{session_id}/records
///
/// Filtered view over the loaded ledger; never mutates it.
pub async fn get_records(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<Json<RecordsResponse>> {
    let sessions = state.sessions.read().await;
    let review = sessions
        .get(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("No loaded session: {}", session_id)))?;

    let records: Vec<ReviewRecord> = review
        .ledger
        .filter(&query.search, query.filter)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(RecordsResponse {
        matched: records.len(),
        records,
    }))
}

/// POST /import/session/{session_id}/approval
pub async fn set_approval(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SetApprovalRequest>,
) -> ApiResult<Json<ApprovalResponse>> {
    let mut sessions = state.sessions.write().await;
    let review = sessions
        .get_mut(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("No loaded session: {}", session_id)))?;

    if review.ledger.is_consumed() {
        return Err(ApiError::Conflict(format!(
            "Approvals for session {} were already submitted; reload the session first",
            session_id
        )));
    }

    let known = review
        .ledger
        .records()
        .iter()
        .any(|r| r.matric_no == request.matric_no);
    if !known {
        return Err(ApiError::NotFound(format!(
            "No record with matric number {}",
            request.matric_no
        )));
    }

    let applied = review
        .ledger
        .set_approval(&request.matric_no, request.approved);
    let statistics = review.ledger.statistics();
    drop(sessions);

    if applied > 0 {
        state.event_bus.emit_lossy(ImportEvent::ApprovalsChanged {
            session_id,
            changed: applied,
            approved_total: statistics.approved,
            timestamp: Utc::now(),
        });
    }

    Ok(Json(ApprovalResponse {
        applied,
        statistics,
    }))
}

/// POST /import/session/{session_id}/bulk-approval
///
/// Applies the decision to the currently visible set only (search + filter
/// scope), as one atomic transition.
pub async fn bulk_approval(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<BulkApprovalRequest>,
) -> ApiResult<Json<ApprovalResponse>> {
    let mut sessions = state.sessions.write().await;
    let review = sessions
        .get_mut(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("No loaded session: {}", session_id)))?;

    if review.ledger.is_consumed() {
        return Err(ApiError::Conflict(format!(
            "Approvals for session {} were already submitted; reload the session first",
            session_id
        )));
    }

    let applied =
        review
            .ledger
            .bulk_set_approval(request.approved, &request.search, request.filter);
    let statistics = review.ledger.statistics();
    drop(sessions);

    if applied > 0 {
        state.event_bus.emit_lossy(ImportEvent::ApprovalsChanged {
            session_id,
            changed: applied,
            approved_total: statistics.approved,
            timestamp: Utc::now(),
        });
    }

    Ok(Json(ApprovalResponse {
        applied,
        statistics,
    }))
}

/// GET /import/session/{session_id}/statistics
///
/// Ground-truth counts over the full collection; unaffected by any view
/// filter the UI has active.
pub async fn get_statistics(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<LedgerStatistics>> {
    let sessions = state.sessions.read().await;
    let review = sessions
        .get(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("No loaded session: {}", session_id)))?;

    Ok(Json(review.ledger.statistics()))
}

/// POST /import/session/{session_id}/submit
///
/// Commit the ledger's decisions through the approval committer. The write
/// lock is held for the duration so no approval mutation can interleave
/// with the submission snapshot.
pub async fn submit_approvals(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SubmitApprovalsResponse>> {
    let mut sessions = state.sessions.write().await;
    let review = sessions
        .get_mut(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("No loaded session: {}", session_id)))?;

    let report = state
        .committer
        .commit(&session_id, &mut review.ledger)
        .await
        .map_err(|err| {
            tracing::warn!(session_id = %session_id, error = %err, "Approval commit rejected");
            err
        })?;
    drop(sessions);

    state.event_bus.emit_lossy(ImportEvent::ApprovalsSubmitted {
        session_id,
        updated_count: report.result.updated_count,
        error_count: report.result.error_count,
        timestamp: Utc::now(),
    });

    Ok(Json(SubmitApprovalsResponse {
        outcome: report.outcome,
        result: report.result,
    }))
}

/// Build import workflow routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import/upload", post(upload_document))
        .route("/import/session/:session_id/load", post(load_session))
        .route("/import/session/:session_id", get(get_session))
        .route("/import/session/:session_id/records", get(get_records))
        .route("/import/session/:session_id/approval", post(set_approval))
        .route(
            "/import/session/:session_id/bulk-approval",
            post(bulk_approval),
        )
        .route(
            "/import/session/:session_id/statistics",
            get(get_statistics),
        )
        .route("/import/session/:session_id/submit", post(submit_approvals))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
