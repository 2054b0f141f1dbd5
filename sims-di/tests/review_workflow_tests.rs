//! Review & approval workflow integration tests
//!
//! Drives the ledger and approval committer end to end against the mock
//! document service: fetch, decide, commit, classify.

mod helpers;

use std::sync::Arc;

use helpers::spawn_mock_service;
use serde_json::json;
use sims_di::models::CommitOutcome;
use sims_di::services::{
    ApprovalCommitter, ReviewLedger, SessionClient, StaticCredentials, SubmitError,
};

async fn fetch_ledger(
    client: &SessionClient,
) -> ReviewLedger {
    let (_, records) = client.fetch_session("abc123").await.unwrap();
    ReviewLedger::new(records)
}

fn workflow(base_url: &str) -> (Arc<SessionClient>, ApprovalCommitter) {
    let credentials = Arc::new(StaticCredentials::new("test-token"));
    let client = Arc::new(SessionClient::new(base_url, credentials).unwrap());
    let committer = ApprovalCommitter::new(client.clone());
    (client, committer)
}

#[tokio::test]
async fn commit_without_approvals_makes_no_network_call() {
    let mock = spawn_mock_service().await;
    let (client, committer) = workflow(&mock.base_url());
    let mut ledger = fetch_ledger(&client).await;

    let err = committer.commit("abc123", &mut ledger).await.unwrap_err();

    assert!(matches!(err, SubmitError::NoApprovals));
    assert_eq!(mock.submit_count(), 0, "guard must resolve locally");
    assert!(!ledger.is_consumed());
}

#[tokio::test]
async fn full_success_consumes_the_ledger() {
    let mock = spawn_mock_service().await;
    let (client, committer) = workflow(&mock.base_url());
    let mut ledger = fetch_ledger(&client).await;

    for i in 1..=5 {
        ledger.set_approval(&format!("NYSC/2021/{:04}", i), true);
    }

    let report = committer.commit("abc123", &mut ledger).await.unwrap();
    assert_eq!(report.outcome, CommitOutcome::FullSuccess);
    assert_eq!(report.result.updated_count, 5);
    assert_eq!(report.result.error_count, 0);
    assert!(ledger.is_consumed());

    // Same decision set again, without a fresh fetch: rejected locally
    let err = committer.commit("abc123", &mut ledger).await.unwrap_err();
    assert!(matches!(err, SubmitError::AlreadyCommitted(_)));
    assert_eq!(mock.submit_count(), 1, "decisions must never be re-sent");
}

#[tokio::test]
async fn a_fresh_fetch_rearms_submission() {
    let mock = spawn_mock_service().await;
    let (client, committer) = workflow(&mock.base_url());
    let mut ledger = fetch_ledger(&client).await;

    ledger.set_approval("NYSC/2021/0001", true);
    committer.commit("abc123", &mut ledger).await.unwrap();
    assert!(ledger.is_consumed());

    let mut fresh = fetch_ledger(&client).await;
    fresh.set_approval("NYSC/2021/0002", true);
    let report = committer.commit("abc123", &mut fresh).await.unwrap();

    assert_eq!(report.outcome, CommitOutcome::FullSuccess);
    assert_eq!(mock.submit_count(), 2);
}

#[tokio::test]
async fn mixed_server_result_is_partial_success() {
    let mock = spawn_mock_service().await;
    mock.set_submit_result(json!({
        "updated_count": 7,
        "error_count": 3,
        "errors": [
            "NYSC/2021/0003: record locked",
            "NYSC/2021/0007: class of degree mismatch",
            "NYSC/2021/0011: student withdrawn"
        ]
    }));

    let (client, committer) = workflow(&mock.base_url());
    let mut ledger = fetch_ledger(&client).await;
    ledger.bulk_set_approval(true, "", sims_di::services::RecordFilter::NeedsUpdate);

    let report = committer.commit("abc123", &mut ledger).await.unwrap();

    assert_eq!(report.outcome, CommitOutcome::PartialSuccess);
    assert_eq!(report.result.errors.len(), 3);
    assert!(
        ledger.is_consumed(),
        "partial success still consumes the decision set"
    );
}

#[tokio::test]
async fn total_failure_leaves_the_ledger_submittable() {
    let mock = spawn_mock_service().await;
    mock.set_submit_result(json!({
        "updated_count": 0,
        "error_count": 5,
        "errors": ["records service rejected the batch"]
    }));

    let (client, committer) = workflow(&mock.base_url());
    let mut ledger = fetch_ledger(&client).await;
    ledger.set_approval("NYSC/2021/0001", true);

    let report = committer.commit("abc123", &mut ledger).await.unwrap();
    assert_eq!(report.outcome, CommitOutcome::TotalFailure);
    assert!(!ledger.is_consumed(), "nothing was persisted server-side");

    // The caller may retry the same decisions after a total failure
    let second = committer.commit("abc123", &mut ledger).await.unwrap();
    assert_eq!(second.outcome, CommitOutcome::TotalFailure);
    assert_eq!(mock.submit_count(), 2);
}

#[tokio::test]
async fn commit_projects_every_record_not_just_the_view() {
    let mock = spawn_mock_service().await;
    let (client, committer) = workflow(&mock.base_url());
    let mut ledger = fetch_ledger(&client).await;

    ledger.set_approval("NYSC/2021/0001", true);
    committer.commit("abc123", &mut ledger).await.unwrap();

    let submitted = mock.last_submit().unwrap();
    let approvals = submitted["approvals"].as_array().unwrap();
    assert_eq!(approvals.len(), 45, "informational and rejected records ship too");
    assert_eq!(
        approvals
            .iter()
            .filter(|decision| decision["approved"] == json!(true))
            .count(),
        1
    );
}

#[tokio::test]
async fn transport_failure_surfaces_as_failed_and_preserves_the_ledger() {
    let mock = spawn_mock_service().await;
    let (client, _) = workflow(&mock.base_url());
    let mut ledger = fetch_ledger(&client).await;
    ledger.set_approval("NYSC/2021/0001", true);

    // Committer pointed at a dead endpoint; ledger state must survive
    let (_, dead_committer) = workflow("http://127.0.0.1:9");
    let err = dead_committer
        .commit("abc123", &mut ledger)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Failed(_)));
    assert!(!ledger.is_consumed());
    assert_eq!(ledger.approved_count(), 1);
}
