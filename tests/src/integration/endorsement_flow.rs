//! # End-to-End Endorsement Flow
//!
//! ```text
//! client ──SignedProposal──→ [Keystore fetcher] ──signer──→ [Gate]
//!                                                              │
//!                                              canonical JSON  ↓
//!                                                   [Decision server]
//!                                                              │
//!                              (Endorsement, outcome)  ←── approved
//!                              EndorsementError        ←── anything else
//! ```
//!
//! ## Test Categories
//!
//! 1. **Happy Path**: approval releases a verifiable endorsement
//! 2. **Status-only service**: `{"status": 200}` approves, 418 refuses
//! 3. **Veto**: explicit rejection withholds it
//! 4. **Fail-closed**: status errors, bad verdicts, unreachable service
//! 5. **Short-circuit**: identity and decode failures never reach the service

use crate::fixtures::*;
use axum::http::StatusCode;
use endorsement_gate::{
    verify_endorsement, EndorsementError, EndorsementPluginFactory, EndorsementStage,
};
use serde_json::json;
use shared_types::SignedProposal;

#[tokio::test]
async fn test_approved_proposal_is_endorsed_by_peer() {
    let server = DecisionServer::start(approve_all()).await;
    let plugin = initialized_plugin(&server.endpoint);
    let outcome = outcome_writing("model", &[("weights", b"v7")]);
    let proposal = client_identity().signed_proposal("models", "tx-approve", vec![1]);

    let (endorsement, returned) = plugin.endorse(outcome.clone(), &proposal).await.unwrap();

    assert_eq!(returned, outcome);
    let endorser = verify_endorsement(&endorsement, &outcome).unwrap();
    assert_eq!(endorser.mspid, "PeerOrgMSP");
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_decision_server_sees_effect_set_json() {
    let server = DecisionServer::start(approve_all()).await;
    let plugin = initialized_plugin(&server.endpoint);
    let outcome = outcome_writing("model", &[("weights", b"v7")]);
    let proposal = client_identity().signed_proposal("models", "tx-json", vec![]);

    plugin.endorse(outcome, &proposal).await.unwrap();

    assert_eq!(
        server.bodies(),
        vec![json!({
            "NsRwSets": [{
                "NameSpace": "model",
                "KvRwSet": {
                    "reads": [{"key": "weights", "version": {"block_num": 3, "tx_num": 1}}],
                    "writes": [{"key": "weights", "value": "djc="}]
                },
                "CollHashedRwSets": []
            }]
        })]
    );
}

#[tokio::test]
async fn test_status_only_approval_is_endorsed() {
    let server = DecisionServer::start(status_only_refusing("admin")).await;
    let plugin = initialized_plugin(&server.endpoint);
    let outcome = outcome_writing("model", &[("weights", b"v8")]);
    let proposal = client_identity().signed_proposal("models", "tx-status", vec![]);

    let (endorsement, returned) = plugin.endorse(outcome.clone(), &proposal).await.unwrap();

    assert_eq!(returned, outcome);
    verify_endorsement(&endorsement, &outcome).unwrap();
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_teapot_refusal_withholds_endorsement() {
    let server = DecisionServer::start(status_only_refusing("admin")).await;
    let plugin = initialized_plugin(&server.endpoint);
    let proposal = client_identity().signed_proposal("models", "tx-418", vec![]);

    let err = plugin
        .endorse(outcome_writing("model", &[("admin", b"root")]), &proposal)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), EndorsementStage::Evaluation);
    assert!(err.to_string().contains("418"));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_policy_veto_withholds_endorsement() {
    let server = DecisionServer::start(reject_writes_to("admin")).await;
    let plugin = initialized_plugin(&server.endpoint);
    let proposal = client_identity().signed_proposal("models", "tx-veto", vec![]);

    let err = plugin
        .endorse(outcome_writing("model", &[("admin", b"root")]), &proposal)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), EndorsementStage::Rejected);
    assert!(matches!(
        err,
        EndorsementError::EvaluationRejected { reason: Some(ref r) } if r == "write to admin not allowed"
    ));

    // The same plugin still endorses an acceptable effect set.
    assert!(plugin
        .endorse(outcome_writing("model", &[("weights", b"ok")]), &proposal)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_server_error_fails_closed() {
    let server =
        DecisionServer::start(respond_with(StatusCode::SERVICE_UNAVAILABLE, "retry later")).await;
    let plugin = initialized_plugin(&server.endpoint);
    let proposal = client_identity().signed_proposal("models", "tx-503", vec![]);

    let err = plugin
        .endorse(outcome_writing("model", &[("k", b"v")]), &proposal)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), EndorsementStage::Evaluation);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_unreadable_verdict_fails_closed() {
    let server =
        DecisionServer::start(respond_with(StatusCode::OK, r#"{"approved":"maybe"}"#)).await;
    let plugin = initialized_plugin(&server.endpoint);
    let proposal = client_identity().signed_proposal("models", "tx-junk", vec![]);

    let err = plugin
        .endorse(outcome_writing("model", &[("k", b"v")]), &proposal)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), EndorsementStage::Evaluation);
}

#[tokio::test]
async fn test_unreachable_service_fails_closed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let plugin = initialized_plugin(&format!("http://{addr}/evaluate"));
    let proposal = client_identity().signed_proposal("models", "tx-down", vec![]);

    let err = plugin
        .endorse(outcome_writing("model", &[("k", b"v")]), &proposal)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), EndorsementStage::Evaluation);
}

#[tokio::test]
async fn test_unsigned_proposal_never_reaches_service() {
    let server = DecisionServer::start(approve_all()).await;
    let plugin = initialized_plugin(&server.endpoint);
    let mut proposal = client_identity().signed_proposal("models", "tx-unsigned", vec![]);
    proposal.signature.clear();

    let err = plugin
        .endorse(outcome_writing("model", &[("k", b"v")]), &proposal)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), EndorsementStage::Identity);
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn test_undecodable_outcome_never_reaches_service() {
    let server = DecisionServer::start(approve_all()).await;
    let plugin = initialized_plugin(&server.endpoint);
    let proposal = client_identity().signed_proposal("models", "tx-garbage", vec![]);

    let err = plugin
        .endorse(b"definitely not protobuf".to_vec(), &proposal)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), EndorsementStage::Decode);
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn test_uninitialized_plugin_refuses() {
    let server = DecisionServer::start(approve_all()).await;
    let plugin = factory_for(&server.endpoint).create();

    let err = plugin
        .endorse(outcome_writing("model", &[("k", b"v")]), &SignedProposal::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EndorsementError::MissingCapability { .. }));
    assert_eq!(server.hits(), 0);
}
