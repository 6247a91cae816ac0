//! Many endorsements in flight on one plugin. Each result must match its own
//! proposal: no cross-talk between signatures, outcomes or verdicts.

use crate::fixtures::*;
use endorsement_gate::{verify_endorsement, EndorsementStage};
use std::sync::Arc;

const IN_FLIGHT: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_endorsements_are_independent() {
    let server = DecisionServer::start(reject_writes_to("blocked")).await;
    let plugin = Arc::new(initialized_plugin(&server.endpoint));
    let client = Arc::new(client_identity());

    let handles: Vec<_> = (0..IN_FLIGHT)
        .map(|i| {
            let plugin = Arc::clone(&plugin);
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                // Every fourth proposal writes the blocked key.
                let key = if i % 4 == 0 {
                    "blocked".to_string()
                } else {
                    format!("key-{i}")
                };
                let value = format!("value-{i}");
                let outcome = outcome_writing("model", &[(key.as_str(), value.as_bytes())]);
                let proposal = client.signed_proposal("models", &format!("tx-{i}"), vec![]);

                let result = plugin.endorse(outcome.clone(), &proposal).await;
                (i, outcome, result)
            })
        })
        .collect();

    let mut endorsed = 0;
    let mut rejected = 0;
    for handle in handles {
        let (i, outcome, result) = handle.await.unwrap();
        match result {
            Ok((endorsement, returned)) => {
                assert_ne!(i % 4, 0, "proposal {i} should have been vetoed");
                assert_eq!(returned, outcome);
                verify_endorsement(&endorsement, &outcome).unwrap();
                endorsed += 1;
            }
            Err(err) => {
                assert_eq!(i % 4, 0, "proposal {i} failed: {err}");
                assert_eq!(err.stage(), EndorsementStage::Rejected);
                rejected += 1;
            }
        }
    }

    assert_eq!(endorsed, IN_FLIGHT * 3 / 4);
    assert_eq!(rejected, IN_FLIGHT / 4);
    assert_eq!(server.hits(), IN_FLIGHT);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_signatures_differ_per_outcome() {
    let server = DecisionServer::start(approve_all()).await;
    let plugin = Arc::new(initialized_plugin(&server.endpoint));
    let proposal = Arc::new(client_identity().signed_proposal("models", "tx", vec![]));

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let plugin = Arc::clone(&plugin);
            let proposal = Arc::clone(&proposal);
            tokio::spawn(async move {
                let outcome = outcome_writing("model", &[("k", &[i])]);
                plugin.endorse(outcome, &proposal).await.unwrap().0.signature
            })
        })
        .collect();

    let mut signatures = Vec::new();
    for handle in handles {
        signatures.push(handle.await.unwrap());
    }
    signatures.sort();
    signatures.dedup();
    assert_eq!(signatures.len(), 8);
}
