//! Shared fixtures: identities, encoded outcomes and a stand-in decision
//! service that applies a policy to the JSON it receives.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use endorsement_gate::{
    DecisionServiceConfig, Dependency, EndorsementPlugin, EndorsementPluginFactory, GateConfig,
    HttpDecisionService, KeystoreIdentityFetcher, LocalSigningIdentity, ModelEndorsementFactory,
};
use parking_lot::Mutex;
use prost::Message;
use serde_json::Value;
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    ChaincodeAction, KvRead, KvRwSet, KvWrite, NsReadWriteSet, ProposalResponsePayload,
    TxReadWriteSet, Version,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Seed of the endorsing peer's key.
pub const PEER_SEED: [u8; 32] = [0x11; 32];

/// Seed of the proposing client's key.
pub const CLIENT_SEED: [u8; 32] = [0x22; 32];

/// The endorsing peer.
pub fn peer_identity() -> LocalSigningIdentity {
    LocalSigningIdentity::new("PeerOrgMSP", Ed25519KeyPair::from_seed(PEER_SEED))
}

/// The proposing client.
pub fn client_identity() -> LocalSigningIdentity {
    LocalSigningIdentity::new("ClientOrgMSP", Ed25519KeyPair::from_seed(CLIENT_SEED))
}

/// Encode an outcome whose single namespace reads and writes `writes`.
pub fn outcome_writing(namespace: &str, writes: &[(&str, &[u8])]) -> Vec<u8> {
    let kv = KvRwSet {
        reads: writes
            .iter()
            .map(|(key, _)| KvRead {
                key: key.to_string(),
                version: Some(Version {
                    block_num: 3,
                    tx_num: 1,
                }),
            })
            .collect(),
        writes: writes
            .iter()
            .map(|(key, value)| KvWrite {
                key: key.to_string(),
                is_delete: false,
                value: value.to_vec(),
            })
            .collect(),
        ..Default::default()
    };
    let tx_rwset = TxReadWriteSet {
        data_model: 0,
        ns_rwset: vec![NsReadWriteSet {
            namespace: namespace.to_string(),
            rwset: kv.encode_to_vec(),
            collection_hashed_rwset: vec![],
        }],
    };
    let action = ChaincodeAction {
        results: tx_rwset.encode_to_vec(),
        ..Default::default()
    };
    ProposalResponsePayload {
        proposal_hash: vec![0x5A; 32],
        extension: action.encode_to_vec(),
    }
    .encode_to_vec()
}

/// Decides a response for each request body.
pub type Policy = Arc<dyn Fn(&Value) -> (StatusCode, String) + Send + Sync>;

/// Approve everything with an empty body.
pub fn approve_all() -> Policy {
    Arc::new(|_| (StatusCode::OK, String::new()))
}

/// Approve the way a Flask evaluator does: status 200 and `{"status": 200}`.
/// Effect sets writing `key` are refused with 418.
pub fn status_only_refusing(key: &'static str) -> Policy {
    Arc::new(move |effect_set| {
        if writes_key(effect_set, key) {
            (StatusCode::IM_A_TEAPOT, String::new())
        } else {
            (StatusCode::OK, r#"{"status":200}"#.to_string())
        }
    })
}

/// Answer every request with `status` and `body`.
pub fn respond_with(status: StatusCode, body: &'static str) -> Policy {
    Arc::new(move |_| (status, body.to_string()))
}

/// Reject any effect set that writes `key`; approve the rest explicitly.
pub fn reject_writes_to(key: &'static str) -> Policy {
    Arc::new(move |effect_set| {
        if writes_key(effect_set, key) {
            (
                StatusCode::OK,
                format!(r#"{{"approved":false,"reason":"write to {key} not allowed"}}"#),
            )
        } else {
            (StatusCode::OK, r#"{"approved":true}"#.to_string())
        }
    })
}

fn writes_key(effect_set: &Value, key: &str) -> bool {
    effect_set["NsRwSets"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|ns| ns["KvRwSet"]["writes"].as_array())
        .flatten()
        .any(|write| write["key"] == key)
}

#[derive(Clone)]
struct ServerState {
    policy: Policy,
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn evaluate(State(state): State<ServerState>, body: Bytes) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let effect_set = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let response = (state.policy)(&effect_set);
    state.bodies.lock().push(effect_set);
    response
}

/// A decision service on an ephemeral local port.
pub struct DecisionServer {
    /// URL to POST effect sets to.
    pub endpoint: String,
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl DecisionServer {
    /// Start serving `policy`.
    pub async fn start(policy: Policy) -> Self {
        let state = ServerState {
            policy,
            hits: Arc::new(AtomicUsize::new(0)),
            bodies: Arc::new(Mutex::new(Vec::new())),
        };
        let hits = Arc::clone(&state.hits);
        let bodies = Arc::clone(&state.bodies);
        let router = Router::new()
            .route("/evaluate", post(evaluate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            endpoint: format!("http://{addr}/evaluate"),
            hits,
            bodies,
        }
    }

    /// Requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Parsed request bodies, in arrival order.
    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().clone()
    }
}

/// A factory whose gates talk to `endpoint`.
pub fn factory_for(endpoint: &str) -> ModelEndorsementFactory<HttpDecisionService> {
    let service = HttpDecisionService::new(&DecisionServiceConfig::new(endpoint)).unwrap();
    ModelEndorsementFactory::new(GateConfig::default(), service).unwrap()
}

/// A plugin initialized the way a host would, with the peer's keystore.
pub fn initialized_plugin(endpoint: &str) -> Box<dyn EndorsementPlugin> {
    let plugin = factory_for(endpoint).create();
    plugin
        .initialize(vec![
            Dependency::Other(Arc::new("ledger-state")),
            Dependency::SigningIdentityFetcher(Arc::new(KeystoreIdentityFetcher::new(
                peer_identity(),
            ))),
        ])
        .unwrap();
    plugin
}
