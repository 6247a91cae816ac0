//! # Endorsement Runtime
//!
//! Command-line host for the endorsement gate.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Build the local signing identity and keystore fetcher
//! 3. Build the HTTP decision service (endpoint validated here)
//! 4. Create a gate through the plugin factory and initialize it
//! 5. Run the requested command

pub mod config;

use anyhow::{Context, Result};
use endorsement_gate::{
    DecisionServiceConfig, Dependency, EndorsementError, EndorsementPlugin,
    EndorsementPluginFactory, GateConfig, HttpDecisionService, KeystoreIdentityFetcher,
    LocalSigningIdentity, ModelEndorsementFactory, SigningIdentity,
};
use prost::Message;
use serde_json::{json, Value};
use shared_types::{Endorsement, SignedProposal};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub use config::{load_identity, RuntimeConfig};

/// Create an initialized gate that signs as `identity` and asks the service
/// at `decision` for verdicts.
pub fn build_plugin(
    identity: LocalSigningIdentity,
    decision: &DecisionServiceConfig,
    gate: GateConfig,
) -> Result<Box<dyn EndorsementPlugin>> {
    let service =
        HttpDecisionService::new(decision).context("Invalid decision service configuration")?;
    info!("Decision service: {}", service.endpoint());

    let factory =
        ModelEndorsementFactory::new(gate, service).context("Invalid gate configuration")?;
    let plugin = factory.create();
    plugin
        .initialize(vec![Dependency::SigningIdentityFetcher(Arc::new(
            KeystoreIdentityFetcher::new(identity),
        ))])
        .context("Failed to initialize endorsement gate")?;
    Ok(plugin)
}

/// Read a file, hex-decoding its (trimmed) contents when `hex` is set.
pub fn read_bytes(path: &Path, hex: bool) -> Result<Vec<u8>> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !hex {
        return Ok(raw);
    }
    let text = String::from_utf8(raw).with_context(|| format!("{} is not text", path.display()))?;
    hex::decode(text.trim()).with_context(|| format!("{} is not valid hex", path.display()))
}

/// Read and decode a `SignedProposal`.
pub fn read_proposal(path: &Path, hex: bool) -> Result<SignedProposal> {
    let bytes = read_bytes(path, hex)?;
    SignedProposal::decode(bytes.as_slice())
        .with_context(|| format!("{} is not a SignedProposal", path.display()))
}

/// Describe the local identity as JSON.
pub fn identity_report(identity: &LocalSigningIdentity) -> Result<Value> {
    let serialized = identity
        .serialize()
        .context("Failed to serialize local identity")?;
    Ok(json!({
        "mspid": identity.mspid(),
        "public_key": hex::encode(identity.public_key().as_bytes()),
        "serialized_identity": hex::encode(serialized),
    }))
}

/// Describe an endorsement attempt as JSON.
pub fn endorsement_report(result: &Result<(Endorsement, Vec<u8>), EndorsementError>) -> Value {
    match result {
        Ok((endorsement, outcome)) => json!({
            "endorsed": true,
            "endorser": hex::encode(&endorsement.endorser),
            "signature": hex::encode(&endorsement.signature),
            "outcome_bytes": outcome.len(),
        }),
        Err(err) => json!({
            "endorsed": false,
            "stage": err.stage().as_str(),
            "error": err.to_string(),
        }),
    }
}
