//! # Endorsement Gate
//!
//! Endorsement plugin for a permissioned ledger. Every proposal outcome is
//! bound to the endorser's identity by signature, and the proposal's
//! read/write set is submitted to an external decision service that may veto
//! the endorsement.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): identity binding, effect-set extraction,
//!   verdicts and errors. No network I/O.
//! - **Ports Layer** (`ports/`): the plugin API the host drives, and the
//!   identity and decision-service capabilities the gate consumes
//! - **Adapters Layer** (`adapters/`): HTTP decision service, local keystore
//! - **Service Layer** (`service.rs`): the gate that wires it all together
//!
//! ## Endorsement Flow
//!
//! ```text
//! SignedProposal ──→ IdentityBinder::resolve_signer
//!                          │
//!                          ↓
//! outcome bytes ──→ IdentityBinder::bind ──→ (signature, identity)  [held]
//!                          │
//!                          ↓
//!                 extract_effect_set ──→ canonical JSON
//!                          │
//!                          ↓
//!                 DecisionService::evaluate
//!                          │
//!             ┌────────────┴────────────┐
//!          approved                 anything else
//!             │                         │
//!   (Endorsement, outcome)     EndorsementError (signature dropped)
//! ```
//!
//! ## Security Notes
//!
//! - **Fail-closed**: transport errors, timeouts, non-2xx statuses and
//!   unreadable verdicts all withhold the endorsement
//! - **Signed bytes**: the signature covers `outcome ‖ serialized_identity`,
//!   so the endorser cannot be swapped after signing
//! - **Single shot**: one evaluation call per proposal, never retried here

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod factory;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{HttpDecisionService, KeystoreIdentityFetcher, LocalSigningIdentity};
pub use config::{ConfigError, DecisionServiceConfig, GateConfig};
pub use domain::binder::{BoundSignature, IdentityBinder};
pub use domain::effect_set::{extract_effect_set, EffectSet, EffectSetSummary};
pub use domain::entities::{EndorsementStage, Verdict};
pub use domain::errors::{EndorsementError, VerificationError};
pub use domain::verification::verify_endorsement;
pub use factory::ModelEndorsementFactory;
pub use ports::inbound::{Dependency, EndorsementPlugin, EndorsementPluginFactory};
pub use ports::outbound::{
    DecisionError, DecisionService, IdentityError, SigningIdentity, SigningIdentityFetcher,
};
pub use service::EndorsementGate;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
