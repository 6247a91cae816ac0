//! # Domain Entities
//!
//! Verdicts and the stages of a single endorsement attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The decision service's answer for one effect set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// `true` only on explicit approval.
    pub approved: bool,
    /// Optional diagnostic detail from the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    /// An approval without diagnostic detail.
    pub fn approve() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    /// A rejection carrying `reason`.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
        }
    }
}

/// Stage of the endorsement state machine at which an attempt stopped.
///
/// ```text
/// START → IDENTITY_RESOLVED → SIGNED → EFFECTSET_EXTRACTED → EVALUATED
///   │            │               │               │               ├─→ APPROVED
///   │            │               │               │               └─→ REJECTED
///   └────────────┴───────────────┴───────────────┴─────────────────→ ABORTED
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndorsementStage {
    /// The plugin was used before (or without) its identity capability.
    Initialization,
    /// Resolving the signing identity for the proposal.
    Identity,
    /// Serializing the identity or signing the outcome.
    Signing,
    /// Decoding the outcome or encoding its effect set.
    Decode,
    /// Calling the decision service.
    Evaluation,
    /// The decision service explicitly rejected the effect set.
    Rejected,
}

impl EndorsementStage {
    /// Stable lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndorsementStage::Initialization => "initialization",
            EndorsementStage::Identity => "identity",
            EndorsementStage::Signing => "signing",
            EndorsementStage::Decode => "decode",
            EndorsementStage::Evaluation => "evaluation",
            EndorsementStage::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EndorsementStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
