//! # Endorsement Errors
//!
//! Every failure of an endorsement attempt is terminal for that attempt and
//! is reported with the stage it happened in. None of them carry a signature.

use crate::domain::entities::EndorsementStage;
use crate::ports::outbound::{DecisionError, IdentityError};
use shared_crypto::CryptoError;
use shared_types::WireError;
use thiserror::Error;

/// Errors that can occur while endorsing a proposal.
#[derive(Debug, Clone, Error)]
pub enum EndorsementError {
    /// A required host capability was never supplied.
    #[error("Missing capability: {capability}")]
    MissingCapability {
        /// Name of the missing capability
        capability: &'static str,
    },

    /// `initialize` was called on an already initialized plugin.
    #[error("Plugin already initialized")]
    AlreadyInitialized,

    /// The signing identity for the proposal could not be resolved.
    #[error("Failed fetching signing identity: {0}")]
    IdentityResolution(#[source] IdentityError),

    /// The signing identity could not be serialized.
    #[error("Could not serialize the signing identity: {0}")]
    Serialization(#[source] IdentityError),

    /// The outcome could not be signed.
    #[error("Could not sign the proposal response payload: {0}")]
    Signing(#[source] IdentityError),

    /// The outcome is larger than the configured limit.
    #[error("Proposal response payload too large: {size} bytes (limit {limit})")]
    OutcomeTooLarge {
        /// Outcome size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The outcome could not be decoded down to its read/write set.
    #[error("Could not decode proposal response payload: {0}")]
    Decode(#[source] WireError),

    /// The effect set could not be encoded for evaluation.
    #[error("Could not encode effect set: {0}")]
    EffectSetEncoding(String),

    /// The decision service could not be consulted or gave no usable answer.
    #[error("Could not evaluate effect set: {0}")]
    EvaluationTransport(#[source] DecisionError),

    /// The decision service explicitly rejected the effect set.
    #[error("Effect set rejected by decision service: {}", .reason.as_deref().unwrap_or("no reason given"))]
    EvaluationRejected {
        /// Diagnostic detail from the service, if any
        reason: Option<String>,
    },
}

impl EndorsementError {
    /// The stage at which the attempt stopped.
    pub fn stage(&self) -> EndorsementStage {
        match self {
            EndorsementError::MissingCapability { .. } | EndorsementError::AlreadyInitialized => {
                EndorsementStage::Initialization
            }
            EndorsementError::IdentityResolution(_) => EndorsementStage::Identity,
            EndorsementError::Serialization(_) | EndorsementError::Signing(_) => {
                EndorsementStage::Signing
            }
            EndorsementError::OutcomeTooLarge { .. }
            | EndorsementError::Decode(_)
            | EndorsementError::EffectSetEncoding(_) => EndorsementStage::Decode,
            EndorsementError::EvaluationTransport(_) => EndorsementStage::Evaluation,
            EndorsementError::EvaluationRejected { .. } => EndorsementStage::Rejected,
        }
    }
}

/// Errors from checking an endorsement after the fact.
#[derive(Debug, Clone, Error)]
pub enum VerificationError {
    /// The endorser field is not a serialized identity.
    #[error("Invalid endorser identity: {0}")]
    InvalidEndorser(#[source] WireError),

    /// The identity's key or the signature is malformed, or they do not match.
    #[error("Invalid endorsement signature: {0}")]
    InvalidSignature(#[source] CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        let cases = [
            (
                EndorsementError::MissingCapability {
                    capability: "SigningIdentityFetcher",
                },
                EndorsementStage::Initialization,
            ),
            (
                EndorsementError::IdentityResolution(IdentityError::Unauthenticated(
                    "unsigned".into(),
                )),
                EndorsementStage::Identity,
            ),
            (
                EndorsementError::Serialization(IdentityError::Serialization("x".into())),
                EndorsementStage::Signing,
            ),
            (
                EndorsementError::OutcomeTooLarge { size: 2, limit: 1 },
                EndorsementStage::Decode,
            ),
            (
                EndorsementError::EvaluationTransport(DecisionError::Timeout(
                    std::time::Duration::from_secs(1),
                )),
                EndorsementStage::Evaluation,
            ),
            (
                EndorsementError::EvaluationRejected { reason: None },
                EndorsementStage::Rejected,
            ),
        ];

        for (err, stage) in cases {
            assert_eq!(err.stage(), stage, "{err}");
        }
    }

    #[test]
    fn test_rejected_message_includes_reason() {
        let err = EndorsementError::EvaluationRejected {
            reason: Some("accuracy below threshold".into()),
        };
        assert!(err.to_string().contains("accuracy below threshold"));

        let err = EndorsementError::EvaluationRejected { reason: None };
        assert!(err.to_string().contains("no reason given"));
    }

    #[test]
    fn test_identity_error_is_wrapped_with_context() {
        let err = EndorsementError::IdentityResolution(IdentityError::Unauthenticated(
            "unauthenticated caller".into(),
        ));
        assert!(err.to_string().starts_with("Failed fetching signing identity"));
        assert!(err.to_string().contains("unauthenticated caller"));
    }
}
