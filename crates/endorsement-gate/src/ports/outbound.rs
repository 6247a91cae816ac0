//! # Outbound Ports (Driven Ports / SPI)
//!
//! Capabilities the gate consumes but does not own:
//! - identity resolution and signing (keystore / MSP subsystem)
//! - effect-set evaluation (external decision service)

use crate::domain::entities::Verdict;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::SignedProposal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Identity
// =============================================================================

/// Errors raised by the identity capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The proposal could not be parsed far enough to find its creator.
    #[error("Malformed proposal: {0}")]
    MalformedProposal(String),

    /// The proposal is unsigned or its signature does not match the creator.
    #[error("Unauthenticated caller: {0}")]
    Unauthenticated(String),

    /// No local signer is configured for the request.
    #[error("No signing identity available: {0}")]
    NoSigner(String),

    /// The identity could not be serialized.
    #[error("Identity serialization failed: {0}")]
    Serialization(String),

    /// The signer refused or failed to sign.
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// A resolved signing identity.
///
/// Implementations must be safe for concurrent use.
pub trait SigningIdentity: Send + Sync {
    /// Serialize the identity as it will appear in the endorsement.
    fn serialize(&self) -> Result<Vec<u8>, IdentityError>;

    /// Sign `message` with the identity's key.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError>;
}

/// Resolves which identity signs the endorsement for a given proposal.
pub trait SigningIdentityFetcher: Send + Sync {
    /// Resolve the signing identity for `proposal`.
    ///
    /// # Errors
    /// * `IdentityError::MalformedProposal` - proposal could not be decoded
    /// * `IdentityError::Unauthenticated` - creator signature missing or invalid
    /// * `IdentityError::NoSigner` - no signer configured for the request
    fn signing_identity_for_request(
        &self,
        proposal: &SignedProposal,
    ) -> Result<Arc<dyn SigningIdentity>, IdentityError>;
}

// =============================================================================
// Decision Service
// =============================================================================

/// Errors from the decision service call. All of them withhold endorsement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecisionError {
    /// The request never produced a response (connect, TLS, I/O).
    #[error("Decision service unreachable: {0}")]
    Transport(String),

    /// No response within the configured deadline.
    #[error("Decision service timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-2xx status.
    #[error("Decision service returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// A 2xx response whose body is not a verdict.
    #[error("Malformed verdict: {0}")]
    MalformedVerdict(String),
}

/// External evaluator of effect sets.
#[async_trait]
pub trait DecisionService: Send + Sync {
    /// Submit the canonical JSON effect set and return the service's verdict.
    async fn evaluate(&self, effect_set_json: Vec<u8>) -> Result<Verdict, DecisionError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Programmable decision service that records every request.
#[derive(Debug)]
pub struct MockDecisionService {
    outcome: Result<Verdict, DecisionError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<u8>>>,
}

impl MockDecisionService {
    fn with_outcome(outcome: Result<Verdict, DecisionError>) -> Self {
        Self {
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always approves.
    pub fn approving() -> Self {
        Self::with_outcome(Ok(Verdict::approve()))
    }

    /// Always rejects with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self::with_outcome(Ok(Verdict::reject(reason)))
    }

    /// Always fails with `error`.
    pub fn failing(error: DecisionError) -> Self {
        Self::with_outcome(Err(error))
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `evaluate` calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Bodies of every request received, in order.
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl DecisionService for MockDecisionService {
    async fn evaluate(&self, effect_set_json: Vec<u8>) -> Result<Verdict, DecisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(effect_set_json);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

/// Identity fetcher that hands out one fixed identity or one fixed error.
pub struct MockIdentityFetcher {
    outcome: Result<Arc<dyn SigningIdentity>, IdentityError>,
    calls: AtomicUsize,
}

impl MockIdentityFetcher {
    /// Resolve every proposal to `identity`.
    pub fn returning(identity: Arc<dyn SigningIdentity>) -> Self {
        Self {
            outcome: Ok(identity),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every resolution with `error`.
    pub fn failing(error: IdentityError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of resolutions attempted.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SigningIdentityFetcher for MockIdentityFetcher {
    fn signing_identity_for_request(
        &self,
        _proposal: &SignedProposal,
    ) -> Result<Arc<dyn SigningIdentity>, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Wraps another identity and injects serialize/sign failures.
pub struct MockSigningIdentity {
    inner: Box<dyn SigningIdentity>,
    /// Fail `serialize`.
    pub fail_serialize: bool,
    /// Fail `sign`.
    pub fail_sign: bool,
    signatures: AtomicUsize,
}

impl MockSigningIdentity {
    /// Wrap `inner` with no failures enabled.
    pub fn new(inner: Box<dyn SigningIdentity>) -> Self {
        Self {
            inner,
            fail_serialize: false,
            fail_sign: false,
            signatures: AtomicUsize::new(0),
        }
    }

    /// Number of signatures produced.
    pub fn signature_count(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

impl SigningIdentity for MockSigningIdentity {
    fn serialize(&self) -> Result<Vec<u8>, IdentityError> {
        if self.fail_serialize {
            return Err(IdentityError::Serialization("mock serialize failure".to_string()));
        }
        self.inner.serialize()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        if self.fail_sign {
            return Err(IdentityError::Signing("mock sign failure".to_string()));
        }
        self.signatures.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(message)
    }
}
