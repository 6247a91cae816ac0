//! # Identity Binder
//!
//! Resolves the signing identity for a proposal and binds an outcome to it.
//!
//! The binder holds exactly one identity capability, set once either at
//! construction or through [`IdentityBinder::initialize`]. Until then every
//! call fails with `MissingCapability`.

use crate::domain::errors::EndorsementError;
use crate::ports::inbound::Dependency;
use crate::ports::outbound::{SigningIdentity, SigningIdentityFetcher};
use shared_types::{Endorsement, SignedProposal};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

const FETCHER_CAPABILITY: &str = "SigningIdentityFetcher";

/// A signature over `outcome ‖ serialized_identity`, held until the gate
/// decides whether to release it.
#[derive(Debug)]
pub struct BoundSignature {
    signature: Vec<u8>,
    serialized_identity: Vec<u8>,
}

impl BoundSignature {
    /// Serialized identity the signature was bound to.
    pub fn serialized_identity(&self) -> &[u8] {
        &self.serialized_identity
    }

    /// Release the pair as an endorsement.
    pub fn into_endorsement(self) -> Endorsement {
        Endorsement {
            endorser: self.serialized_identity,
            signature: self.signature,
        }
    }
}

/// Resolves signers and binds outcomes to them.
#[derive(Default)]
pub struct IdentityBinder {
    fetcher: OnceLock<Arc<dyn SigningIdentityFetcher>>,
}

impl IdentityBinder {
    /// Create an uninitialized binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a binder already bound to `fetcher`.
    pub fn with_fetcher(fetcher: Arc<dyn SigningIdentityFetcher>) -> Self {
        let binder = Self::new();
        // A fresh OnceLock is always empty.
        let _ = binder.fetcher.set(fetcher);
        binder
    }

    /// Bind the first `SigningIdentityFetcher` among `dependencies`.
    ///
    /// # Errors
    /// * `MissingCapability` - no fetcher among the dependencies
    /// * `AlreadyInitialized` - a fetcher is already bound; it is kept
    pub fn initialize(&self, dependencies: Vec<Dependency>) -> Result<(), EndorsementError> {
        let mut fetchers = dependencies.into_iter().filter_map(|dep| match dep {
            Dependency::SigningIdentityFetcher(fetcher) => Some(fetcher),
            Dependency::Other(_) => None,
        });

        let fetcher = fetchers.next().ok_or(EndorsementError::MissingCapability {
            capability: FETCHER_CAPABILITY,
        })?;
        let ignored = fetchers.count();
        if ignored > 0 {
            warn!(ignored, "[binder] Multiple identity fetchers supplied, using the first");
        }

        self.fetcher
            .set(fetcher)
            .map_err(|_| EndorsementError::AlreadyInitialized)?;
        debug!("[binder] Identity fetcher bound");
        Ok(())
    }

    /// Whether an identity capability is bound.
    pub fn is_initialized(&self) -> bool {
        self.fetcher.get().is_some()
    }

    fn fetcher(&self) -> Result<&Arc<dyn SigningIdentityFetcher>, EndorsementError> {
        self.fetcher.get().ok_or(EndorsementError::MissingCapability {
            capability: FETCHER_CAPABILITY,
        })
    }

    /// Resolve the signing identity for `proposal`.
    pub fn resolve_signer(
        &self,
        proposal: &SignedProposal,
    ) -> Result<Arc<dyn SigningIdentity>, EndorsementError> {
        self.fetcher()?
            .signing_identity_for_request(proposal)
            .map_err(EndorsementError::IdentityResolution)
    }

    /// Serialize `identity`, then sign `outcome ‖ serialized_identity` with it.
    pub fn bind(
        &self,
        outcome: &[u8],
        identity: &dyn SigningIdentity,
    ) -> Result<BoundSignature, EndorsementError> {
        self.fetcher()?;

        let serialized_identity = identity
            .serialize()
            .map_err(EndorsementError::Serialization)?;
        let signature = identity
            .sign(&Endorsement::signed_bytes(outcome, &serialized_identity))
            .map_err(EndorsementError::Signing)?;

        Ok(BoundSignature {
            signature,
            serialized_identity,
        })
    }
}
