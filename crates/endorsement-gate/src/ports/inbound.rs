//! # Inbound Ports (Driving Ports / API)
//!
//! The plugin contract the host pipeline drives: one `initialize` call with
//! the host's capabilities, then any number of concurrent `endorse` calls.

use crate::domain::errors::EndorsementError;
use crate::ports::outbound::SigningIdentityFetcher;
use async_trait::async_trait;
use shared_types::{Endorsement, SignedProposal};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A capability handed to a plugin by the host at initialization.
#[derive(Clone)]
pub enum Dependency {
    /// Resolves the signing identity to use for a proposal.
    SigningIdentityFetcher(Arc<dyn SigningIdentityFetcher>),
    /// Any other host capability. Plugins skip what they do not consume.
    Other(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::SigningIdentityFetcher(_) => f.write_str("SigningIdentityFetcher"),
            Dependency::Other(_) => f.write_str("Other"),
        }
    }
}

/// Endorsement plugin API.
///
/// Implementations must be thread-safe (`Send + Sync`): the host calls
/// `endorse` concurrently for independent proposals.
#[async_trait]
pub trait EndorsementPlugin: Send + Sync {
    /// Bind the capabilities this plugin needs.
    ///
    /// # Errors
    /// * `EndorsementError::MissingCapability` - no identity fetcher supplied
    /// * `EndorsementError::AlreadyInitialized` - called a second time
    fn initialize(&self, dependencies: Vec<Dependency>) -> Result<(), EndorsementError>;

    /// Endorse a proposal outcome.
    ///
    /// On success returns the endorsement together with the outcome bytes,
    /// unmodified. On failure nothing derived from the signature is returned.
    async fn endorse(
        &self,
        outcome: Vec<u8>,
        proposal: &SignedProposal,
    ) -> Result<(Endorsement, Vec<u8>), EndorsementError>;
}

/// Creates fresh, uninitialized plugin instances (one per channel).
pub trait EndorsementPluginFactory: Send + Sync {
    /// Create a new plugin. The host must `initialize` it before use.
    fn create(&self) -> Box<dyn EndorsementPlugin>;
}
