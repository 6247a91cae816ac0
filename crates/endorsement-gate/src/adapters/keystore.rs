//! # Local Keystore Adapter
//!
//! Ed25519 signing identities held in process, and a fetcher that
//! authenticates a proposal's creator before handing out a signer.
//!
//! A `SerializedIdentity` produced here carries the raw 32-byte public key in
//! `id_bytes`; creators are expected to use the same encoding.

use crate::ports::outbound::{IdentityError, SigningIdentity, SigningIdentityFetcher};
use prost::Message;
use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::{
    decode_message, ChannelHeader, Header, Proposal, SerializedIdentity, SignatureHeader,
    SignedProposal, WireError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// An MSP identity backed by an in-memory Ed25519 key.
#[derive(Debug)]
pub struct LocalSigningIdentity {
    mspid: String,
    keypair: Ed25519KeyPair,
    serialized: Vec<u8>,
}

impl LocalSigningIdentity {
    /// Create an identity of `mspid` signing with `keypair`.
    pub fn new(mspid: impl Into<String>, keypair: Ed25519KeyPair) -> Self {
        let mspid = mspid.into();
        let serialized = SerializedIdentity {
            mspid: mspid.clone(),
            id_bytes: keypair.public_key().as_bytes().to_vec(),
        }
        .encode_to_vec();
        Self {
            mspid,
            keypair,
            serialized,
        }
    }

    /// Membership service provider the identity belongs to.
    pub fn mspid(&self) -> &str {
        &self.mspid
    }

    /// The identity's public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Build a proposal on `channel_id` created and signed by this identity.
    pub fn signed_proposal(&self, channel_id: &str, tx_id: &str, payload: Vec<u8>) -> SignedProposal {
        let channel_header = ChannelHeader {
            r#type: 3,
            channel_id: channel_id.to_string(),
            tx_id: tx_id.to_string(),
            ..Default::default()
        };
        let signature_header = SignatureHeader {
            creator: self.serialized.clone(),
            nonce: tx_id.as_bytes().to_vec(),
        };
        let header = Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: signature_header.encode_to_vec(),
        };
        let proposal_bytes = Proposal {
            header: header.encode_to_vec(),
            payload,
            extension: vec![],
        }
        .encode_to_vec();

        let signature = self.keypair.sign(&proposal_bytes).to_vec();
        SignedProposal {
            proposal_bytes,
            signature,
        }
    }
}

impl SigningIdentity for LocalSigningIdentity {
    fn serialize(&self) -> Result<Vec<u8>, IdentityError> {
        Ok(self.serialized.clone())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        Ok(self.keypair.sign(message).to_vec())
    }
}

/// What the fetcher learned from a proposal.
struct ProposalOrigin {
    channel_id: String,
    creator: SerializedIdentity,
}

fn malformed(err: WireError) -> IdentityError {
    IdentityError::MalformedProposal(err.to_string())
}

/// Decode the proposal far enough to find its channel and creator, then
/// check the creator's signature over `proposal_bytes`.
fn authenticate(proposal: &SignedProposal) -> Result<ProposalOrigin, IdentityError> {
    let body: Proposal = decode_message(&proposal.proposal_bytes, "Proposal").map_err(malformed)?;
    let header: Header = decode_message(&body.header, "Header").map_err(malformed)?;
    let channel_header: ChannelHeader =
        decode_message(&header.channel_header, "ChannelHeader").map_err(malformed)?;
    let signature_header: SignatureHeader =
        decode_message(&header.signature_header, "SignatureHeader").map_err(malformed)?;

    if signature_header.creator.is_empty() {
        return Err(malformed(WireError::MissingField {
            message: "SignatureHeader",
            field: "creator",
        }));
    }
    let creator: SerializedIdentity =
        decode_message(&signature_header.creator, "SerializedIdentity").map_err(malformed)?;

    if proposal.signature.is_empty() {
        return Err(IdentityError::Unauthenticated("proposal is not signed".into()));
    }
    let public_key = Ed25519PublicKey::from_slice(&creator.id_bytes).map_err(|e| {
        IdentityError::Unauthenticated(format!("creator of {} has no usable key: {e}", creator.mspid))
    })?;
    let signature = Ed25519Signature::from_slice(&proposal.signature)
        .map_err(|e| IdentityError::Unauthenticated(e.to_string()))?;
    public_key
        .verify(&proposal.proposal_bytes, &signature)
        .map_err(|_| {
            IdentityError::Unauthenticated(format!(
                "signature does not match creator of {}",
                creator.mspid
            ))
        })?;

    Ok(ProposalOrigin {
        channel_id: channel_header.channel_id,
        creator,
    })
}

/// Resolves the local signer for a proposal after authenticating its creator.
///
/// Channels may have their own signer; everything else uses the default.
#[derive(Default)]
pub struct KeystoreIdentityFetcher {
    default_signer: Option<Arc<LocalSigningIdentity>>,
    channel_signers: HashMap<String, Arc<LocalSigningIdentity>>,
}

impl KeystoreIdentityFetcher {
    /// Sign for every channel with `identity`.
    pub fn new(identity: LocalSigningIdentity) -> Self {
        Self {
            default_signer: Some(Arc::new(identity)),
            channel_signers: HashMap::new(),
        }
    }

    /// Sign for `channel_id` with `identity` instead of the default.
    pub fn with_channel_signer(
        mut self,
        channel_id: impl Into<String>,
        identity: LocalSigningIdentity,
    ) -> Self {
        self.channel_signers
            .insert(channel_id.into(), Arc::new(identity));
        self
    }
}

impl SigningIdentityFetcher for KeystoreIdentityFetcher {
    fn signing_identity_for_request(
        &self,
        proposal: &SignedProposal,
    ) -> Result<Arc<dyn SigningIdentity>, IdentityError> {
        let origin = authenticate(proposal)?;

        let signer = self
            .channel_signers
            .get(&origin.channel_id)
            .or(self.default_signer.as_ref())
            .ok_or_else(|| {
                IdentityError::NoSigner(format!("no signer for channel {:?}", origin.channel_id))
            })?;

        debug!(
            "[keystore] Creator {} authenticated, signing as {} on channel {:?}",
            origin.creator.mspid,
            signer.mspid(),
            origin.channel_id
        );
        Ok(Arc::clone(signer) as Arc<dyn SigningIdentity>)
    }
}
