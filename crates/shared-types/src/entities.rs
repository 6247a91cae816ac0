//! # Core Wire Entities
//!
//! Proposal envelope, proposal response payload and endorsement messages.
//!
//! ## Clusters
//!
//! - **Proposal**: `SignedProposal`, `Proposal`, `Header`, `ChannelHeader`, `SignatureHeader`
//! - **Outcome**: `ProposalResponsePayload`, `ChaincodeAction`, `Response`, `ChaincodeId`
//! - **Identity**: `SerializedIdentity`
//! - **Artifact**: `Endorsement`

// =============================================================================
// CLUSTER A: THE PROPOSAL
// =============================================================================

/// A proposal as submitted by a client: the encoded `Proposal` plus the
/// creator's signature over exactly those bytes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedProposal {
    /// Encoded [`Proposal`].
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_bytes: Vec<u8>,
    /// Creator's signature over `proposal_bytes`.
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

/// The proposal body.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Proposal {
    /// Encoded [`Header`].
    #[prost(bytes = "vec", tag = "1")]
    pub header: Vec<u8>,
    /// Chaincode invocation payload (opaque here).
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub extension: Vec<u8>,
}

/// Proposal header: channel and signature headers, each encoded separately.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    /// Encoded [`ChannelHeader`].
    #[prost(bytes = "vec", tag = "1")]
    pub channel_header: Vec<u8>,
    /// Encoded [`SignatureHeader`].
    #[prost(bytes = "vec", tag = "2")]
    pub signature_header: Vec<u8>,
}

/// Channel-scoped routing information for a proposal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelHeader {
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(int32, tag = "2")]
    pub version: i32,
    #[prost(string, tag = "4")]
    pub channel_id: String,
    #[prost(string, tag = "5")]
    pub tx_id: String,
    #[prost(uint64, tag = "6")]
    pub epoch: u64,
}

/// Who created the proposal, plus an anti-replay nonce.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignatureHeader {
    /// Encoded [`SerializedIdentity`] of the creator.
    #[prost(bytes = "vec", tag = "1")]
    pub creator: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub nonce: Vec<u8>,
}

// =============================================================================
// CLUSTER B: THE PROPOSED OUTCOME
// =============================================================================

/// The outcome of simulating a proposal. Its encoding is what endorsers sign.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposalResponsePayload {
    /// Hash of the proposal that produced this outcome.
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_hash: Vec<u8>,
    /// Encoded [`ChaincodeAction`].
    #[prost(bytes = "vec", tag = "2")]
    pub extension: Vec<u8>,
}

/// The result of running chaincode for a proposal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeAction {
    /// Encoded [`crate::rwset::TxReadWriteSet`].
    #[prost(bytes = "vec", tag = "1")]
    pub results: Vec<u8>,
    /// Encoded chaincode event (opaque here).
    #[prost(bytes = "vec", tag = "2")]
    pub events: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub response: Option<Response>,
    #[prost(message, optional, tag = "4")]
    pub chaincode_id: Option<ChaincodeId>,
}

/// Chaincode response status and payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(int32, tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

/// Identifies the chaincode that produced an action.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeId {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub version: String,
}

// =============================================================================
// CLUSTER C: IDENTITY
// =============================================================================

/// An identity as it travels on the wire: owning MSP plus raw credential.
///
/// For Ed25519 identities `id_bytes` is the 32-byte verifying key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub mspid: String,
    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: Vec<u8>,
}

// =============================================================================
// CLUSTER D: THE ENDORSEMENT
// =============================================================================

/// An endorsement: the endorser's serialized identity and its signature over
/// `proposal_response_payload ‖ endorser`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Endorsement {
    /// Serialized identity of the endorser.
    #[prost(bytes = "vec", tag = "1")]
    pub endorser: Vec<u8>,
    /// Signature over the outcome bytes concatenated with `endorser`.
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

impl Endorsement {
    /// The exact byte sequence an endorser signs for `outcome`.
    pub fn signed_bytes(outcome: &[u8], endorser: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(outcome.len() + endorser.len());
        message.extend_from_slice(outcome);
        message.extend_from_slice(endorser);
        message
    }

    /// Short hex prefix of the signature, safe for logs.
    pub fn signature_prefix(&self) -> String {
        let end = self.signature.len().min(4);
        hex::encode(&self.signature[..end])
    }
}
