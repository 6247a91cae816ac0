//! # Shared Types Crate
//!
//! Wire-level contract types exchanged between the host pipeline, the
//! endorsement gate and its collaborators.
//!
//! ## Design Principles
//!
//! - **Protobuf-compatible**: every message keeps the field tags used on the
//!   ledger wire, so bytes produced by the host decode without translation.
//! - **Unknown fields are tolerated**: only the fields the gate consumes are
//!   declared; anything else on the wire is skipped by the decoder.
//! - **Checked decoding**: [`decode_message`] is the single entry point for
//!   turning bytes into a message and always names the message that failed.

pub mod entities;
pub mod errors;
pub mod rwset;

pub use entities::*;
pub use errors::*;
pub use rwset::*;

use prost::Message;

/// Decode `bytes` as message `M`, tagging any failure with `message`.
pub fn decode_message<M: Message + Default>(
    bytes: &[u8],
    message: &'static str,
) -> Result<M, WireError> {
    M::decode(bytes).map_err(|source| WireError::Decode { message, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message_names_failing_message() {
        // Field 1, wire type 2 (length-delimited), length 10, but no payload.
        let truncated = [0x0a, 0x0a];
        let err = decode_message::<ProposalResponsePayload>(&truncated, "ProposalResponsePayload")
            .unwrap_err();
        assert!(err.to_string().contains("ProposalResponsePayload"));
    }

    #[test]
    fn test_decode_message_skips_unknown_fields() {
        // Field 15 (varint) is not declared on SerializedIdentity.
        let mut bytes = SerializedIdentity {
            mspid: "Org1MSP".to_string(),
            id_bytes: vec![1, 2, 3],
        }
        .encode_to_vec();
        bytes.extend_from_slice(&[0x78, 0x01]);

        let identity: SerializedIdentity = decode_message(&bytes, "SerializedIdentity").unwrap();
        assert_eq!(identity.mspid, "Org1MSP");
        assert_eq!(identity.id_bytes, vec![1, 2, 3]);
    }
}
