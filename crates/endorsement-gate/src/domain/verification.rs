//! Checking an endorsement against the outcome it claims to endorse.

use crate::domain::errors::VerificationError;
use shared_crypto::{Ed25519PublicKey, Ed25519Signature};
use shared_types::{decode_message, Endorsement, SerializedIdentity};

/// Verify that `endorsement.signature` is the endorser's signature over
/// `outcome ‖ endorsement.endorser`.
///
/// The endorser's `id_bytes` are taken to be a raw Ed25519 public key.
/// Returns the decoded endorser identity on success.
pub fn verify_endorsement(
    endorsement: &Endorsement,
    outcome: &[u8],
) -> Result<SerializedIdentity, VerificationError> {
    let identity: SerializedIdentity = decode_message(&endorsement.endorser, "SerializedIdentity")
        .map_err(VerificationError::InvalidEndorser)?;

    let public_key = Ed25519PublicKey::from_slice(&identity.id_bytes)
        .map_err(VerificationError::InvalidSignature)?;
    let signature = Ed25519Signature::from_slice(&endorsement.signature)
        .map_err(VerificationError::InvalidSignature)?;

    public_key
        .verify(
            &Endorsement::signed_bytes(outcome, &endorsement.endorser),
            &signature,
        )
        .map_err(VerificationError::InvalidSignature)?;

    Ok(identity)
}
