//! # Runtime Configuration
//!
//! Settings for the local signing identity and logging. Decision-service
//! and gate settings are loaded by the gate crate's own config types.

use endorsement_gate::LocalSigningIdentity;
use shared_crypto::{CryptoError, Ed25519KeyPair};
use std::env;
use tracing::warn;

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// MSP of the local signing identity.
    pub mspid: String,
    /// Log filter directive.
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mspid: "Org1MSP".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ENDORSER_MSP_ID`: MSP of the local identity (default: Org1MSP)
    /// - `ENDORSER_LOG_LEVEL` or `RUST_LOG`: log filter (default: info)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            mspid: lookup("ENDORSER_MSP_ID").unwrap_or(defaults.mspid),
            log_level: lookup("ENDORSER_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    }
}

/// Build the local signing identity of `mspid`.
///
/// `seed_hex` is the 32-byte Ed25519 seed (`ENDORSER_KEY_SEED`). Without one
/// an ephemeral key is generated, which is only useful for trying things out.
pub fn load_identity(
    mspid: &str,
    seed_hex: Option<&str>,
) -> Result<LocalSigningIdentity, CryptoError> {
    let keypair = match seed_hex {
        Some(seed) => Ed25519KeyPair::from_hex_seed(seed)?,
        None => {
            warn!("ENDORSER_KEY_SEED not set, using an ephemeral signing key");
            Ed25519KeyPair::generate()
        }
    };
    Ok(LocalSigningIdentity::new(mspid, keypair))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(|_| None);
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_log_level_precedence() {
        let config = RuntimeConfig::from_lookup(|name| match name {
            "ENDORSER_LOG_LEVEL" => Some("debug".to_string()),
            "RUST_LOG" => Some("warn".to_string()),
            _ => None,
        });
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_seeded_identity_is_stable() {
        let seed = "01".repeat(32);
        let a = load_identity("Org1MSP", Some(&seed)).unwrap();
        let b = load_identity("Org1MSP", Some(&seed)).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.mspid(), "Org1MSP");
    }

    #[test]
    fn test_bad_seed() {
        assert!(matches!(
            load_identity("Org1MSP", Some("zz")),
            Err(CryptoError::InvalidSeed(_))
        ));
        assert!(matches!(
            load_identity("Org1MSP", Some("0102")),
            Err(CryptoError::InvalidKeyLength { actual: 2, .. })
        ));
    }
}
