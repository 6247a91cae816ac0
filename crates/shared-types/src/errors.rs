//! # Error Types
//!
//! Errors raised while reading wire messages.

use thiserror::Error;

/// Errors that can occur while decoding wire messages.
#[derive(Debug, Clone, Error)]
pub enum WireError {
    /// The bytes are not a valid encoding of the named message.
    #[error("Failed to decode {message}: {source}")]
    Decode {
        message: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    /// A message decoded but a field the caller requires is absent.
    #[error("Missing field {field} in {message}")]
    MissingField {
        message: &'static str,
        field: &'static str,
    },
}
