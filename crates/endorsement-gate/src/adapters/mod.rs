//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

pub mod http_decision;
pub mod keystore;

pub use http_decision::HttpDecisionService;
pub use keystore::{KeystoreIdentityFetcher, LocalSigningIdentity};
