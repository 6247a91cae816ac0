//! # Endorsement Gate Test Suite
//!
//! End-to-end flows through the real adapters: keystore identity
//! resolution, the HTTP decision service, and the gate between them.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Identities, outcomes, stand-in decision server
//! └── integration/
//!     ├── endorsement_flow.rs   # Approve / reject / abort paths
//!     └── concurrency.rs        # Many proposals in flight
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p endorsement-tests
//! cargo test -p endorsement-tests integration::concurrency
//! ```

pub mod fixtures;
pub mod integration;
