//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: plugin API the host pipeline calls
//! - **Outbound (Driven)**: identity and decision-service capabilities

pub mod inbound;
pub mod outbound;
