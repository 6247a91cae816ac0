//! # Domain Layer
//!
//! Identity binding, effect-set extraction and verdict handling.
//! No network I/O happens here.

pub mod binder;
pub mod effect_set;
pub mod entities;
pub mod errors;
pub mod verification;
