//! Domain layer
//!
//! Pure domain types for the secret-sharing service: the persisted
//! [`Secret`] record and the [`HandleGenerator`] that names new secrets.
//! Nothing here performs I/O.
//!
//! ## Module Organization
//!
//! - `secret`: the stored record, its readability rules and expiry arithmetic
//! - `handle`: random handle generation

pub mod handle;
pub mod secret;

pub use handle::{HandleGenerator, RandomHandleGenerator};
pub use secret::Secret;
