//! Domain types for the expired QR-token sweep.
//!
//! Nothing in this crate touches the database or the runtime; it holds the
//! outcome and response types, the TLS policy, and shared aliases.

pub mod cleanup;
pub mod error;
pub mod tls;
pub mod types;
