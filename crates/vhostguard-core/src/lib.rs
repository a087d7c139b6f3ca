//! vhostguard core: per-vhost connection admission primitives.
//!
//! This crate defines the typed rule model, the IPv4/CIDR leaf helpers, the
//! pure admission evaluator, and the error surface shared by the gateway and
//! tooling. It intentionally carries no config I/O or runtime dependencies so
//! the evaluator can be tested without a live configuration subsystem.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed rule targets degrade to "does not match"; they never abort a call.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod security;

/// Shared result type.
pub use error::{Result, VhostGuardError};
