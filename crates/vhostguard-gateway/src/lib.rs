//! vhostguard gateway library entry.
//!
//! This crate is the configuration-side collaborator of the admission
//! evaluator: it loads vhost security config, compiles raw directives into
//! typed rule sets, and serves per-vhost admission checks from immutable
//! snapshots. It is consumed by the binary (`main.rs`), by the connection
//! layer of the host server, and by integration tests.

pub mod config;
pub mod obs;
pub mod policy;
