//! Policy layer (directive compilation, per-vhost runtimes, registry).
//!
//! Compiles vhost security configuration into typed rule sets once at load
//! time; the connection layer then asks the registry for a decision per
//! incoming play/publish request.

pub mod directive;
pub mod registry;
pub mod vhost;

pub use registry::SecurityRegistry;
pub use vhost::VhostSecurity;
