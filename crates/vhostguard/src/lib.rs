//! Top-level facade crate for vhostguard.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use vhostguard_core::*;
}

pub mod gateway {
    pub use vhostguard_gateway::*;
}
