//! Lightweight in-process metrics.
//!
//! Admission outcomes and reloads are counted in atomics and rendered in the
//! Prometheus text format for whatever exporter the host server runs.

pub mod metrics;
