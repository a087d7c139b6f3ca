//! Per-vhost security registry.
//!
//! Holds one immutable `Arc<VhostSecurity>` snapshot per vhost. An admission
//! check clones the snapshot out of the map and evaluates without holding any
//! lock, so a concurrent `reload` never mutates a rule set in flight: it
//! swaps in new snapshots and the old ones drop with their last reader.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use vhostguard_core::error::{Result, VhostGuardError};
use vhostguard_core::security::{ConnType, Decision};

use super::vhost::VhostSecurity;
use crate::config::GatewayConfig;
use crate::obs::metrics::AdmissionMetrics;

/// Metrics label for vhosts absent from config. The vhost name comes from
/// the client's connect URL, so it must not become a label value.
pub const UNKNOWN_VHOST_LABEL: &str = "__unknown__";

pub struct SecurityRegistry {
    vhosts: DashMap<String, Arc<VhostSecurity>>,
    metrics: Arc<AdmissionMetrics>,
}

impl SecurityRegistry {
    /// Build from a validated config.
    /// Returns Result so startup can report a bad directive instead of panicking.
    pub fn new(cfg: &GatewayConfig) -> Result<Self> {
        let compiled = compile_all(cfg)?;
        let vhosts = DashMap::with_capacity(compiled.len());
        for (name, sec) in compiled {
            vhosts.insert(name, sec);
        }
        Ok(Self {
            vhosts,
            metrics: Arc::new(AdmissionMetrics::default()),
        })
    }

    pub fn metrics(&self) -> Arc<AdmissionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn vhost(&self, name: &str) -> Option<Arc<VhostSecurity>> {
        self.vhosts.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Configured vhost names, sorted.
    pub fn vhost_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vhosts.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Admission decision for one connection on `vhost`.
    ///
    /// A vhost missing from config has security disabled and is admitted.
    pub fn evaluate(&self, conn: ConnType, address: &str, vhost: &str) -> Decision {
        let (decision, label) = match self.vhost(vhost) {
            Some(sec) => (sec.check(conn, address), vhost),
            None => {
                tracing::debug!(vhost, "vhost not configured, security disabled");
                (Decision::admit("security disabled"), UNKNOWN_VHOST_LABEL)
            }
        };

        self.metrics.decisions.inc(&[
            ("vhost", label),
            ("kind", conn.as_str()),
            ("verdict", decision.verdict.as_str()),
        ]);

        if !decision.admitted {
            tracing::warn!(
                vhost,
                address,
                conn = conn.as_str(),
                reason = %decision.reason,
                "connection rejected by security"
            );
        }
        decision
    }

    /// Like [`evaluate`](Self::evaluate), mapping a rejection to an error the
    /// connection layer can propagate.
    pub fn check(&self, conn: ConnType, address: &str, vhost: &str) -> Result<()> {
        self.evaluate(conn, address, vhost)
            .into_result()
            .map_err(|e| match e {
                VhostGuardError::DefaultDeny(r) => {
                    VhostGuardError::DefaultDeny(format!("{r} (vhost={vhost})"))
                }
                VhostGuardError::DenyMatched(r) => {
                    VhostGuardError::DenyMatched(format!("{r} for {address} (vhost={vhost})"))
                }
                VhostGuardError::NotAllowed(r) => {
                    VhostGuardError::NotAllowed(format!("{r} for {address} (vhost={vhost})"))
                }
                other => other,
            })
    }

    /// Replace all vhost snapshots from a new config.
    ///
    /// All-or-nothing: if any vhost fails to compile, the current snapshots
    /// stay untouched.
    pub fn reload(&self, cfg: &GatewayConfig) -> Result<()> {
        let compiled = match compile_all(cfg) {
            Ok(c) => c,
            Err(e) => {
                self.metrics.reloads.inc(&[("result", "error")]);
                tracing::warn!(error = %e, "security reload rejected, keeping previous rules");
                return Err(e);
            }
        };

        self.vhosts.retain(|name, _| compiled.contains_key(name));
        for (name, sec) in compiled {
            self.vhosts.insert(name, sec);
        }

        self.metrics.reloads.inc(&[("result", "ok")]);
        tracing::info!(vhosts = self.vhosts.len(), "security rules reloaded");
        Ok(())
    }
}

fn compile_all(cfg: &GatewayConfig) -> Result<HashMap<String, Arc<VhostSecurity>>> {
    let mut out = HashMap::with_capacity(cfg.vhosts.len());
    for v in &cfg.vhosts {
        let sec = VhostSecurity::new(v).map_err(|e| {
            VhostGuardError::BadRequest(format!(
                "vhost security compile failed (vhost={}): {e}",
                v.name
            ))
        })?;
        out.insert(v.name.clone(), Arc::new(sec));
    }
    Ok(out)
}
