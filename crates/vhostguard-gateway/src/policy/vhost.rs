use vhostguard_core::error::Result;
use vhostguard_core::security::{decide, mode_for, ConnType, Decision, Mode, RuleSet};

use super::directive::compile_rules;
use crate::config::VhostConfig;

/// Vhost-scoped security runtime.
/// Compiled once per config load, then shared via Arc; never mutated.
#[derive(Debug, Clone)]
pub struct VhostSecurity {
    pub vhost: String,
    enabled: bool,
    rules: Option<RuleSet>,
}

impl VhostSecurity {
    pub fn new(cfg: &VhostConfig) -> Result<Self> {
        let (enabled, rules) = match &cfg.security {
            Some(sec) => (
                sec.enabled,
                sec.rules.as_deref().map(compile_rules).transpose()?,
            ),
            None => (false, None),
        };
        Ok(Self {
            vhost: cfg.name.clone(),
            enabled,
            rules,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn rules(&self) -> Option<&RuleSet> {
        self.rules.as_ref()
    }

    /// Effective default policy; `None` when no rule set is configured.
    pub fn mode(&self) -> Option<Mode> {
        self.rules
            .as_ref()
            .map(|r| mode_for(r.allow_count(), r.deny_count()))
    }

    /// Admission check: disabled security admits everything.
    pub fn check(&self, conn: ConnType, address: &str) -> Decision {
        if !self.enabled {
            return Decision::admit("security disabled");
        }
        decide(self.rules.as_ref(), conn, address)
    }
}
