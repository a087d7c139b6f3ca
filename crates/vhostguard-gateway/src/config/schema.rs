use std::collections::HashSet;

use serde::Deserialize;
use vhostguard_core::error::{Result, VhostGuardError};

use crate::policy::directive;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub vhosts: Vec<VhostConfig>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VhostGuardError::UnsupportedVersion);
        }
        if self.vhosts.is_empty() {
            return Err(VhostGuardError::BadRequest("vhosts must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for v in &self.vhosts {
            v.validate()?;
            if !seen.insert(v.name.as_str()) {
                return Err(VhostGuardError::BadRequest(format!(
                    "duplicate vhost: {}",
                    v.name
                )));
            }
        }
        Ok(())
    }

    pub fn vhost(&self, name: &str) -> Option<&VhostConfig> {
        self.vhosts.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VhostConfig {
    pub name: String,

    /// Missing section => security disabled for this vhost.
    pub security: Option<SecurityConfig>,
}

impl VhostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VhostGuardError::BadRequest("vhost name must not be empty".into()));
        }
        if let Some(sec) = &self.security {
            for raw in sec.rules.iter().flatten() {
                directive::parse_directive(raw).map_err(|e| {
                    VhostGuardError::BadRequest(format!("vhost {}: {e}", self.name))
                })?;
            }
        }
        Ok(())
    }

    pub fn security_enabled(&self) -> bool {
        self.security.as_ref().is_some_and(|s| s.enabled)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    #[serde(default)]
    pub enabled: bool,

    /// `None` (key omitted) and `Some([])` are distinct: the first fails
    /// closed, the second is an empty whitelist.
    pub rules: Option<Vec<String>>,
}
