//! Typed rule model.
//!
//! Rules arrive as raw directives (`allow play 10.0.0.0/8`) and are normalized
//! here once, so the evaluator never parses strings in the hot path.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::Deserialize;

use super::cidr;
use crate::error::VhostGuardError;

/// Rule action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Allow,
    Deny,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Deny => "deny",
        }
    }
}

impl FromStr for Action {
    type Err = VhostGuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Action::Allow),
            "deny" => Ok(Action::Deny),
            other => Err(VhostGuardError::BadRequest(format!(
                "unknown rule action: {other} (expected allow|deny)"
            ))),
        }
    }
}

/// Connection category a rule restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnKind {
    Play,
    Publish,
}

impl ConnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnKind::Play => "play",
            ConnKind::Publish => "publish",
        }
    }
}

impl FromStr for ConnKind {
    type Err = VhostGuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(ConnKind::Play),
            "publish" => Ok(ConnKind::Publish),
            other => Err(VhostGuardError::BadRequest(format!(
                "unknown rule kind: {other} (expected play|publish)"
            ))),
        }
    }
}

/// Upstream connection classification, as identified by the protocol layer.
///
/// All publish handshakes are policy-equivalent and collapse to
/// [`ConnKind::Publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnType {
    Play,
    FmlePublish,
    FlashPublish,
    HaivisionPublish,
    Unknown,
}

impl ConnType {
    /// Policy category; `None` for unidentified connections, which match no rule.
    pub fn kind(self) -> Option<ConnKind> {
        match self {
            ConnType::Play => Some(ConnKind::Play),
            ConnType::FmlePublish | ConnType::FlashPublish | ConnType::HaivisionPublish => {
                Some(ConnKind::Publish)
            }
            ConnType::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnType::Play => "play",
            ConnType::FmlePublish => "fmle_publish",
            ConnType::FlashPublish => "flash_publish",
            ConnType::HaivisionPublish => "haivision_publish",
            ConnType::Unknown => "unknown",
        }
    }
}

impl From<ConnKind> for ConnType {
    fn from(kind: ConnKind) -> Self {
        match kind {
            ConnKind::Play => ConnType::Play,
            ConnKind::Publish => ConnType::FmlePublish,
        }
    }
}

/// Address selector of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `all`
    All,
    /// Anything that is not an IPv4 network; matches by exact string only.
    Literal(String),
    /// IPv4 network; a bare address is a `/32`.
    Cidr { raw: String, net: Ipv4Net },
}

impl Target {
    /// Normalize a raw configured target. Never fails: unparseable networks
    /// fall back to [`Target::Literal`].
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            return Target::All;
        }
        match cidr::split_cidr(raw) {
            Some(net) => Target::Cidr {
                raw: raw.to_string(),
                net,
            },
            None => Target::Literal(raw.to_string()),
        }
    }

    /// Raw configured text, used in diagnostics.
    pub fn as_str(&self) -> &str {
        match self {
            Target::All => "all",
            Target::Literal(raw) | Target::Cidr { raw, .. } => raw,
        }
    }

    /// Target match predicate: wildcard, exact string equality, or an IPv4
    /// address inside the target network.
    pub fn matches(&self, address: &str) -> bool {
        match self {
            Target::All => true,
            Target::Literal(raw) => raw == address,
            Target::Cidr { raw, net } => {
                if raw == address {
                    return true;
                }
                match address.parse::<Ipv4Addr>() {
                    Ok(addr) => net.contains(&addr),
                    Err(_) => false,
                }
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    pub kind: ConnKind,
    pub target: Target,
}

impl Rule {
    pub fn new(action: Action, kind: ConnKind, target: &str) -> Self {
        Self {
            action,
            kind,
            target: Target::parse(target),
        }
    }

    pub fn allow(kind: ConnKind, target: &str) -> Self {
        Self::new(Action::Allow, kind, target)
    }

    pub fn deny(kind: ConnKind, target: &str) -> Self {
        Self::new(Action::Deny, kind, target)
    }

    /// True iff this rule restricts `kind` and its target matches `address`.
    pub fn applies(&self, kind: ConnKind, address: &str) -> bool {
        self.kind == kind && self.target.matches(address)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.action.as_str(), self.kind.as_str(), self.target)
    }
}

/// Ordered rules of one vhost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Allow rules of any kind.
    pub fn allow_count(&self) -> usize {
        self.rules.iter().filter(|r| r.action == Action::Allow).count()
    }

    /// Deny rules of any kind.
    pub fn deny_count(&self) -> usize {
        self.rules.iter().filter(|r| r.action == Action::Deny).count()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
