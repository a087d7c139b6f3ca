//! Admission evaluator.
//!
//! `decide` is pure: it reads the rule set, the connection type and the source
//! address, and returns a fresh [`Decision`]. Two independent scans run over
//! the rule set:
//! - deny scan: first applicable deny rule whose target matches.
//! - allow scan: first applicable allow rule whose target matches; when none
//!   matches, the vhost mode (see [`mode_for`]) decides between a hard failure
//!   and a soft pass.
//!
//! An explicit allow match overrides a deny match. Otherwise a deny match
//! wins over a whitelist miss.

use tracing::{debug, info, trace};

use super::rule::{Action, ConnKind, ConnType, Rule, RuleSet, Target};
use crate::error::{Result, VhostGuardError};

/// Default policy derived from the composition of the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Default-deny: at least one allow rule, or no rules at all.
    Whitelist,
    /// Default-allow: only deny rules configured.
    Blacklist,
}

/// Mode selection from rule counts (counted by action, regardless of kind).
pub fn mode_for(allow_count: usize, deny_count: usize) -> Mode {
    if allow_count > 0 || allow_count + deny_count == 0 {
        Mode::Whitelist
    } else {
        Mode::Blacklist
    }
}

/// Outcome category of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Admitted,
    /// Admitted although a deny rule matched, because an allow rule matched too.
    AllowOverride,
    DefaultDeny,
    DenyMatched,
    NotAllowed,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Admitted => "admitted",
            Verdict::AllowOverride => "allow_override",
            Verdict::DefaultDeny => "default_deny",
            Verdict::DenyMatched => "deny_matched",
            Verdict::NotAllowed => "not_allowed",
        }
    }

    pub fn admitted(self) -> bool {
        matches!(self, Verdict::Admitted | Verdict::AllowOverride)
    }
}

/// Result of one admission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub admitted: bool,
    pub reason: String,
    pub verdict: Verdict,
}

impl Decision {
    pub fn admit(reason: impl Into<String>) -> Self {
        Self::with(Verdict::Admitted, reason)
    }

    fn with(verdict: Verdict, reason: impl Into<String>) -> Self {
        Self {
            admitted: verdict.admitted(),
            reason: reason.into(),
            verdict,
        }
    }

    /// Map a rejection onto the error taxonomy; admitted decisions are `Ok`.
    pub fn into_result(self) -> Result<()> {
        match self.verdict {
            Verdict::Admitted | Verdict::AllowOverride => Ok(()),
            Verdict::DefaultDeny => Err(VhostGuardError::DefaultDeny(self.reason)),
            Verdict::DenyMatched => Err(VhostGuardError::DenyMatched(self.reason)),
            Verdict::NotAllowed => Err(VhostGuardError::NotAllowed(self.reason)),
        }
    }
}

/// Outcome of the allow scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowOutcome<'a> {
    Matched(&'a Rule),
    /// No match, but the vhost is in blacklist mode.
    SoftPass,
    /// No match in whitelist mode; carries the allow/deny rule counts.
    HardFail { allow: usize, deny: usize },
}

/// First deny rule of the request's kind whose target matches `address`.
pub fn deny_scan<'a>(rules: &'a RuleSet, kind: Option<ConnKind>, address: &str) -> Option<&'a Rule> {
    let kind = kind?;
    rules
        .iter()
        .filter(|r| r.action == Action::Deny && r.kind == kind)
        .find(|r| traced_match(r, address))
}

/// Scan allow rules, tracking per-action counts for mode selection.
pub fn allow_scan<'a>(rules: &'a RuleSet, kind: Option<ConnKind>, address: &str) -> AllowOutcome<'a> {
    let mut allow = 0usize;
    let mut deny = 0usize;

    for rule in rules {
        match rule.action {
            Action::Deny => {
                deny += 1;
                continue;
            }
            Action::Allow => allow += 1,
        }

        if Some(rule.kind) != kind {
            continue;
        }
        if traced_match(rule, address) {
            return AllowOutcome::Matched(rule);
        }
    }

    match mode_for(allow, deny) {
        Mode::Whitelist => AllowOutcome::HardFail { allow, deny },
        Mode::Blacklist => AllowOutcome::SoftPass,
    }
}

fn traced_match(rule: &Rule, address: &str) -> bool {
    let matched = rule.target.matches(address);
    match &rule.target {
        Target::Cidr { net, .. } => trace!(
            address,
            action = rule.action.as_str(),
            kind = rule.kind.as_str(),
            target = %rule.target,
            network = %net.network(),
            mask = %net.netmask(),
            matched,
            "security rule evaluated"
        ),
        _ => trace!(
            address,
            action = rule.action.as_str(),
            kind = rule.kind.as_str(),
            target = %rule.target,
            matched,
            "security rule evaluated"
        ),
    }
    matched
}

/// Decide admission for one connection.
///
/// `rules == None` means no rule set is configured for the vhost (fail closed);
/// `Some(empty)` is a configured block with no directives (whitelist miss).
/// The security-disabled short-circuit belongs to the caller.
pub fn decide(rules: Option<&RuleSet>, conn: ConnType, address: &str) -> Decision {
    let Some(rules) = rules else {
        debug!(address, conn = conn.as_str(), "no security rules, default deny");
        return Decision::with(Verdict::DefaultDeny, format!("default deny for {address}"));
    };

    let kind = conn.kind();
    let denied_by = deny_scan(rules, kind, address);
    let allowed = allow_scan(rules, kind, address);

    let decision = match (denied_by, allowed) {
        (Some(deny), AllowOutcome::Matched(allow)) => {
            info!(
                address,
                conn = conn.as_str(),
                deny = %deny.target,
                allow = %allow.target,
                "allow rule has precedence over deny"
            );
            Decision::with(
                Verdict::AllowOverride,
                format!("allowed by rule<{}> over deny by rule<{}>", allow.target, deny.target),
            )
        }
        (Some(deny), _) => {
            Decision::with(Verdict::DenyMatched, format!("deny by rule<{}>", deny.target))
        }
        (None, AllowOutcome::HardFail { allow, deny }) => Decision::with(
            Verdict::NotAllowed,
            format!("not allowed by any of {allow}/{deny} rules"),
        ),
        (None, AllowOutcome::Matched(_) | AllowOutcome::SoftPass) => Decision::admit("allowed"),
    };

    if !decision.admitted {
        debug!(address, conn = conn.as_str(), reason = %decision.reason, "connection rejected");
    }
    decision
}
