//! Rule directive compilation.
//!
//! Format: `<allow|deny> <play|publish> <target>` where target is `all`, an
//! IPv4 address, an IPv4 CIDR (`a.b.c.d/N` or `a.b.c.d/m.m.m.m`), or any other
//! token matched literally.

use vhostguard_core::error::{Result, VhostGuardError};
use vhostguard_core::security::{Action, ConnKind, Rule, RuleSet};

pub fn parse_directive(raw: &str) -> Result<Rule> {
    let mut parts = raw.split_whitespace();
    let (Some(action), Some(kind), Some(target), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(VhostGuardError::BadRequest(format!(
            "invalid security rule: {raw} (expected <allow|deny> <play|publish> <target>)"
        )));
    };

    let action: Action = action.parse()?;
    let kind: ConnKind = kind.parse()?;
    Ok(Rule::new(action, kind, target))
}

pub fn compile_rules(raw: &[String]) -> Result<RuleSet> {
    raw.iter().map(|s| parse_directive(s)).collect::<Result<Vec<_>>>().map(RuleSet::new)
}
