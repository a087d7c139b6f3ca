//! Admission security primitives.
//!
//! - `cidr`: IPv4 literal validation, CIDR split, and range test (leaf helpers).
//! - `rule`: typed rule model, normalized once at the config boundary.
//! - `evaluator`: the pure allow/deny decision over a rule set.

pub mod cidr;
pub mod evaluator;
pub mod rule;

pub use evaluator::{decide, mode_for, Decision, Mode, Verdict};
pub use rule::{Action, ConnKind, ConnType, Rule, RuleSet, Target};
