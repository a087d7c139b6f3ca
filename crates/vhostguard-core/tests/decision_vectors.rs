//! Admission decision vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use vhostguard_core::security::decide;


fn run(file: &str) {
    let vectors = vector_loader::load(file);
    assert!(!vectors.is_empty(), "no vectors in {file}");

    for v in vectors {
        let rules = v.rule_set();
        let d = decide(rules.as_ref(), v.conn, &v.address);

        assert_eq!(d.admitted, v.expect.admitted, "vector={}", v.description);
        assert_eq!(d.verdict.as_str(), v.expect.verdict, "vector={}", v.description);
        if let Some(reason) = &v.expect.reason {
            assert_eq!(&d.reason, reason, "vector={}", v.description);
        }

        // same inputs, same answer
        let again = decide(rules.as_ref(), v.conn, &v.address);
        assert_eq!(d, again, "vector={}", v.description);
    }
}

#[test]
fn default_modes() {
    run("modes.json");
}

#[test]
fn precedence() {
    run("precedence.json");
}

#[test]
fn target_matching() {
    run("targets.json");
}
