#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use vhostguard_core::error::RejectCode;
use vhostguard_core::security::{ConnType, Verdict};
use vhostguard_gateway::{
    config,
    policy::{registry::UNKNOWN_VHOST_LABEL, SecurityRegistry},
};

const CONFIG: &str = r#"
version: 1
vhosts:
  - name: "open"
  - name: "locked"
    security:
      enabled: true
  - name: "studio"
    security:
      enabled: true
      rules:
        - "deny publish all"
        - "allow publish 10.0.0.5"
        - "allow play all"
  - name: "blacklist"
    security:
      enabled: true
      rules:
        - "deny play 10.0.0.0/8"
"#;

fn registry() -> SecurityRegistry {
    let cfg = config::load_from_str(CONFIG).expect("config");
    SecurityRegistry::new(&cfg).expect("registry")
}

#[test]
fn disabled_and_unknown_vhosts_admit() {
    let r = registry();
    assert!(r.evaluate(ConnType::FlashPublish, "1.2.3.4", "open").admitted);
    assert!(r.evaluate(ConnType::Play, "1.2.3.4", "not-configured").admitted);
}

#[test]
fn enabled_without_rules_default_deny() {
    let r = registry();
    let d = r.evaluate(ConnType::Play, "1.2.3.4", "locked");
    assert_eq!(d.verdict, Verdict::DefaultDeny);
    assert_eq!(d.reason, "default deny for 1.2.3.4");
}

#[test]
fn studio_publish_rules() {
    let r = registry();
    assert_eq!(
        r.evaluate(ConnType::FmlePublish, "10.0.0.5", "studio").verdict,
        Verdict::AllowOverride
    );
    let err = r.check(ConnType::HaivisionPublish, "10.0.0.6", "studio").unwrap_err();
    assert_eq!(err.code(), RejectCode::DenyMatched);
    assert!(err.to_string().contains("deny by rule<all>"));
    assert!(err.is_rejection());
    assert!(r.check(ConnType::Play, "8.8.8.8", "studio").is_ok());
}

#[test]
fn blacklist_vhost() {
    let r = registry();
    assert!(r.check(ConnType::Play, "192.168.1.1", "blacklist").is_ok());
    let err = r.check(ConnType::Play, "10.1.1.1", "blacklist").unwrap_err();
    assert_eq!(err.code(), RejectCode::DenyMatched);
}

#[test]
fn decisions_are_counted() {
    let r = registry();
    r.evaluate(ConnType::Play, "1.2.3.4", "locked");
    r.evaluate(ConnType::Play, "1.2.3.4", "locked");
    r.evaluate(ConnType::Play, "1.2.3.4", "studio");

    let m = r.metrics();
    let locked = [("vhost", "locked"), ("kind", "play"), ("verdict", "default_deny")];
    let studio = [("vhost", "studio"), ("kind", "play"), ("verdict", "admitted")];
    assert_eq!(m.decisions.get(&locked), 2);
    assert_eq!(m.decisions.get(&studio), 1);
    assert!(m.render().contains("vhostguard_admission_decisions_total{"));
}

#[test]
fn unconfigured_vhosts_share_one_metric_series() {
    let r = registry();
    for i in 0..1000 {
        let vhost = format!("client-{i}.example.com");
        assert!(r.evaluate(ConnType::Play, "1.2.3.4", &vhost).admitted);
    }

    let m = r.metrics();
    assert_eq!(m.decisions.series(), 1);
    let unknown = [("vhost", UNKNOWN_VHOST_LABEL), ("kind", "play"), ("verdict", "admitted")];
    assert_eq!(m.decisions.get(&unknown), 1000);
    assert!(!m.render().contains("client-0.example.com"));
}

#[test]
fn reload_swaps_and_removes_vhosts() {
    let r = registry();
    let held = r.vhost("locked").unwrap();

    let next = config::load_from_str(
        r#"
version: 1
vhosts:
  - name: "locked"
    security:
      enabled: true
      rules: ["allow play 192.168.0.0/16"]
"#,
    )
    .unwrap();
    r.reload(&next).unwrap();

    assert_eq!(r.vhost_names(), vec!["locked".to_string()]);
    assert!(r.evaluate(ConnType::Play, "192.168.3.3", "locked").admitted);
    // previous snapshot is unaffected
    assert_eq!(held.check(ConnType::Play, "192.168.3.3").verdict, Verdict::DefaultDeny);
    // studio is gone, so security is off for it
    assert!(r.evaluate(ConnType::FlashPublish, "6.6.6.6", "studio").admitted);
    assert_eq!(r.metrics().reloads.get(&[("result", "ok")]), 1);
}

#[test]
fn failed_reload_keeps_previous_rules() {
    let r = registry();
    // bypasses load_from_str validation on purpose
    let mut bad = config::load_from_str(CONFIG).unwrap();
    bad.vhosts[2].security.as_mut().unwrap().rules = Some(vec!["allow".into()]);

    let err = r.reload(&bad).unwrap_err();
    assert_eq!(err.code(), RejectCode::BadRequest);
    assert_eq!(r.vhost_names().len(), 4);
    assert_eq!(
        r.evaluate(ConnType::FmlePublish, "10.0.0.6", "studio").verdict,
        Verdict::DenyMatched
    );
    assert_eq!(r.metrics().reloads.get(&[("result", "error")]), 1);
}

#[test]
fn concurrent_evaluation_is_consistent() {
    let r = Arc::new(registry());
    thread::scope(|s| {
        for i in 0..8u8 {
            let r = Arc::clone(&r);
            s.spawn(move || {
                for _ in 0..200 {
                    let inside = format!("10.{i}.0.1");
                    assert!(!r.evaluate(ConnType::Play, &inside, "blacklist").admitted);
                    let outside = format!("172.16.{i}.1");
                    assert!(r.evaluate(ConnType::Play, &outside, "blacklist").admitted);
                }
            });
        }
    });
    let m = r.metrics();
    let denied = [("vhost", "blacklist"), ("kind", "play"), ("verdict", "deny_matched")];
    assert_eq!(m.decisions.get(&denied), 8 * 200);
}
