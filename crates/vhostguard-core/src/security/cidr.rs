//! IPv4 / CIDR leaf helpers.
//!
//! All functions are pure and total: invalid input yields `false` / `None`,
//! never an error. IPv6 is not handled here; non-IPv4 strings simply fail
//! validation.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

/// True iff `s` is a dotted-quad IPv4 literal.
pub fn is_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

/// Parse a rule target into an IPv4 network.
///
/// Accepted forms:
/// - `a.b.c.d` (implicit `/32`)
/// - `a.b.c.d/N` with `N` in `1..=32`
/// - `a.b.c.d/m.m.m.m` (contiguous dotted mask)
///
/// A zero-length prefix, an empty or non-numeric suffix, or an invalid
/// network yields `None`. Host bits of the network are kept; containment
/// is tested against the masked range.
pub fn split_cidr(target: &str) -> Option<Ipv4Net> {
    let Some((net, suffix)) = target.split_once('/') else {
        let addr = target.parse::<Ipv4Addr>().ok()?;
        return Ipv4Net::new(addr, 32).ok();
    };

    let network = net.parse::<Ipv4Addr>().ok()?;
    if suffix.is_empty() {
        return None;
    }

    let net = if suffix.contains('.') {
        let mask = suffix.parse::<Ipv4Addr>().ok()?;
        Ipv4Net::with_netmask(network, mask).ok()?
    } else {
        let bits: u8 = suffix.parse().ok()?;
        Ipv4Net::new(network, bits).ok()?
    };

    // a zero-length prefix is never a valid rule network
    (net.prefix_len() > 0).then_some(net)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    #[test]
    fn ipv4_literals() {
        assert!(is_ipv4("192.168.1.10"));
        assert!(is_ipv4("0.0.0.0"));
        assert!(!is_ipv4("256.1.1.1"));
        assert!(!is_ipv4("10.0.0"));
        assert!(!is_ipv4("::1"));
        assert!(!is_ipv4("example.com"));
        assert!(!is_ipv4(""));
    }

    #[test]
    fn split_prefix_forms() {
        assert_eq!(split_cidr("10.0.0.0/8"), Some(net("10.0.0.0/8")));
        assert_eq!(split_cidr("192.168.1.0/24"), Some(net("192.168.1.0/24")));
        assert_eq!(split_cidr("1.2.3.4/32"), Some(net("1.2.3.4/32")));
        assert_eq!(split_cidr("1.2.3.4/1").map(|n| n.netmask()), Some(ip("128.0.0.0")));
    }

    #[test]
    fn split_bare_address_is_host_route() {
        assert_eq!(split_cidr("10.0.0.5"), Some(net("10.0.0.5/32")));
    }

    #[test]
    fn split_dotted_mask() {
        let n = split_cidr("172.16.0.0/255.240.0.0").unwrap();
        assert_eq!(n, net("172.16.0.0/12"));
        assert_eq!(n.netmask(), ip("255.240.0.0"));
    }

    #[test]
    fn split_rejects_malformed() {
        assert_eq!(split_cidr("10.0.0.0/0"), None);
        assert_eq!(split_cidr("10.0.0.0/0.0.0.0"), None);
        assert_eq!(split_cidr("10.0.0.0/33"), None);
        assert_eq!(split_cidr("10.0.0.0/"), None);
        assert_eq!(split_cidr("10.0.0.0/abc"), None);
        assert_eq!(split_cidr("10.0.0.0/255.0.255.0"), None);
        assert_eq!(split_cidr("host.local/24"), None);
        assert_eq!(split_cidr("all"), None);
        assert_eq!(split_cidr("fe80::/64"), None);
    }

    #[test]
    fn range_bounds_inclusive() {
        let n = split_cidr("192.168.1.0/24").unwrap();
        assert!(n.contains(&ip("192.168.1.0")));
        assert!(n.contains(&ip("192.168.1.255")));
        assert!(n.contains(&ip("192.168.1.50")));
        assert!(!n.contains(&ip("192.168.2.0")));
        assert!(!n.contains(&ip("10.0.0.1")));
    }

    #[test]
    fn unaligned_network_is_masked_down() {
        let n = split_cidr("10.1.2.3/16").unwrap();
        assert!(n.contains(&ip("10.1.0.0")));
        assert!(n.contains(&ip("10.1.255.255")));
        assert!(!n.contains(&ip("10.2.0.0")));
    }
}
