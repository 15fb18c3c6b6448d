// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Path Encoding
//!
//! Building a concrete path from a pattern and extracting the values back
//! must return the canonical form of what went in, for every wildcard kind.

use bng_config::path::{PathError, PathPattern};
use proptest::prelude::*;
use std::net::{Ipv4Addr, Ipv6Addr};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn ipv4() -> impl Strategy<Value = Ipv4Addr> {
    any::<[u8; 4]>().prop_map(Ipv4Addr::from)
}

fn ipv6() -> impl Strategy<Value = Ipv6Addr> {
    any::<[u8; 16]>().prop_map(Ipv6Addr::from)
}

/// Mapped IPv4 addresses, which share their segment with plain IPv4
fn ipv4_mapped() -> impl Strategy<Value = Ipv6Addr> {
    ipv4().prop_map(|v4| v4.to_ipv6_mapped())
}

fn mac() -> impl Strategy<Value = String> {
    any::<[u8; 6]>().prop_map(|o| {
        format!(
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    })
}

fn plain_segment() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,16}"
}

fn roundtrip(pattern: &str, value: &str) -> Vec<String> {
    let pattern = PathPattern::parse(pattern).unwrap();
    let path = pattern.build(&[value]).unwrap();
    assert!(pattern.matches(&path), "{} does not match {}", path, pattern);
    pattern.extract(&path).unwrap()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: IPv4 neighbors survive an encode/decode cycle
    #[test]
    fn prop_ipv4_roundtrip(addr in ipv4()) {
        let value = addr.to_string();
        prop_assert_eq!(roundtrip("protocols.bgp.neighbors.<*:ip>", &value), vec![value.clone()]);
        prop_assert_eq!(roundtrip("neighbors.<*:ipv4>", &value), vec![value]);
    }

    /// Property: IPv6 literals decode to their canonical text
    #[test]
    fn prop_ipv6_roundtrip(addr in ipv6()) {
        let value = addr.to_string();
        let as_ip = addr.to_ipv4_mapped().map_or(value.clone(), |v4| v4.to_string());
        prop_assert_eq!(roundtrip("protocols.bgp.neighbors.<*:ip>", &value), vec![as_ip]);
        prop_assert_eq!(roundtrip("neighbors.<*:ipv6>", &value), vec![value]);
    }

    /// Property: mapped IPv4 literals stay IPv6 under an ipv6 wildcard
    #[test]
    fn prop_ipv4_mapped_roundtrip(addr in ipv4_mapped()) {
        let value = addr.to_string();
        prop_assert_eq!(roundtrip("neighbors.<*:ipv6>", &value), vec![value]);
    }

    /// Property: every encoded IP segment has the same width
    #[test]
    fn prop_ip_segments_are_fixed_width(v4 in ipv4(), v6 in ipv6()) {
        let pattern = PathPattern::parse("n.<*:ip>").unwrap();
        for value in [v4.to_string(), v6.to_string()] {
            let path = pattern.build(&[value.as_str()]).unwrap();
            let segment = path.rsplit('.').next().unwrap();
            prop_assert_eq!(segment.len(), 32);
            prop_assert!(segment.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    /// Property: MAC addresses round-trip in lowercase colon form
    #[test]
    fn prop_mac_roundtrip(value in mac()) {
        prop_assert_eq!(roundtrip("subscribers.<*:mac>", &value), vec![value.clone()]);
        prop_assert_eq!(
            roundtrip("subscribers.<*:mac>", &value.to_uppercase().replace(':', "-")),
            vec![value]
        );
    }

    /// Property: integers pass through unencoded
    #[test]
    fn prop_integer_roundtrip(a in any::<i16>(), b in any::<u32>(), c in any::<i64>()) {
        prop_assert_eq!(roundtrip("vlans.<*:int16>", &a.to_string()), vec![a.to_string()]);
        prop_assert_eq!(roundtrip("vlans.<*:uint32>", &b.to_string()), vec![b.to_string()]);
        prop_assert_eq!(roundtrip("vlans.<*:int64>", &c.to_string()), vec![c.to_string()]);
    }

    /// Property: generic and string segments pass through unencoded
    #[test]
    fn prop_plain_roundtrip(value in plain_segment()) {
        prop_assert_eq!(roundtrip("interfaces.*", &value), vec![value.clone()]);
        prop_assert_eq!(roundtrip("interfaces.<*:string>", &value), vec![value]);
    }

    /// Property: multi-wildcard patterns keep value order
    #[test]
    fn prop_values_keep_order(vrf in plain_segment(), addr in ipv4(), vlan in any::<u16>()) {
        let pattern = PathPattern::parse("vrfs.*.neighbors.<*:ip>.vlans.<*:uint16>").unwrap();
        let values = [vrf, addr.to_string(), vlan.to_string()];
        let path = pattern.build(&values).unwrap();
        prop_assert_eq!(pattern.extract(&path).unwrap(), values.to_vec());
    }

    /// Property: a value count other than the wildcard count is rejected
    #[test]
    fn prop_value_count_must_match(values in prop::collection::vec(plain_segment(), 0..5)) {
        prop_assume!(values.len() != 2);
        let pattern = PathPattern::parse("a.*.b.*").unwrap();
        let is_count_mismatch = matches!(
            pattern.build(values.as_slice()),
            Err(PathError::ValueCountMismatch { expected: 2, .. })
        );
        prop_assert!(is_count_mismatch);
    }

    /// Property: segments that were never encoded extract unchanged
    #[test]
    fn prop_unencoded_segments_pass_through(value in "[g-z]{1,12}") {
        let pattern = PathPattern::parse("neighbors.<*:ip>").unwrap();
        let path = format!("neighbors.{}", value);
        prop_assert_eq!(pattern.extract(&path).unwrap(), vec![value]);
    }
}
