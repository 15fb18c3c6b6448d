// Copyright (c) 2025 - Cowboy AI, Inc.
//! Path Segment Codec
//!
//! Encodes typed values into single path segments and back. Addresses are
//! hex-encoded to a fixed width so a path stays a flat, dot-separated key:
//!
//! ```text
//! ip / ipv4 / ipv6   16 bytes  → 32 hex chars (IPv4 stored as ::ffff:a.b.c.d)
//! mac                 6 bytes  → 12 hex chars
//! *, string, ints     unencoded
//! ```
//!
//! An IPv4-mapped IPv6 literal (`::ffff:a.b.c.d`) encodes to the same
//! segment as the IPv4 address it maps. Under `<*:ip>` and `<*:ipv4>` such a
//! segment decodes to the IPv4 form; only `<*:ipv6>` keeps the IPv6 text.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::MacAddress;

/// Hex width of an encoded IP segment
pub const IP_SEGMENT_LEN: usize = 32;

/// Hex width of an encoded MAC segment
pub const MAC_SEGMENT_LEN: usize = 12;

/// Path building and parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Unknown wildcard kind: {0}")]
    UnknownKind(String),

    #[error("Empty segment in path {0:?}")]
    EmptySegment(String),

    #[error("Cannot encode {value:?} as {kind}: {reason}")]
    Encoding {
        kind: WildcardKind,
        value: String,
        reason: String,
    },

    #[error("Pattern {pattern} has {expected} wildcard(s) but {actual} value(s) were supplied")]
    ValueCountMismatch {
        pattern: String,
        expected: usize,
        actual: usize,
    },

    #[error("Path {path} has {actual} segment(s) but pattern {pattern} has {expected}")]
    SegmentCountMismatch {
        path: String,
        pattern: String,
        expected: usize,
        actual: usize,
    },
}

/// Typed wildcard kinds usable inside a path pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WildcardKind {
    /// `*` - any single segment
    Generic,
    String,
    Ip,
    Ipv4,
    Ipv6,
    Mac,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl WildcardKind {
    /// Grammar token for this kind, as written after `*:` in a pattern
    pub fn token(&self) -> &'static str {
        match self {
            WildcardKind::Generic => "*",
            WildcardKind::String => "string",
            WildcardKind::Ip => "ip",
            WildcardKind::Ipv4 => "ipv4",
            WildcardKind::Ipv6 => "ipv6",
            WildcardKind::Mac => "mac",
            WildcardKind::Int => "int",
            WildcardKind::Int8 => "int8",
            WildcardKind::Int16 => "int16",
            WildcardKind::Int32 => "int32",
            WildcardKind::Int64 => "int64",
            WildcardKind::Uint => "uint",
            WildcardKind::Uint8 => "uint8",
            WildcardKind::Uint16 => "uint16",
            WildcardKind::Uint32 => "uint32",
            WildcardKind::Uint64 => "uint64",
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(
            self,
            WildcardKind::Ip | WildcardKind::Ipv4 | WildcardKind::Ipv6
        )
    }

    /// Check that an integer literal fits this kind's width
    fn parses_as_integer(&self, value: &str) -> Option<bool> {
        let ok = match self {
            WildcardKind::Int | WildcardKind::Int64 => i64::from_str(value).is_ok(),
            WildcardKind::Int8 => i8::from_str(value).is_ok(),
            WildcardKind::Int16 => i16::from_str(value).is_ok(),
            WildcardKind::Int32 => i32::from_str(value).is_ok(),
            WildcardKind::Uint | WildcardKind::Uint64 => u64::from_str(value).is_ok(),
            WildcardKind::Uint8 => u8::from_str(value).is_ok(),
            WildcardKind::Uint16 => u16::from_str(value).is_ok(),
            WildcardKind::Uint32 => u32::from_str(value).is_ok(),
            _ => return None,
        };
        Some(ok)
    }
}

impl fmt::Display for WildcardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for WildcardKind {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "*" | "" => WildcardKind::Generic,
            "string" => WildcardKind::String,
            "ip" => WildcardKind::Ip,
            "ipv4" => WildcardKind::Ipv4,
            "ipv6" => WildcardKind::Ipv6,
            "mac" => WildcardKind::Mac,
            "int" => WildcardKind::Int,
            "int8" => WildcardKind::Int8,
            "int16" => WildcardKind::Int16,
            "int32" => WildcardKind::Int32,
            "int64" => WildcardKind::Int64,
            "uint" => WildcardKind::Uint,
            "uint8" => WildcardKind::Uint8,
            "uint16" => WildcardKind::Uint16,
            "uint32" => WildcardKind::Uint32,
            "uint64" => WildcardKind::Uint64,
            other => return Err(PathError::UnknownKind(other.to_string())),
        };
        Ok(kind)
    }
}

/// Encode a value into a path segment for the given wildcard kind
///
/// # Errors
/// - `Encoding` if the value does not parse as `kind`, belongs to the wrong
///   address family, or would not be a single non-empty segment
pub fn encode(kind: WildcardKind, value: &str) -> Result<String, PathError> {
    let fail = |reason: &str| PathError::Encoding {
        kind,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    match kind {
        WildcardKind::Generic | WildcardKind::String => {
            if value.is_empty() {
                return Err(fail("empty segment"));
            }
            if value.contains('.') {
                return Err(fail("segment must not contain '.'"));
            }
            Ok(value.to_string())
        }
        WildcardKind::Ip | WildcardKind::Ipv4 | WildcardKind::Ipv6 => {
            let addr = IpAddr::from_str(value).map_err(|_| fail("not an IP address"))?;
            match (kind, addr) {
                (WildcardKind::Ipv4, IpAddr::V6(_)) => return Err(fail("expected an IPv4 address")),
                (WildcardKind::Ipv6, IpAddr::V4(_)) => return Err(fail("expected an IPv6 address")),
                _ => {}
            }
            let octets = match addr {
                IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
                IpAddr::V6(v6) => v6.octets(),
            };
            Ok(to_hex(&octets))
        }
        WildcardKind::Mac => {
            let mac = MacAddress::new(value).map_err(|_| fail("not a MAC address"))?;
            Ok(to_hex(&mac.octets()))
        }
        _ => match kind.parses_as_integer(value) {
            Some(true) => Ok(value.to_string()),
            _ => Err(fail("integer out of range or malformed")),
        },
    }
}

/// Decode a path segment produced by [`encode`]
///
/// Segments whose length does not match the kind's encoded width are
/// returned unchanged, so paths that were never encoded still extract.
pub fn decode(kind: WildcardKind, segment: &str) -> String {
    match kind {
        WildcardKind::Ip | WildcardKind::Ipv4 | WildcardKind::Ipv6 => {
            match from_hex::<16>(segment) {
                Some(octets) => {
                    let v6 = Ipv6Addr::from(octets);
                    match v6.to_ipv4_mapped() {
                        Some(v4) if kind != WildcardKind::Ipv6 => v4.to_string(),
                        _ => v6.to_string(),
                    }
                }
                None => segment.to_string(),
            }
        }
        WildcardKind::Mac => match from_hex::<6>(segment) {
            Some(octets) => MacAddress::from_octets(octets).as_str(),
            None => segment.to_string(),
        },
        _ => segment.to_string(),
    }
}

/// Check whether a concrete segment can stand in for a wildcard of `kind`
pub fn segment_matches(kind: WildcardKind, segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    match kind {
        WildcardKind::Generic | WildcardKind::String => true,
        WildcardKind::Ip => from_hex::<16>(segment).is_some(),
        WildcardKind::Ipv4 => from_hex::<16>(segment)
            .map(|o| Ipv6Addr::from(o).to_ipv4_mapped().is_some())
            .unwrap_or(false),
        WildcardKind::Ipv6 => from_hex::<16>(segment).is_some(),
        WildcardKind::Mac => from_hex::<6>(segment).is_some(),
        _ => kind.parses_as_integer(segment).unwrap_or(false),
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex<const N: usize>(segment: &str) -> Option<[u8; N]> {
    if segment.len() != N * 2 || !segment.is_ascii() {
        return None;
    }
    let mut out = [0u8; N];
    for (i, chunk) in segment.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).ok()?;
        out[i] = u8::from_str_radix(pair, 16).ok()?;
    }
    Some(out)
}
