// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid prefix notation: {0}")]
    InvalidPrefix(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4, 0-128 for IPv6)")]
    InvalidPrefixLength(u8),

    #[error("Address family mismatch: {0}")]
    FamilyMismatch(String),

    #[error("Invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("Invalid MTU: {0} (must be 68-9000)")]
    InvalidMtu(u32),

    #[error("Invalid AS number: {0}")]
    InvalidAsn(u32),
}

/// IP prefix value object (`address/length`)
///
/// Interface addresses and static route destinations are always written with
/// an explicit prefix length.
///
/// # Examples
///
/// ```rust
/// use bng_config::domain::IpPrefix;
///
/// let prefix = IpPrefix::new("192.0.2.1/24").unwrap();
/// assert_eq!(prefix.address().to_string(), "192.0.2.1");
/// assert_eq!(prefix.length(), 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpPrefix {
    address: IpAddr,
    length: u8,
}

impl IpPrefix {
    /// Parse `address/length`
    ///
    /// # Invariants
    /// - Valid IP address format
    /// - Prefix length 0-32 for IPv4, 0-128 for IPv6
    pub fn new(prefix: impl AsRef<str>) -> Result<Self, NetworkError> {
        let prefix = prefix.as_ref();

        let (addr_str, len_str) = prefix
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidPrefix(prefix.to_string()))?;

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let length = len_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidPrefix(prefix.to_string()))?;

        let max = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        if length > max {
            return Err(NetworkError::InvalidPrefixLength(length));
        }

        Ok(Self { address, length })
    }

    /// Parse and require an IPv4 prefix
    pub fn new_v4(prefix: impl AsRef<str>) -> Result<Self, NetworkError> {
        let parsed = Self::new(prefix.as_ref())?;
        if !parsed.is_ipv4() {
            return Err(NetworkError::FamilyMismatch(format!(
                "{} is not an IPv4 prefix",
                prefix.as_ref()
            )));
        }
        Ok(parsed)
    }

    /// Parse and require an IPv6 prefix
    pub fn new_v6(prefix: impl AsRef<str>) -> Result<Self, NetworkError> {
        let parsed = Self::new(prefix.as_ref())?;
        if parsed.is_ipv4() {
            return Err(NetworkError::FamilyMismatch(format!(
                "{} is not an IPv6 prefix",
                prefix.as_ref()
            )));
        }
        Ok(parsed)
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self.address, IpAddr::V4(_))
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.length)
    }
}

impl FromStr for IpPrefix {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// MAC Address value object
///
/// Represents a 48-bit MAC address with validation.
/// Invariants:
/// - Valid MAC address format (6 octets)
/// - Canonical representation (lowercase, colon-separated)
///
/// # Examples
///
/// ```rust
/// use bng_config::domain::MacAddress;
///
/// let mac = MacAddress::new("00-11-22-33-44-55").unwrap();
/// assert_eq!(mac.as_str(), "00:11:22:33:44:55");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Create a new MAC address with validation
    ///
    /// Accepts colon, dash or no separators.
    pub fn new(mac: impl AsRef<str>) -> Result<Self, NetworkError> {
        let mac = mac.as_ref();
        let mac_clean = mac.replace([':', '-'], "");

        // Invariant: Must be exactly 12 hex digits (6 octets)
        if mac_clean.len() != 12 || !mac_clean.is_ascii() {
            return Err(NetworkError::InvalidMacAddress(mac.to_string()));
        }

        let mut octets = [0u8; 6];
        for (i, chunk) in mac_clean.as_bytes().chunks(2).enumerate() {
            let hex_str = std::str::from_utf8(chunk)
                .map_err(|_| NetworkError::InvalidMacAddress(mac.to_string()))?;
            octets[i] = u8::from_str_radix(hex_str, 16)
                .map_err(|_| NetworkError::InvalidMacAddress(mac.to_string()))?;
        }

        Ok(Self(octets))
    }

    /// Create from raw octets
    pub fn from_octets(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Get the octets
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Get as canonical string (lowercase, colon-separated)
    pub fn as_str(&self) -> String {
        format!(
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MacAddress {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// MTU (Maximum Transmission Unit) value object
///
/// Invariants:
/// - Valid MTU range (68-9000 bytes)
/// - 68 = minimum IPv4 MTU
/// - 9000 = jumbo frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mtu(u32);

impl Mtu {
    /// Minimum MTU (IPv4 minimum)
    pub const MIN: u32 = 68;

    /// Maximum MTU (jumbo frames)
    pub const MAX: u32 = 9000;

    /// Ethernet default, programmed when an interface has no explicit MTU
    pub const DEFAULT: u32 = 1500;

    pub fn new(size: u32) -> Result<Self, NetworkError> {
        if !(Self::MIN..=Self::MAX).contains(&size) {
            return Err(NetworkError::InvalidMtu(size));
        }

        Ok(Self(size))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Mtu {
    type Error = NetworkError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// BGP autonomous system number; zero is reserved
pub fn validate_asn(asn: u32) -> Result<u32, NetworkError> {
    if asn == 0 {
        return Err(NetworkError::InvalidAsn(asn));
    }
    Ok(asn)
}

/// Parse a dotted-quad router id
pub fn parse_router_id(router_id: &str) -> Result<Ipv4Addr, NetworkError> {
    Ipv4Addr::from_str(router_id).map_err(|_| NetworkError::InvalidIpAddress(router_id.to_string()))
}
