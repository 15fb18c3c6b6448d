// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Domain Value Objects
//!
//! Validated building blocks shared by the path codec and the feature
//! handlers.
//!
//! - [`IpPrefix`] - IPv4/IPv6 address with prefix length
//! - [`MacAddress`] - 48-bit MAC address validation
//! - [`Mtu`] - Maximum Transmission Unit (68-9000 bytes)

pub mod network;

pub use network::{parse_router_id, validate_asn, IpPrefix, MacAddress, Mtu, NetworkError};
