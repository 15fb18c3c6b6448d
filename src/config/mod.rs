// Copyright (c) 2025 - Cowboy AI, Inc.
//! Gateway Configuration Model
//!
//! [`Config`] is the root aggregate held by the running slot, the startup
//! slot and every candidate session. `Clone` is a structural deep copy: no
//! two slots ever share a node.
//!
//! # Module Organization
//!
//! - [`schema`] - [`Describe`] shape table for path navigation
//! - [`accessor`] - dotted-path get/set over a [`Config`]
//! - [`plugin`] - namespaced, typed plugin configuration fragments

pub mod accessor;
pub mod plugin;
pub mod schema;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use accessor::{AccessError, ConfigAccessor};
pub use plugin::{PluginConfig, PluginDescriptor, PluginRegistry};
pub use schema::{Describe, Field, ScalarKind, SchemaNode};

/// Root configuration aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub interfaces: BTreeMap<String, InterfaceConfig>,
    pub protocols: ProtocolConfig,
    pub aaa: AaaConfig,
    pub vrfs: BTreeMap<String, VrfConfig>,
    /// Plugin namespace → plugin-specific document
    pub plugins: BTreeMap<String, Value>,
}

impl Describe for Config {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::new::<BTreeMap<String, InterfaceConfig>>("interfaces"),
            Field::new::<ProtocolConfig>("protocols"),
            Field::new::<AaaConfig>("aaa"),
            Field::new::<BTreeMap<String, VrfConfig>>("vrfs"),
            Field::new::<BTreeMap<String, Value>>("plugins"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    pub name: String,
    pub description: Option<String>,
    pub mtu: Option<u32>,
    pub enabled: bool,
    /// IPv4 addresses with prefix length, e.g. `192.0.2.1/24`
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub vrf: Option<String>,
}

impl Describe for InterfaceConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::new::<String>("name"),
            Field::new::<Option<String>>("description"),
            Field::new::<Option<u32>>("mtu"),
            Field::new::<bool>("enabled"),
            Field::new::<Vec<String>>("ipv4"),
            Field::new::<Vec<String>>("ipv6"),
            Field::new::<Option<String>>("vrf"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub bgp: Option<BgpConfig>,
    pub ospf: Option<OspfConfig>,
    #[serde(rename = "static")]
    pub static_routes: Option<StaticConfig>,
}

impl Describe for ProtocolConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::new::<Option<BgpConfig>>("bgp"),
            Field::new::<Option<OspfConfig>>("ospf"),
            Field::renamed::<Option<StaticConfig>>("static", "static_routes"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BgpConfig {
    pub asn: u32,
    pub router_id: Option<String>,
    /// Keyed by the hex-encoded neighbor address segment
    pub neighbors: BTreeMap<String, BgpNeighborConfig>,
    pub networks: Vec<String>,
}

impl Describe for BgpConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::new::<u32>("asn"),
            Field::renamed::<Option<String>>("router-id", "router_id"),
            Field::new::<BTreeMap<String, BgpNeighborConfig>>("neighbors"),
            Field::new::<Vec<String>>("networks"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BgpNeighborConfig {
    pub remote_as: u32,
    pub description: Option<String>,
    pub update_source: Option<String>,
    pub shutdown: bool,
}

impl Describe for BgpNeighborConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::renamed::<u32>("remote-as", "remote_as"),
            Field::new::<Option<String>>("description"),
            Field::renamed::<Option<String>>("update-source", "update_source"),
            Field::new::<bool>("shutdown"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OspfConfig {
    pub router_id: Option<String>,
    /// Area id → area settings
    pub areas: BTreeMap<String, OspfAreaConfig>,
}

impl Describe for OspfConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::renamed::<Option<String>>("router-id", "router_id"),
            Field::new::<BTreeMap<String, OspfAreaConfig>>("areas"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OspfAreaConfig {
    pub networks: Vec<String>,
    pub interfaces: Vec<String>,
}

impl Describe for OspfAreaConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::new::<Vec<String>>("networks"),
            Field::new::<Vec<String>>("interfaces"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub routes: Vec<StaticRoute>,
}

impl Describe for StaticConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![Field::new::<Vec<StaticRoute>>("routes")])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StaticRoute {
    pub prefix: String,
    pub next_hop: String,
    pub vrf: Option<String>,
    pub distance: Option<u8>,
}

impl Describe for StaticRoute {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::new::<String>("prefix"),
            Field::renamed::<String>("next-hop", "next_hop"),
            Field::new::<Option<String>>("vrf"),
            Field::new::<Option<u8>>("distance"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AaaConfig {
    pub auth_method: Option<String>,
    pub radius_servers: Vec<RadiusServer>,
    pub nas_identifier: Option<String>,
    pub accounting_interval: Option<u32>,
}

impl Describe for AaaConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::renamed::<Option<String>>("auth-method", "auth_method"),
            Field::renamed::<Vec<RadiusServer>>("radius-servers", "radius_servers"),
            Field::renamed::<Option<String>>("nas-identifier", "nas_identifier"),
            Field::renamed::<Option<u32>>("accounting-interval", "accounting_interval"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusServer {
    pub address: String,
    pub port: u16,
    pub secret: String,
}

impl Describe for RadiusServer {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::new::<String>("address"),
            Field::new::<u16>("port"),
            Field::new::<String>("secret"),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VrfConfig {
    pub table_id: u32,
    pub description: Option<String>,
}

impl Describe for VrfConfig {
    fn describe() -> SchemaNode {
        SchemaNode::Record(vec![
            Field::renamed::<u32>("table-id", "table_id"),
            Field::new::<Option<String>>("description"),
        ])
    }
}
