// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin Configuration Namespaces
//!
//! Features loaded alongside the core declare a typed configuration fragment
//! under their own dotted namespace. Registration is an explicit bootstrap
//! step; the resulting registry is frozen behind an `Arc` and handed to the
//! [`ConfigAccessor`](super::ConfigAccessor).
//!
//! The active value of each fragment lives in [`Config::plugins`] as a JSON
//! document that is always canonicalized through the registered type, so a
//! path such as `dhcp.pools.lan.lease-time` reads and writes a typed field.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use super::schema::{Describe, SchemaNode};
use super::Config;

/// Typed plugin configuration fragment
pub trait PluginConfig: Describe + Serialize + DeserializeOwned + Default + 'static {}

impl<T> PluginConfig for T where T: Describe + Serialize + DeserializeOwned + Default + 'static {}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Plugin namespace already registered: {0}")]
    DuplicateNamespace(String),

    #[error("Invalid plugin namespace: {0:?}")]
    InvalidNamespace(String),

    #[error("Plugin namespace not registered: {0}")]
    UnknownNamespace(String),

    #[error("Plugin document for {namespace} does not match its type: {source}")]
    Decode {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },
}

type Canonicalize = fn(Value) -> Result<Value, serde_json::Error>;

/// Type descriptor for one namespace
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    namespace: String,
    type_name: &'static str,
    schema: SchemaNode,
    default_value: fn() -> Result<Value, serde_json::Error>,
    canonicalize: Canonicalize,
}

impl PluginDescriptor {
    fn of<T: PluginConfig>(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            type_name: std::any::type_name::<T>(),
            schema: T::describe(),
            default_value: default_document::<T>,
            canonicalize: canonical_document::<T>,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Serialized `T::default()`
    pub fn default_value(&self) -> Result<Value, serde_json::Error> {
        (self.default_value)()
    }

    /// Round-trip a document through the registered type
    pub fn canonicalize(&self, document: Value) -> Result<Value, serde_json::Error> {
        (self.canonicalize)(document)
    }
}

fn default_document<T: PluginConfig>() -> Result<Value, serde_json::Error> {
    serde_json::to_value(T::default())
}

fn canonical_document<T: PluginConfig>(document: Value) -> Result<Value, serde_json::Error> {
    let typed: T = serde_json::from_value(document)?;
    serde_json::to_value(typed)
}

/// Namespace → typed plugin descriptor
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    entries: BTreeMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under a dotted namespace such as `dhcp` or `services.pppoe`
    pub fn register<T: PluginConfig>(&mut self, namespace: &str) -> Result<(), PluginError> {
        if namespace.is_empty() || namespace.split('.').any(str::is_empty) {
            return Err(PluginError::InvalidNamespace(namespace.to_string()));
        }
        if self.entries.contains_key(namespace) {
            return Err(PluginError::DuplicateNamespace(namespace.to_string()));
        }
        self.entries
            .insert(namespace.to_string(), PluginDescriptor::of::<T>(namespace));
        tracing::debug!(namespace, type_name = std::any::type_name::<T>(), "plugin config registered");
        Ok(())
    }

    pub fn get(&self, namespace: &str) -> Option<&PluginDescriptor> {
        self.entries.get(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the longest registered namespace that prefixes `path`
    ///
    /// Returns the descriptor and the remainder of the path below the
    /// namespace (`None` when the path names the namespace itself).
    pub fn lookup<'p>(&self, path: &'p str) -> Option<(&PluginDescriptor, Option<&'p str>)> {
        self.entries
            .iter()
            .filter_map(|(ns, descriptor)| {
                if path == ns {
                    Some((descriptor, None))
                } else {
                    path.strip_prefix(ns.as_str())
                        .and_then(|rest| rest.strip_prefix('.'))
                        .map(|rest| (descriptor, Some(rest)))
                }
            })
            .max_by_key(|(descriptor, _)| descriptor.namespace.len())
    }

    /// Read the active typed value of a namespace, defaulting when absent
    pub fn typed<T: PluginConfig>(&self, config: &Config, namespace: &str) -> Result<T, PluginError> {
        if !self.entries.contains_key(namespace) {
            return Err(PluginError::UnknownNamespace(namespace.to_string()));
        }
        match config.plugins.get(namespace) {
            Some(document) => serde_json::from_value(document.clone()).map_err(|source| {
                PluginError::Decode {
                    namespace: namespace.to_string(),
                    source,
                }
            }),
            None => Ok(T::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Field;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct PppoeConfig {
        service_name: String,
        max_sessions: u32,
    }

    impl Describe for PppoeConfig {
        fn describe() -> SchemaNode {
            SchemaNode::Record(vec![
                Field::new::<String>("service_name"),
                Field::new::<u32>("max_sessions"),
            ])
        }
    }

    #[test]
    fn test_register_rejects_duplicates_and_bad_names() {
        let mut registry = PluginRegistry::new();
        registry.register::<PppoeConfig>("services.pppoe").unwrap();

        assert!(matches!(
            registry.register::<PppoeConfig>("services.pppoe"),
            Err(PluginError::DuplicateNamespace(_))
        ));
        assert!(matches!(
            registry.register::<PppoeConfig>("services..x"),
            Err(PluginError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn test_lookup_longest_prefix() {
        let mut registry = PluginRegistry::new();
        registry.register::<PppoeConfig>("services").unwrap();
        registry.register::<PppoeConfig>("services.pppoe").unwrap();

        let (descriptor, rest) = registry.lookup("services.pppoe.max_sessions").unwrap();
        assert_eq!(descriptor.namespace(), "services.pppoe");
        assert_eq!(rest, Some("max_sessions"));

        let (descriptor, rest) = registry.lookup("services.pppoe").unwrap();
        assert_eq!(descriptor.namespace(), "services.pppoe");
        assert_eq!(rest, None);

        assert!(registry.lookup("servicesx.pppoe").is_none());
        assert!(registry.lookup("interfaces.eth0").is_none());
    }

    #[test]
    fn test_typed_reads_active_value() {
        let mut registry = PluginRegistry::new();
        registry.register::<PppoeConfig>("pppoe").unwrap();

        let mut config = Config::default();
        assert_eq!(
            registry.typed::<PppoeConfig>(&config, "pppoe").unwrap(),
            PppoeConfig::default()
        );

        config.plugins.insert(
            "pppoe".into(),
            serde_json::json!({"service_name": "isp", "max_sessions": 4000}),
        );
        let typed: PppoeConfig = registry.typed(&config, "pppoe").unwrap();
        assert_eq!(typed.max_sessions, 4000);
    }

    #[test]
    fn test_canonicalize_rejects_wrong_types() {
        let mut registry = PluginRegistry::new();
        registry.register::<PppoeConfig>("pppoe").unwrap();
        let descriptor = registry.get("pppoe").unwrap();

        assert!(descriptor
            .canonicalize(serde_json::json!({"max_sessions": "many"}))
            .is_err());
        assert_eq!(
            descriptor.canonicalize(serde_json::json!({})).unwrap(),
            serde_json::json!({"service_name": "", "max_sessions": 0})
        );
    }
}
