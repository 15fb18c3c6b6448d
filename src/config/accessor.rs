// Copyright (c) 2025 - Cowboy AI, Inc.
//! Config Accessor
//!
//! Dotted-path `get`/`set` over a [`Config`] tree. The tree is viewed through
//! its serialized form and walked alongside the [`SchemaNode`] table:
//!
//! - **Record**: segment matches a field's external name (case-sensitive),
//!   otherwise its member name ignoring case
//! - **Map**: segment is the key; `set` allocates a zero-valued entry
//! - **Optional**: `get` through an absent value yields `None`; `set`
//!   instantiates it
//!
//! Setting `null` on a map entry removes the entry; on an optional field it
//! clears the field.
//!
//! A `set` writes into a copy and only replaces the caller's config once the
//! whole tree deserializes again, so a failed `set` leaves it untouched.
//!
//! Paths whose leading segments name a registered plugin namespace resolve
//! inside that plugin's typed document instead of the root fields.

use serde_json::{Number, Value};
use std::sync::Arc;
use thiserror::Error;

use super::plugin::PluginRegistry;
use super::schema::{Describe, ScalarKind, SchemaNode};
use super::Config;
use crate::path::{split_path, PathError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Unknown field {segment:?} in path {path}")]
    UnknownField { segment: String, path: String },

    #[error("Cannot navigate into {segment:?} in path {path}: not a record or map")]
    NotNavigable { segment: String, path: String },

    #[error("Cannot convert {value} to {expected} at {path}")]
    Conversion {
        path: String,
        expected: String,
        value: String,
    },

    #[error("Invalid value at {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl AccessError {
    fn decode(path: &str, err: impl std::fmt::Display) -> Self {
        AccessError::Decode {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Path-addressed reader/writer for [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigAccessor {
    schema: SchemaNode,
    plugins: Arc<PluginRegistry>,
}

impl Default for ConfigAccessor {
    fn default() -> Self {
        Self::new(Arc::new(PluginRegistry::default()))
    }
}

impl ConfigAccessor {
    pub fn new(plugins: Arc<PluginRegistry>) -> Self {
        Self {
            schema: Config::describe(),
            plugins,
        }
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Read the value at `path`; `Ok(None)` when absent
    pub fn get(&self, config: &Config, path: &str) -> Result<Option<Value>, AccessError> {
        let segments = split_path(path)?;
        let root = serde_json::to_value(config).map_err(|e| AccessError::decode(path, e))?;

        if let Some((plugin, rest)) = self.plugins.lookup(path) {
            let document = root
                .get("plugins")
                .and_then(|p| p.get(plugin.namespace()))
                .filter(|d| !d.is_null());
            let Some(document) = document else {
                return Ok(None);
            };
            return match rest {
                None => Ok(Some(document.clone())),
                Some(rest) => lookup(document, plugin.schema(), &split_path(rest)?, path),
            };
        }

        lookup(&root, &self.schema, &segments, path)
    }

    /// Write `value` at `path`, coercing strings to the declared leaf type
    pub fn set(&self, config: &mut Config, path: &str, value: Value) -> Result<(), AccessError> {
        let segments = split_path(path)?;
        let mut root = serde_json::to_value(&*config).map_err(|e| AccessError::decode(path, e))?;

        if let Some((plugin, rest)) = self.plugins.lookup(path) {
            let plugins = root
                .get_mut("plugins")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| AccessError::decode(path, "plugins is not a map"))?;

            let mut document = match plugins.remove(plugin.namespace()) {
                Some(doc) if !doc.is_null() => doc,
                _ => plugin
                    .default_value()
                    .map_err(|e| AccessError::decode(path, e))?,
            };

            match rest {
                None => document = coerce(plugin.schema(), value, path)?,
                Some(rest) => assign(&mut document, plugin.schema(), &split_path(rest)?, value, path)?,
            }

            let document = plugin
                .canonicalize(document)
                .map_err(|e| AccessError::decode(path, e))?;
            plugins.insert(plugin.namespace().to_string(), document);
        } else {
            assign(&mut root, &self.schema, &segments, value, path)?;
        }

        *config = serde_json::from_value(root).map_err(|e| AccessError::decode(path, e))?;
        Ok(())
    }
}

fn lookup(
    mut node: &Value,
    mut schema: &SchemaNode,
    segments: &[&str],
    path: &str,
) -> Result<Option<Value>, AccessError> {
    for segment in segments {
        while let SchemaNode::Optional(inner) = schema {
            if node.is_null() {
                return Ok(None);
            }
            schema = inner.as_ref();
        }

        let child = match schema {
            SchemaNode::Record(_) => {
                let field = schema
                    .field(segment)
                    .ok_or_else(|| unknown_field(segment, path))?;
                schema = &field.node;
                node.get(field.external)
            }
            SchemaNode::Map(inner) => {
                schema = inner.as_ref();
                node.get(*segment)
            }
            SchemaNode::Dynamic => match node {
                Value::Object(map) => map.get(*segment),
                Value::Null => None,
                _ => return Err(not_navigable(segment, path)),
            },
            SchemaNode::Scalar(_) | SchemaNode::List(_) | SchemaNode::Optional(_) => {
                return Err(not_navigable(segment, path))
            }
        };

        match child {
            Some(child) => node = child,
            None => return Ok(None),
        }
    }

    if node.is_null() {
        Ok(None)
    } else {
        Ok(Some(node.clone()))
    }
}

fn assign(
    root: &mut Value,
    schema: &SchemaNode,
    segments: &[&str],
    value: Value,
    path: &str,
) -> Result<(), AccessError> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(PathError::EmptySegment(path.to_string()).into());
    };

    let mut node = root;
    let mut schema = schema;
    for segment in parents {
        let (child, child_schema) = descend(node, schema, segment, path)?;
        node = child;
        schema = child_schema;
    }

    let schema = instantiate(node, schema);
    let (slot_schema, key) = match schema {
        SchemaNode::Record(_) => {
            let field = schema
                .field(last)
                .ok_or_else(|| unknown_field(last, path))?;
            (&field.node, field.external.to_string())
        }
        SchemaNode::Map(inner) => (inner.as_ref(), last.to_string()),
        SchemaNode::Dynamic => (schema, last.to_string()),
        _ => return Err(not_navigable(last, path)),
    };

    let removes_entry = value.is_null() && matches!(schema, SchemaNode::Map(_) | SchemaNode::Dynamic);
    let object = node
        .as_object_mut()
        .ok_or_else(|| not_navigable(last, path))?;
    if removes_entry {
        object.remove(&key);
    } else {
        object.insert(key, coerce(slot_schema, value, path)?);
    }
    Ok(())
}

/// Step into `segment`, allocating missing entries and absent optionals
fn descend<'v, 's>(
    node: &'v mut Value,
    schema: &'s SchemaNode,
    segment: &str,
    path: &str,
) -> Result<(&'v mut Value, &'s SchemaNode), AccessError> {
    let schema = instantiate(node, schema);

    let (key, child_schema) = match schema {
        SchemaNode::Record(_) => {
            let field = schema
                .field(segment)
                .ok_or_else(|| unknown_field(segment, path))?;
            (field.external.to_string(), &field.node)
        }
        SchemaNode::Map(inner) => (segment.to_string(), inner.as_ref()),
        SchemaNode::Dynamic => (segment.to_string(), schema),
        _ => return Err(not_navigable(segment, path)),
    };

    let object = node
        .as_object_mut()
        .ok_or_else(|| not_navigable(segment, path))?;
    let child = object
        .entry(key)
        .or_insert_with(|| child_schema.empty_value());
    Ok((child, child_schema))
}

/// Unwrap optionals, replacing an absent container with its zero value
fn instantiate<'s>(node: &mut Value, mut schema: &'s SchemaNode) -> &'s SchemaNode {
    while let SchemaNode::Optional(inner) = schema {
        schema = inner.as_ref();
    }
    if node.is_null() {
        *node = schema.empty_value();
    }
    schema
}

/// Make `value` assignable to a slot of the given schema
fn coerce(schema: &SchemaNode, value: Value, path: &str) -> Result<Value, AccessError> {
    let conversion = |value: &Value| AccessError::Conversion {
        path: path.to_string(),
        expected: schema.kind_name().to_string(),
        value: value.to_string(),
    };

    match schema {
        SchemaNode::Optional(inner) => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                coerce(inner, value, path)
            }
        }
        SchemaNode::Scalar(kind) => {
            if scalar_matches(*kind, &value) {
                return Ok(value);
            }
            match &value {
                Value::String(raw) => parse_scalar(*kind, raw).ok_or_else(|| conversion(&value)),
                _ => Err(conversion(&value)),
            }
        }
        SchemaNode::Record(_) | SchemaNode::Map(_) if value.is_object() => Ok(value),
        SchemaNode::List(_) if value.is_array() => Ok(value),
        SchemaNode::Dynamic => Ok(value),
        _ => Err(conversion(&value)),
    }
}

fn scalar_matches(kind: ScalarKind, value: &Value) -> bool {
    match kind {
        ScalarKind::Bool => value.is_boolean(),
        ScalarKind::Int => value.is_i64() || value.is_u64(),
        ScalarKind::Float => value.is_number(),
        ScalarKind::Str => value.is_string(),
    }
}

fn parse_scalar(kind: ScalarKind, raw: &str) -> Option<Value> {
    let raw = raw.trim();
    match kind {
        ScalarKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "1" | "t" | "true" => Some(Value::Bool(true)),
            "0" | "f" | "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ScalarKind::Int => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<u64>().map(Value::from))
            .ok(),
        ScalarKind::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ScalarKind::Str => Some(Value::String(raw.to_string())),
    }
}

fn unknown_field(segment: &str, path: &str) -> AccessError {
    AccessError::UnknownField {
        segment: segment.to_string(),
        path: path.to_string(),
    }
}

fn not_navigable(segment: &str, path: &str) -> AccessError {
    AccessError::NotNavigable {
        segment: segment.to_string(),
        path: path.to_string(),
    }
}
