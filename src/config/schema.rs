// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Schema Descriptors
//!
//! Each configuration type describes its own shape once through
//! [`Describe`]. The accessor walks this table alongside the serialized tree,
//! so field lookup and string coercion need no runtime reflection.
//!
//! ```text
//! Config ─ Record ┬ interfaces : Map(Record InterfaceConfig)
//!                 ├ protocols  : Record ┬ bgp : Optional(Record BgpConfig)
//!                 │                     └ ...
//!                 └ plugins    : Map(Dynamic)
//! ```

use serde_json::Value;
use std::collections::BTreeMap;

/// Declared kind of a leaf value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
}

/// One field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Serialized name (case-sensitive match)
    pub external: &'static str,
    /// Rust member name (case-insensitive match)
    pub member: &'static str,
    pub node: SchemaNode,
}

impl Field {
    /// Field whose serialized name equals its member name
    pub fn new<T: Describe>(name: &'static str) -> Self {
        Self {
            external: name,
            member: name,
            node: T::describe(),
        }
    }

    /// Field serialized under a different name
    pub fn renamed<T: Describe>(external: &'static str, member: &'static str) -> Self {
        Self {
            external,
            member,
            node: T::describe(),
        }
    }
}

/// Shape of a configuration node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar(ScalarKind),
    Record(Vec<Field>),
    /// String-keyed mapping; entries allocated on demand
    Map(Box<SchemaNode>),
    /// Lazily instantiated value (`Option<T>`)
    Optional(Box<SchemaNode>),
    List(Box<SchemaNode>),
    /// Untyped JSON subtree
    Dynamic,
}

impl SchemaNode {
    /// Resolve a record field by external name, then by member name ignoring case
    pub fn field(&self, segment: &str) -> Option<&Field> {
        let SchemaNode::Record(fields) = self else {
            return None;
        };
        fields
            .iter()
            .find(|f| f.external == segment)
            .or_else(|| fields.iter().find(|f| f.member.eq_ignore_ascii_case(segment)))
    }

    /// Zero value used when a missing node must be allocated to descend into it
    pub fn empty_value(&self) -> Value {
        match self {
            SchemaNode::Record(_) | SchemaNode::Map(_) | SchemaNode::Dynamic => {
                Value::Object(Default::default())
            }
            SchemaNode::Optional(inner) => inner.empty_value(),
            SchemaNode::List(_) => Value::Array(Vec::new()),
            SchemaNode::Scalar(_) => Value::Null,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Scalar(ScalarKind::Bool) => "bool",
            SchemaNode::Scalar(ScalarKind::Int) => "integer",
            SchemaNode::Scalar(ScalarKind::Float) => "float",
            SchemaNode::Scalar(ScalarKind::Str) => "string",
            SchemaNode::Record(_) => "record",
            SchemaNode::Map(_) => "map",
            SchemaNode::Optional(inner) => inner.kind_name(),
            SchemaNode::List(_) => "list",
            SchemaNode::Dynamic => "any",
        }
    }
}

/// Types that can describe their configuration shape
pub trait Describe {
    fn describe() -> SchemaNode;
}

macro_rules! describe_scalar {
    ($kind:expr => $($t:ty),+) => {
        $(impl Describe for $t {
            fn describe() -> SchemaNode {
                SchemaNode::Scalar($kind)
            }
        })+
    };
}

describe_scalar!(ScalarKind::Bool => bool);
describe_scalar!(ScalarKind::Int => i8, i16, i32, i64, u8, u16, u32, u64, usize);
describe_scalar!(ScalarKind::Float => f32, f64);
describe_scalar!(ScalarKind::Str => String);

impl<T: Describe> Describe for Option<T> {
    fn describe() -> SchemaNode {
        SchemaNode::Optional(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> SchemaNode {
        SchemaNode::List(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for BTreeMap<String, T> {
    fn describe() -> SchemaNode {
        SchemaNode::Map(Box::new(T::describe()))
    }
}

impl Describe for Value {
    fn describe() -> SchemaNode {
        SchemaNode::Dynamic
    }
}
