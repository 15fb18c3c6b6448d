// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Diffs
//!
//! Two sources produce the same Added / Modified / Deleted shape:
//!
//! - [`ConfigDiff::from_pending`] summarizes a session's pending changes
//!   (dry-run, version change sets)
//! - [`ConfigDiff::between`] structurally compares two trees (version diffs,
//!   rollback change derivation)
//!
//! A `null` value is treated the same as an absent key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::config::Config;
use crate::handler::HandlerContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Modify,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Add => "add",
            ChangeKind::Modify => "modify",
            ChangeKind::Delete => "delete",
        })
    }
}

/// One typed change record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: String,
    /// Rendered new value (old value for deletions)
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
}

impl Change {
    fn classify(path: &str, old: Option<&Value>, new: Option<&Value>) -> Option<Self> {
        let old = old.filter(|v| !v.is_null());
        let new = new.filter(|v| !v.is_null());
        let change = match (old, new) {
            (None, None) => return None,
            (None, Some(new)) => Change {
                kind: ChangeKind::Add,
                path: path.to_string(),
                value: render_value(new),
                old_value: None,
            },
            (Some(old), None) => Change {
                kind: ChangeKind::Delete,
                path: path.to_string(),
                value: render_value(old),
                old_value: None,
            },
            (Some(old), Some(new)) if old == new => return None,
            (Some(old), Some(new)) => Change {
                kind: ChangeKind::Modify,
                path: path.to_string(),
                value: render_value(new),
                old_value: Some(render_value(old)),
            },
        };
        Some(change)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.old_value) {
            (ChangeKind::Modify, Some(old)) => {
                write!(f, "~ {}: {} -> {}", self.path, old, self.value)
            }
            (ChangeKind::Add, _) => write!(f, "+ {}: {}", self.path, self.value),
            (ChangeKind::Delete, _) => write!(f, "- {}: {}", self.path, self.value),
            (ChangeKind::Modify, None) => write!(f, "~ {}: {}", self.path, self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub added: Vec<Change>,
    pub modified: Vec<Change>,
    pub deleted: Vec<Change>,
}

impl ConfigDiff {
    /// Summarize pending changes
    ///
    /// Several changes to one path collapse into one entry: the first
    /// captured old value against the last new value.
    pub fn from_pending(pending: &[HandlerContext]) -> Self {
        let mut order: Vec<&str> = Vec::new();
        for ctx in pending {
            if !order.contains(&ctx.path.as_str()) {
                order.push(&ctx.path);
            }
        }

        let mut diff = ConfigDiff::default();
        for path in order {
            let mut changes = pending.iter().filter(|ctx| ctx.path == path);
            let Some(first) = changes.next() else {
                continue;
            };
            let last = changes.last().unwrap_or(first);
            if let Some(change) = Change::classify(path, first.old_value.as_ref(), Some(&last.new_value)) {
                diff.push(change);
            }
        }
        diff
    }

    /// Structural comparison of two trees
    pub fn between(from: &Value, to: &Value) -> Self {
        let mut diff = ConfigDiff::default();
        walk(&mut diff, "", Some(from), Some(to));
        diff
    }

    pub fn between_configs(from: &Config, to: &Config) -> Result<Self, serde_json::Error> {
        Ok(Self::between(
            &serde_json::to_value(from)?,
            &serde_json::to_value(to)?,
        ))
    }

    fn push(&mut self, change: Change) {
        match change.kind {
            ChangeKind::Add => self.added.push(change),
            ChangeKind::Modify => self.modified.push(change),
            ChangeKind::Delete => self.deleted.push(change),
        }
    }

    /// All changes: added, then modified, then deleted
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .chain(self.deleted.iter())
    }

    pub fn into_changes(self) -> Vec<Change> {
        let mut all = self.added;
        all.extend(self.modified);
        all.extend(self.deleted);
        all
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn walk(diff: &mut ConfigDiff, prefix: &str, from: Option<&Value>, to: Option<&Value>) {
    if let (Some(Value::Object(a)), Some(Value::Object(b))) = (from, to) {
        let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
        for key in keys {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            walk(diff, &path, a.get(key), b.get(key));
        }
        return;
    }

    if let Some(change) = Change::classify(prefix, from, to) {
        diff.push(change);
    }
}

/// Strings render bare; everything else as compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx(path: &str, old: Option<Value>, new: Value) -> HandlerContext {
        HandlerContext::new("session-1", path, old, new)
    }

    #[test]
    fn test_from_pending_classifies() {
        let pending = vec![
            ctx("interfaces.eth0", None, json!({"name": "eth0"})),
            ctx("protocols.bgp", Some(json!({"asn": 1})), json!({"asn": 2})),
            ctx("vrfs.red", Some(json!({"table-id": 5})), Value::Null),
        ];

        let diff = ConfigDiff::from_pending(&pending);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].path, "interfaces.eth0");
        assert_eq!(diff.modified[0].old_value.as_deref(), Some(r#"{"asn":1}"#));
        assert_eq!(diff.deleted[0].path, "vrfs.red");
        assert_eq!(diff.len(), 3);
    }

    #[test]
    fn test_from_pending_collapses_repeated_paths() {
        let pending = vec![
            ctx("interfaces.eth0", None, json!({"mtu": 1500})),
            ctx("interfaces.eth0", Some(json!({"mtu": 1500})), json!({"mtu": 9000})),
        ];

        let diff = ConfigDiff::from_pending(&pending);

        assert_eq!(
            diff.into_changes(),
            vec![Change {
                kind: ChangeKind::Add,
                path: "interfaces.eth0".into(),
                value: r#"{"mtu":9000}"#.into(),
                old_value: None,
            }]
        );
    }

    #[test]
    fn test_from_pending_skips_no_op() {
        let pending = vec![ctx("protocols.bgp", Some(json!({"asn": 1})), json!({"asn": 1}))];
        assert!(ConfigDiff::from_pending(&pending).is_empty());
    }

    #[test]
    fn test_between_structural() {
        let from = json!({"interfaces": {"eth0": {"mtu": 1500}}, "vrfs": {"red": {"table-id": 1}}});
        let to = json!({"interfaces": {"eth0": {"mtu": 9000}, "eth1": {"mtu": 1500}}, "vrfs": {}});

        let diff = ConfigDiff::between(&from, &to);

        assert_eq!(diff.added[0].path, "interfaces.eth1");
        assert_eq!(diff.modified[0].path, "interfaces.eth0.mtu");
        assert_eq!(diff.modified[0].value, "9000");
        assert_eq!(diff.deleted[0].path, "vrfs.red");
    }

    #[test]
    fn test_null_equals_absent() {
        let diff = ConfigDiff::between(&json!({"a": null}), &json!({}));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_change_display() {
        let change = Change {
            kind: ChangeKind::Modify,
            path: "interfaces.eth0.mtu".into(),
            value: "9000".into(),
            old_value: Some("1500".into()),
        };
        assert_eq!(change.to_string(), "~ interfaces.eth0.mtu: 1500 -> 9000");
        assert_eq!(render_value(&json!("eth0")), "eth0");
    }
}
