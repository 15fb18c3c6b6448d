// Copyright (c) 2025 - Cowboy AI, Inc.
//! Version History
//!
//! Every successful commit or rollback appends one immutable
//! [`ConfigVersion`]. Numbers start at 1 and only ever increase, even when
//! the in-memory list is capped.
//!
//! ```text
//! v1 ── v2 ── v3 (rollback to version 1) ── v4 ...
//!  │     │     │
//!  └─────┴─────┴── each carries its change set and a full config snapshot
//! ```
//!
//! Durable storage of versions and of the startup configuration lives in
//! [`storage`].

pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::diff::{Change, ConfigDiff};

pub use storage::{ConfigStorage, FileStorage, MemoryStorage, StorageError};

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Version {version} out of range (latest is {latest})")]
    OutOfRange { version: u64, latest: u64 },

    #[error("Failed to encode config snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// One committed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigVersion {
    pub version: u64,
    pub commit_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<Change>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Full configuration as committed
    pub config: Config,
}

/// In-memory, append-only version list
#[derive(Debug, Clone, Default)]
pub struct VersionStore {
    versions: Vec<ConfigVersion>,
    latest: u64,
    max_in_memory: Option<usize>,
}

impl VersionStore {
    pub fn new(max_in_memory: Option<usize>) -> Self {
        Self {
            versions: Vec::new(),
            latest: 0,
            max_in_memory,
        }
    }

    /// Append the next version and return a copy of it
    pub fn append(
        &mut self,
        changes: Vec<Change>,
        message: Option<String>,
        config: Config,
    ) -> ConfigVersion {
        self.latest += 1;
        let version = ConfigVersion {
            version: self.latest,
            commit_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            changes,
            message,
            config,
        };
        self.versions.push(version.clone());
        self.enforce_cap();
        version
    }

    /// Merge versions read from storage into the in-memory list
    ///
    /// Versions already held in memory win over stored copies with the same
    /// number, and `latest` never moves backwards, so history committed but
    /// not yet persisted survives a reload.
    pub fn hydrate(&mut self, loaded: Vec<ConfigVersion>) {
        let mut merged: BTreeMap<u64, ConfigVersion> =
            loaded.into_iter().map(|v| (v.version, v)).collect();
        for version in self.versions.drain(..) {
            merged.insert(version.version, version);
        }
        let loaded_max = merged.keys().next_back().copied().unwrap_or(0);
        self.latest = self.latest.max(loaded_max);
        self.versions = merged.into_values().collect();
        self.enforce_cap();
    }

    fn enforce_cap(&mut self) {
        if let Some(max) = self.max_in_memory {
            if self.versions.len() > max {
                let excess = self.versions.len() - max;
                self.versions.drain(..excess);
            }
        }
    }

    pub fn list(&self) -> &[ConfigVersion] {
        &self.versions
    }

    /// Highest version number ever assigned
    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn get(&self, version: u64) -> Result<&ConfigVersion, VersionError> {
        self.versions
            .iter()
            .find(|v| v.version == version)
            .ok_or(VersionError::OutOfRange {
                version,
                latest: self.latest,
            })
    }

    /// Structural diff between two versions' snapshots
    pub fn diff(&self, from: u64, to: u64) -> Result<ConfigDiff, VersionError> {
        let from = self.get(from)?;
        let to = self.get(to)?;
        Ok(ConfigDiff::between_configs(&from.config, &to.config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterfaceConfig;

    fn with_interfaces(names: &[&str]) -> Config {
        let mut config = Config::default();
        for name in names {
            config.interfaces.insert(
                name.to_string(),
                InterfaceConfig {
                    name: name.to_string(),
                    enabled: true,
                    ..Default::default()
                },
            );
        }
        config
    }

    #[test]
    fn test_append_numbers_from_one() {
        let mut store = VersionStore::default();

        let v1 = store.append(vec![], None, Config::default());
        let v2 = store.append(vec![], Some("second".into()), Config::default());

        assert_eq!((v1.version, v2.version), (1, 2));
        assert_ne!(v1.commit_id, v2.commit_id);
        assert_eq!(store.get(2).unwrap().message.as_deref(), Some("second"));
        assert!(matches!(
            store.get(3),
            Err(VersionError::OutOfRange { version: 3, latest: 2 })
        ));
    }

    #[test]
    fn test_diff_between_versions() {
        let mut store = VersionStore::default();
        store.append(vec![], None, with_interfaces(&["eth0"]));
        store.append(vec![], None, with_interfaces(&["eth0", "eth1"]));

        let diff = store.diff(1, 2).unwrap();

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].path, "interfaces.eth1");
        assert!(diff.modified.is_empty());
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn test_cap_keeps_numbering() {
        let mut store = VersionStore::new(Some(2));
        for _ in 0..4 {
            store.append(vec![], None, Config::default());
        }

        assert_eq!(store.len(), 2);
        assert_eq!(store.latest(), 4);
        assert_eq!(store.list()[0].version, 3);
        assert!(store.get(1).is_err());
    }

    #[test]
    fn test_hydrate_sorts_by_number() {
        let mut source = VersionStore::default();
        let v1 = source.append(vec![], None, Config::default());
        let v2 = source.append(vec![], None, Config::default());

        let mut store = VersionStore::default();
        store.hydrate(vec![v2, v1]);

        assert_eq!(store.latest(), 2);
        assert_eq!(
            store.list().iter().map(|v| v.version).collect::<Vec<_>>(),
            vec![1, 2]
        );

        let next = store.append(vec![], None, Config::default());
        assert_eq!(next.version, 3);
    }

    #[test]
    fn test_hydrate_keeps_unpersisted_versions() {
        let mut store = VersionStore::default();
        let v1 = store.append(vec![], Some("stored".into()), Config::default());
        store.append(vec![], Some("memory only".into()), with_interfaces(&["eth0"]));

        store.hydrate(vec![v1]);

        assert_eq!(store.latest(), 2);
        assert_eq!(
            store.list().iter().map(|v| v.version).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(store.get(2).unwrap().message.as_deref(), Some("memory only"));
        assert_eq!(store.append(vec![], None, Config::default()).version, 3);
    }

    #[test]
    fn test_hydrate_never_lowers_latest() {
        let mut store = VersionStore::new(Some(1));
        for _ in 0..3 {
            store.append(vec![], None, Config::default());
        }

        store.hydrate(Vec::new());

        assert_eq!(store.latest(), 3);
        assert_eq!(store.list()[0].version, 3);
    }
}
