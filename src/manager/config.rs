// Copyright (c) 2025 - Cowboy AI, Inc.
//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::version::FileStorage;

pub const ENV_VERSION_DIR: &str = "BNG_CONFIG_VERSION_DIR";
pub const ENV_STARTUP_PATH: &str = "BNG_CONFIG_STARTUP_PATH";
pub const ENV_PERSIST_VERSIONS: &str = "BNG_CONFIG_PERSIST_VERSIONS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManagerConfigError {
    #[error("Invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },
}

/// Storage locations and history settings of a [`ConfigManager`](super::ConfigManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Directory of `version_NNNNNN.json` files (`None` = in-memory only)
    pub version_dir: Option<PathBuf>,

    /// Startup configuration file
    pub startup_path: Option<PathBuf>,

    /// Write a version file on every commit
    pub persist_versions: bool,

    /// Cap on versions kept in memory; numbering is unaffected
    pub max_versions: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            version_dir: None,
            startup_path: None,
            persist_versions: true,
            max_versions: None,
        }
    }
}

impl ManagerConfig {
    pub fn with_version_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.version_dir = Some(dir.into());
        self
    }

    pub fn with_startup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.startup_path = Some(path.into());
        self
    }

    pub fn with_persist_versions(mut self, persist: bool) -> Self {
        self.persist_versions = persist;
        self
    }

    pub fn with_max_versions(mut self, max: usize) -> Self {
        self.max_versions = Some(max);
        self
    }

    /// Load from `BNG_CONFIG_*` environment variables, defaulting the rest
    pub fn from_env() -> Result<Self, ManagerConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ManagerConfigError> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_VERSION_DIR).filter(|v| !v.is_empty()) {
            config.version_dir = Some(dir.into());
        }
        if let Some(path) = lookup(ENV_STARTUP_PATH).filter(|v| !v.is_empty()) {
            config.startup_path = Some(path.into());
        }
        if let Some(raw) = lookup(ENV_PERSIST_VERSIONS) {
            config.persist_versions = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ManagerConfigError::InvalidVar {
                        name: ENV_PERSIST_VERSIONS,
                        value: raw,
                    })
                }
            };
        }
        Ok(config)
    }

    /// File storage rooted at the configured locations
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(self.version_dir.clone(), self.startup_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ManagerConfig::default());
        assert!(config.persist_versions);
    }

    #[test]
    fn test_env_values() {
        let config = ManagerConfig::from_lookup(lookup(&[
            (ENV_VERSION_DIR, "/var/lib/bng/versions"),
            (ENV_STARTUP_PATH, "/etc/bng/startup.json"),
            (ENV_PERSIST_VERSIONS, "off"),
        ]))
        .unwrap();

        assert_eq!(config.version_dir, Some(PathBuf::from("/var/lib/bng/versions")));
        assert_eq!(config.startup_path, Some(PathBuf::from("/etc/bng/startup.json")));
        assert!(!config.persist_versions);
    }

    #[test]
    fn test_invalid_bool() {
        let err = ManagerConfig::from_lookup(lookup(&[(ENV_PERSIST_VERSIONS, "maybe")])).unwrap_err();
        assert_eq!(
            err,
            ManagerConfigError::InvalidVar {
                name: ENV_PERSIST_VERSIONS,
                value: "maybe".into()
            }
        );
    }

    #[test]
    fn test_builders() {
        let config = ManagerConfig::default()
            .with_version_dir("/tmp/v")
            .with_max_versions(10)
            .with_persist_versions(false);
        assert_eq!(config.max_versions, Some(10));
        assert_eq!(config.file_storage().version_dir(), Some(std::path::Path::new("/tmp/v")));
    }
}
