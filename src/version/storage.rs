// Copyright (c) 2025 - Cowboy AI, Inc.
//! Durable Configuration Storage
//!
//! Layout used by [`FileStorage`]:
//!
//! ```text
//! <version_dir>/version_000001.json     one ConfigVersion per file
//! <version_dir>/version_000002.json
//! <startup_path>                        startup Config
//! ```
//!
//! Files are pretty-printed JSON written to a sibling temp file and renamed
//! into place, so a reader never sees a half-written file.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use super::ConfigVersion;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode {what}: {source}")]
    Encode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where committed versions and the startup config are kept
#[async_trait]
pub trait ConfigStorage: Send + Sync {
    async fn write_version(&self, version: &ConfigVersion) -> Result<(), StorageError>;

    /// Every stored version, sorted by number
    async fn read_versions(&self) -> Result<Vec<ConfigVersion>, StorageError>;

    async fn write_startup(&self, config: &Config) -> Result<(), StorageError>;

    /// `None` when no startup config has been saved
    async fn read_startup(&self) -> Result<Option<Config>, StorageError>;
}

/// File name of a version, zero-padded so names sort by number
pub fn version_file_name(version: u64) -> String {
    format!("version_{:06}.json", version)
}

fn is_version_file(name: &str) -> bool {
    name.strip_prefix("version_")
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// JSON files on the local filesystem; unset paths disable that half
#[derive(Debug, Clone, Default)]
pub struct FileStorage {
    version_dir: Option<PathBuf>,
    startup_path: Option<PathBuf>,
}

impl FileStorage {
    pub fn new(version_dir: Option<PathBuf>, startup_path: Option<PathBuf>) -> Self {
        Self {
            version_dir,
            startup_path,
        }
    }

    pub fn version_dir(&self) -> Option<&Path> {
        self.version_dir.as_deref()
    }

    pub fn startup_path(&self) -> Option<&Path> {
        self.startup_path.as_deref()
    }

    async fn write_json(path: &Path, bytes: Vec<u8>) -> Result<(), StorageError> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::io(dir, e))?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StorageError::io(path, e))
    }
}

#[async_trait]
impl ConfigStorage for FileStorage {
    async fn write_version(&self, version: &ConfigVersion) -> Result<(), StorageError> {
        let Some(dir) = &self.version_dir else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(version).map_err(|source| StorageError::Encode {
            what: format!("version {}", version.version),
            source,
        })?;
        let path = dir.join(version_file_name(version.version));
        Self::write_json(&path, bytes).await?;
        tracing::debug!(path = %path.display(), version = version.version, "version persisted");
        Ok(())
    }

    async fn read_versions(&self) -> Result<Vec<ConfigVersion>, StorageError> {
        let Some(dir) = &self.version_dir else {
            return Ok(Vec::new());
        };

        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(dir, e)),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(dir, e))?
        {
            let path = entry.path();
            let is_version = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_version_file);
            if !is_version {
                continue;
            }
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| StorageError::io(&path, e))?;
            let version: ConfigVersion = serde_json::from_slice(&bytes)
                .map_err(|source| StorageError::Decode { path: path.clone(), source })?;
            versions.push(version);
        }

        versions.sort_by_key(|v| v.version);
        Ok(versions)
    }

    async fn write_startup(&self, config: &Config) -> Result<(), StorageError> {
        let Some(path) = &self.startup_path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(config).map_err(|source| StorageError::Encode {
            what: "startup config".into(),
            source,
        })?;
        Self::write_json(path, bytes).await?;
        tracing::debug!(path = %path.display(), "startup config persisted");
        Ok(())
    }

    async fn read_startup(&self) -> Result<Option<Config>, StorageError> {
        let Some(path) = &self.startup_path else {
            return Ok(None);
        };
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                path: path.clone(),
                source,
            })
    }
}

/// Process-local storage with switchable write failures
#[derive(Debug, Default)]
pub struct MemoryStorage {
    versions: Mutex<BTreeMap<u64, ConfigVersion>>,
    startup: Mutex<Option<Config>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn stored_versions(&self) -> Vec<u64> {
        self.versions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect()
    }

    pub fn stored_startup(&self) -> Option<Config> {
        self.startup.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStorage for MemoryStorage {
    async fn write_version(&self, version: &ConfigVersion) -> Result<(), StorageError> {
        self.check_writable()?;
        self.versions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(version.version, version.clone());
        Ok(())
    }

    async fn read_versions(&self) -> Result<Vec<ConfigVersion>, StorageError> {
        Ok(self
            .versions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect())
    }

    async fn write_startup(&self, config: &Config) -> Result<(), StorageError> {
        self.check_writable()?;
        *self.startup.lock().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(())
    }

    async fn read_startup(&self) -> Result<Option<Config>, StorageError> {
        Ok(self.stored_startup())
    }
}
