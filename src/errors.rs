// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for configuration engine operations
//!
//! Every engine operation returns [`ConfigResult`]. Variants group by how a
//! caller should react:
//!
//! - structural: `SessionNotFound`, `Path`, `Access`, `Registry`,
//!   `VersionOutOfRange`
//! - business: `Validation`, `VerificationFailed`
//! - dependency: `CircularDependency`
//! - side effects (already compensated): `ApplyFailed`, `Reload`
//! - durability (in-memory state already committed): `Persistence`

use thiserror::Error;

use crate::config::AccessError;
use crate::external::RoutingError;
use crate::handler::{RegistryError, StageError, ValidationIssue};
use crate::path::PathError;
use crate::version::{StorageError, VersionError};

/// Errors that can occur in configuration engine operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown candidate session id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A handler rejected a value; session state unchanged
    #[error("Validation failed for {path}: {message}")]
    Validation { path: String, message: String },

    #[error("Verification failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    VerificationFailed(Vec<ValidationIssue>),

    /// Pending changes depend on each other in a cycle; nothing was applied
    #[error("Circular dependency among pending changes: {}", .paths.join(", "))]
    CircularDependency { paths: Vec<String> },

    #[error("No changes to commit")]
    NoChanges,

    /// Applying a change failed; earlier changes were compensated
    #[error("Apply failed at {path}: {source}")]
    ApplyFailed {
        path: String,
        #[source]
        source: StageError,
    },

    /// Routing engine test or reload failed; applied changes were compensated
    #[error("Routing engine reload failed: {0}")]
    Reload(#[source] RoutingError),

    /// The change is live in memory but was not written to storage
    #[error("Version {version} committed in memory but persistence failed: {source}")]
    Persistence {
        version: u64,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Version {version} out of range (latest is {latest})")]
    VersionOutOfRange { version: u64, latest: u64 },

    #[error("Failed to encode config snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Result type for configuration engine operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<VersionError> for ConfigError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::OutOfRange { version, latest } => {
                ConfigError::VersionOutOfRange { version, latest }
            }
            VersionError::Snapshot(e) => ConfigError::Snapshot(e),
        }
    }
}

impl ConfigError {
    /// Path of the change that caused the error, when there is one
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::Validation { path, .. } | ConfigError::ApplyFailed { path, .. } => {
                Some(path)
            }
            ConfigError::VerificationFailed(issues) => issues.first().map(|i| i.path.as_str()),
            _ => None,
        }
    }
}
