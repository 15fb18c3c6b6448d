// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Manager
//!
//! The manager is the one shared engine instance behind every CLI or API
//! request. It owns the running and startup configuration, the open
//! candidate sessions and the version history, all behind a single
//! read/write lock.
//!
//! ```text
//!   create_candidate_session ──> Session (copy of running)
//!          │
//!   set / verify / dry_run      (write lock, session-local)
//!          │
//!   commit ──> sort ─> apply (+callbacks) ─> reload ─> finalize
//!                          │ failure            │ failure
//!                          └──── unwind ◄───────┘
//!
//!   rollback(n) ──> diff running vs version n ─> verify ─> apply ─> finalize
//! ```
//!
//! Mutating operations hold the write lock for their whole duration, so two
//! commits never interleave. Pure reads take the read lock.

mod commit;
pub mod config;
mod rollback;
pub mod sort;

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigAccessor};
use crate::diff::ConfigDiff;
use crate::errors::{ConfigError, ConfigResult};
use crate::external::RoutingEngine;
use crate::handler::{HandlerContext, HandlerRegistry, ValidationIssue};
use crate::path::parent;
use crate::session::{Session, SessionInfo};
use crate::version::{ConfigStorage, ConfigVersion, VersionStore};

pub use config::{ManagerConfig, ManagerConfigError};

/// Everything guarded by the engine lock
#[derive(Debug)]
struct EngineState {
    running: Config,
    startup: Config,
    sessions: HashMap<String, Session>,
    versions: VersionStore,
    next_session: u64,
}

impl EngineState {
    fn session(&self, id: &str) -> ConfigResult<&Session> {
        self.sessions
            .get(id)
            .ok_or_else(|| ConfigError::SessionNotFound(id.to_string()))
    }

    fn session_mut(&mut self, id: &str) -> ConfigResult<&mut Session> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| ConfigError::SessionNotFound(id.to_string()))
    }
}

/// Transactional configuration engine
pub struct ConfigManager {
    state: RwLock<EngineState>,
    registry: Arc<HandlerRegistry>,
    accessor: ConfigAccessor,
    storage: Arc<dyn ConfigStorage>,
    routing: Option<Arc<dyn RoutingEngine>>,
    config: ManagerConfig,
}

impl ConfigManager {
    /// Create a manager persisting to the file locations in `config`
    pub fn new(registry: Arc<HandlerRegistry>, config: ManagerConfig) -> Self {
        let storage: Arc<dyn ConfigStorage> = Arc::new(config.file_storage());
        Self {
            state: RwLock::new(EngineState {
                running: Config::default(),
                startup: Config::default(),
                sessions: HashMap::new(),
                versions: VersionStore::new(config.max_versions),
                next_session: 0,
            }),
            registry,
            accessor: ConfigAccessor::default(),
            storage,
            routing: None,
            config,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn ConfigStorage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_routing(mut self, routing: Arc<dyn RoutingEngine>) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Use an accessor that knows about plugin namespaces
    pub fn with_accessor(mut self, accessor: ConfigAccessor) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn accessor(&self) -> &ConfigAccessor {
        &self.accessor
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Open a candidate session seeded with a copy of running configuration
    pub async fn create_candidate_session(&self) -> String {
        let mut state = self.state.write().await;
        state.next_session += 1;
        let id = format!("session-{}", state.next_session);
        let session = Session::new(id.clone(), &state.running);
        state.sessions.insert(id.clone(), session);
        info!(session = %id, "candidate session created");
        id
    }

    pub async fn close_candidate_session(&self, id: &str) -> ConfigResult<()> {
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .remove(id)
            .ok_or_else(|| ConfigError::SessionNotFound(id.to_string()))?;
        info!(
            session = %id,
            discarded = session.pending().len(),
            "candidate session closed"
        );
        Ok(())
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let state = self.state.read().await;
        let mut sessions: Vec<SessionInfo> = state.sessions.values().map(Session::info).collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    /// Stage `value` at `path` in a candidate session
    ///
    /// The owning handler validates the change first. On rejection neither
    /// the candidate config nor the pending list changes. A `null` value
    /// removes the resource.
    ///
    /// A resource nested under another handler's resource (a BGP neighbor
    /// under `protocols.bgp`) is only accepted once that parent exists in
    /// the candidate.
    pub async fn set(&self, id: &str, path: &str, value: Value) -> ConfigResult<()> {
        let mut state = self.state.write().await;
        let session = state.session_mut(id)?;
        let handler = self.registry.get_handler(path)?;

        if !value.is_null() {
            if let Some(owner) = self.missing_owned_parent(session.config(), path)? {
                warn!(session = %id, path, parent = owner, "change rejected, parent not configured");
                return Err(ConfigError::Validation {
                    path: path.to_string(),
                    message: format!("parent {} is not configured", owner),
                });
            }
        }

        let old_value = self.accessor.get(session.config(), path)?;

        let mut candidate = session.config().clone();
        self.accessor.set(&mut candidate, path, value)?;
        let new_value = self.accessor.get(&candidate, path)?.unwrap_or(Value::Null);

        let ctx = HandlerContext::new(id, path, old_value, new_value);
        if let Err(err) = handler.validate(&ctx).await {
            warn!(session = %id, path, error = %err, "change rejected");
            return Err(ConfigError::Validation {
                path: path.to_string(),
                message: err.to_string(),
            });
        }

        *session.config_mut() = candidate;
        session.push(ctx);
        debug!(session = %id, path, pending = session.pending().len(), "change staged");
        Ok(())
    }

    /// Nearest ancestor of `path` that a handler owns but `config` lacks
    fn missing_owned_parent<'p>(
        &self,
        config: &Config,
        path: &'p str,
    ) -> ConfigResult<Option<&'p str>> {
        let mut current = parent(path);
        while let Some(ancestor) = current {
            if self.registry.get_handler(ancestor).is_ok() {
                let present = self
                    .accessor
                    .get(config, ancestor)?
                    .is_some_and(|v| !v.is_null());
                if !present {
                    return Ok(Some(ancestor));
                }
            }
            current = parent(ancestor);
        }
        Ok(None)
    }

    /// Removal of a subtree as its own operation
    pub async fn delete(&self, id: &str, _path: &str) -> ConfigResult<()> {
        self.state.read().await.session(id)?;
        Err(ConfigError::NotImplemented("delete"))
    }

    /// Partial update of an existing value as its own operation
    pub async fn modify(&self, id: &str, _path: &str, _value: Value) -> ConfigResult<()> {
        self.state.read().await.session(id)?;
        Err(ConfigError::NotImplemented("modify"))
    }

    /// Read a value from a candidate session
    pub async fn get(&self, id: &str, path: &str) -> ConfigResult<Option<Value>> {
        let state = self.state.read().await;
        Ok(self.accessor.get(state.session(id)?.config(), path)?)
    }

    /// Re-validate every pending change, collecting all issues
    pub async fn verify(&self, id: &str) -> ConfigResult<Vec<ValidationIssue>> {
        let state = self.state.write().await;
        let session = state.session(id)?;
        let issues = self.collect_issues(session.pending()).await;
        debug!(session = %id, issues = issues.len(), "session verified");
        Ok(issues)
    }

    /// What a commit of this session would change
    pub async fn dry_run(&self, id: &str) -> ConfigResult<ConfigDiff> {
        let state = self.state.write().await;
        Ok(ConfigDiff::from_pending(state.session(id)?.pending()))
    }

    async fn collect_issues(&self, pending: &[HandlerContext]) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for ctx in pending {
            let result = match self.registry.get_handler(&ctx.path) {
                Ok(handler) => handler.validate(ctx).await.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            if let Err(message) = result {
                issues.push(ValidationIssue {
                    path: ctx.path.clone(),
                    message,
                });
            }
        }
        issues
    }

    // ========================================================================
    // Running / startup configuration
    // ========================================================================

    pub async fn get_running(&self) -> Config {
        self.state.read().await.running.clone()
    }

    pub async fn get_startup(&self) -> Config {
        self.state.read().await.startup.clone()
    }

    pub async fn get_running_path(&self, path: &str) -> ConfigResult<Option<Value>> {
        let state = self.state.read().await;
        Ok(self.accessor.get(&state.running, path)?)
    }

    /// Load the startup file into running and startup configuration
    ///
    /// Returns `false` when there is no startup file.
    pub async fn load_startup(&self) -> ConfigResult<bool> {
        let Some(config) = self.storage.read_startup().await? else {
            info!("no startup configuration found");
            return Ok(false);
        };
        let mut state = self.state.write().await;
        state.running = config.clone();
        state.startup = config;
        info!(
            interfaces = state.running.interfaces.len(),
            "startup configuration loaded"
        );
        Ok(true)
    }

    /// Replace a session's candidate with a copy of startup configuration
    pub async fn load_startup_into_session(&self, id: &str) -> ConfigResult<()> {
        let mut state = self.state.write().await;
        let startup = state.startup.clone();
        state.session_mut(id)?.reset_to(&startup);
        info!(session = %id, "startup configuration loaded into session");
        Ok(())
    }

    /// Copy running into startup and write it out
    pub async fn save_startup(&self) -> ConfigResult<()> {
        let mut state = self.state.write().await;
        state.startup = state.running.clone();
        self.storage.write_startup(&state.startup).await?;
        info!("startup configuration saved");
        Ok(())
    }

    // ========================================================================
    // Versions
    // ========================================================================

    /// Hydrate the version list from storage; returns how many were read
    pub async fn load_versions(&self) -> ConfigResult<usize> {
        let versions = self.storage.read_versions().await?;
        let count = versions.len();
        let mut state = self.state.write().await;
        state.versions.hydrate(versions);
        info!(count, latest = state.versions.latest(), "version history loaded");
        Ok(count)
    }

    pub async fn list_versions(&self) -> Vec<ConfigVersion> {
        self.state.read().await.versions.list().to_vec()
    }

    pub async fn get_version(&self, version: u64) -> ConfigResult<ConfigVersion> {
        let state = self.state.read().await;
        Ok(state.versions.get(version)?.clone())
    }

    pub async fn get_version_diff(&self, from: u64, to: u64) -> ConfigResult<ConfigDiff> {
        let state = self.state.read().await;
        Ok(state.versions.diff(from, to)?)
    }
}
