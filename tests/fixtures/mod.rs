// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for bng-config
//!
//! Provides journaling handlers, a scriptable routing engine and manager
//! builders backed by in-memory storage.
//!
//! # Design Principles
//! - Every side effect a test cares about lands in a shared [`Journal`]
//! - Failures are injected per handler, never by timing
//! - Managers never touch the filesystem unless a test asks for it
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use bng_config::external::RoutingError;
use bng_config::handler::{Handler, HandlerContext, HandlerError};
use bng_config::path::PathPattern;
use bng_config::{
    Config, ConfigManager, HandlerCatalog, HandlerDeps, HandlerRegistry, LoggingDataplane,
    ManagerConfig, MemoryStorage, RoutingEngine,
};

/// Ordered record of handler and routing calls, e.g. `apply:vrfs.a`
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries starting with `prefix:`, with the prefix stripped
    pub fn calls(&self, prefix: &str) -> Vec<String> {
        let marker = format!("{}:", prefix);
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_prefix(&marker).map(str::to_string))
            .collect()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

/// Handler that journals every call and fails on request
pub struct RecordingHandler {
    pattern: PathPattern,
    dependencies: Vec<PathPattern>,
    journal: Journal,
    reject: Mutex<Option<String>>,
    fail_apply: bool,
    fail_rollback: bool,
    reload: bool,
}

impl RecordingHandler {
    pub fn new(pattern: &str, journal: &Journal) -> Self {
        Self {
            pattern: PathPattern::parse(pattern).unwrap(),
            dependencies: Vec::new(),
            journal: journal.clone(),
            reject: Mutex::new(None),
            fail_apply: false,
            fail_rollback: false,
            reload: false,
        }
    }

    pub fn depends_on(mut self, pattern: &str) -> Self {
        self.dependencies.push(PathPattern::parse(pattern).unwrap());
        self
    }

    pub fn rejecting(self, message: &str) -> Self {
        self.set_rejection(Some(message));
        self
    }

    /// Change the validation outcome of later calls
    pub fn set_rejection(&self, message: Option<&str>) {
        *self.reject.lock().unwrap() = message.map(str::to_string);
    }

    pub fn failing_apply(mut self) -> Self {
        self.fail_apply = true;
        self
    }

    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn requesting_reload(mut self) -> Self {
        self.reload = true;
        self
    }

    pub fn shared(self) -> Arc<dyn Handler> {
        Arc::new(self)
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    fn dependencies(&self) -> &[PathPattern] {
        &self.dependencies
    }

    async fn validate(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        self.journal.record(format!("validate:{}", ctx.path));
        match self.reject.lock().unwrap().clone() {
            Some(message) => Err(HandlerError::validation(message)),
            None => Ok(()),
        }
    }

    async fn apply(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        self.journal.record(format!("apply:{}", ctx.path));
        if self.fail_apply {
            return Err(HandlerError::Other(format!("injected failure at {}", ctx.path)));
        }
        Ok(())
    }

    async fn rollback(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        self.journal.record(format!("rollback:{}", ctx.path));
        if self.fail_rollback {
            return Err(HandlerError::Other("rollback failed".into()));
        }
        Ok(())
    }

    async fn post_apply(&self, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        if self.reload {
            ctx.reload_needed = true;
        }
        Ok(())
    }
}

/// Routing engine whose test and reload steps can be made to fail
#[derive(Debug, Default)]
pub struct ScriptedRouting {
    journal: Journal,
    fail_test: bool,
    fail_reload: bool,
}

impl ScriptedRouting {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            ..Default::default()
        }
    }

    pub fn failing_test(mut self) -> Self {
        self.fail_test = true;
        self
    }

    pub fn failing_reload(mut self) -> Self {
        self.fail_reload = true;
        self
    }
}

#[async_trait]
impl RoutingEngine for ScriptedRouting {
    fn generate(&self, config: &Config) -> Result<String, RoutingError> {
        self.journal.record("routing:generate");
        bng_config::external::render_frr_config(config)
    }

    async fn test(&self, _rendered: &str) -> Result<(), RoutingError> {
        self.journal.record("routing:test");
        if self.fail_test {
            return Err(RoutingError::TestFailed("syntax error".into()));
        }
        Ok(())
    }

    async fn reload(&self, _rendered: &str) -> Result<(), RoutingError> {
        self.journal.record("routing:reload");
        if self.fail_reload {
            return Err(RoutingError::ReloadFailed("daemon unreachable".into()));
        }
        Ok(())
    }
}

/// Manager over explicit handlers and in-memory storage
pub fn manager_with(handlers: Vec<Arc<dyn Handler>>) -> (ConfigManager, Arc<MemoryStorage>) {
    let mut registry = HandlerRegistry::new();
    for handler in handlers {
        registry.register(handler).unwrap();
    }
    let storage = Arc::new(MemoryStorage::new());
    let manager = ConfigManager::new(Arc::new(registry), ManagerConfig::default())
        .with_storage(storage.clone());
    (manager, storage)
}

/// Manager over the built-in handlers with a recording dataplane
pub struct BuiltinHarness {
    pub manager: ConfigManager,
    pub dataplane: Arc<LoggingDataplane>,
    pub storage: Arc<MemoryStorage>,
}

pub fn builtin_manager() -> BuiltinHarness {
    builtin_manager_with(LoggingDataplane::new())
}

pub fn builtin_manager_with(dataplane: LoggingDataplane) -> BuiltinHarness {
    let dataplane = Arc::new(dataplane);
    let deps = HandlerDeps::new(dataplane.clone());
    let mut registry = HandlerRegistry::new();
    registry.auto_register_all(&HandlerCatalog::builtin(), &deps);

    let storage = Arc::new(MemoryStorage::new());
    let manager = ConfigManager::new(Arc::new(registry), ManagerConfig::default())
        .with_storage(storage.clone());
    BuiltinHarness {
        manager,
        dataplane,
        storage,
    }
}

pub fn interface(name: &str) -> Value {
    json!({ "name": name, "enabled": true })
}

pub fn vrf(table_id: u32) -> Value {
    json!({ "table-id": table_id })
}

/// Create a session, stage `changes` in order and commit it
pub async fn commit_changes(manager: &ConfigManager, changes: &[(&str, Value)]) -> u64 {
    let id = manager.create_candidate_session().await;
    for (path, value) in changes {
        manager.set(&id, path, value.clone()).await.unwrap();
    }
    manager.commit(&id).await.unwrap().version
}
