// Copyright (c) 2025 - Cowboy AI, Inc.
//! Handler Registry
//!
//! Maps each registered handler's pattern string to the handler. Resolution
//! of a concrete path tries a direct lookup by the path itself first, so
//! top-level resources registered under a literal pattern resolve in one
//! step; otherwise every pattern is matched and the most specific match
//! (most literal segments) wins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::{Handler, HandlerCatalog, HandlerDeps};
use crate::path::parent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Handler already registered for pattern {0}")]
    DuplicatePattern(String),

    #[error("No handler for path {0}")]
    NoHandler(String),
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("patterns", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its pattern
    ///
    /// Registering the same pattern string twice is a wiring mistake and is
    /// rejected.
    pub fn register(&mut self, handler: Arc<dyn Handler>) -> Result<(), RegistryError> {
        let key = handler.pattern().as_str().to_string();
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::DuplicatePattern(key));
        }
        tracing::debug!(pattern = %key, "handler registered");
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Instantiate every factory of the catalog, skipping patterns already
    /// present. Returns the number of handlers added.
    pub fn auto_register_all(&mut self, catalog: &HandlerCatalog, deps: &HandlerDeps) -> usize {
        let mut added = 0;
        for factory in catalog.factories() {
            let handler = factory(deps);
            let key = handler.pattern().as_str();
            if self.handlers.contains_key(key) {
                continue;
            }
            if self.register(handler).is_ok() {
                added += 1;
            }
        }
        tracing::info!(added, total = self.handlers.len(), "handlers auto-registered");
        added
    }

    /// Resolve the handler owning a concrete path
    pub fn get_handler(&self, path: &str) -> Result<Arc<dyn Handler>, RegistryError> {
        if let Some(handler) = self.handlers.get(path) {
            return Ok(Arc::clone(handler));
        }

        let mut best: Option<&Arc<dyn Handler>> = None;
        for handler in self.handlers.values() {
            if !handler.pattern().matches(path) {
                continue;
            }
            let more_specific = best.map_or(true, |b| {
                handler.pattern().literal_count() > b.pattern().literal_count()
            });
            if more_specific {
                best = Some(handler);
            }
        }

        best.cloned()
            .ok_or_else(|| RegistryError::NoHandler(path.to_string()))
    }

    /// Nearest path at or above `path` that some handler owns
    pub fn resolve_owner<'p>(&self, path: &'p str) -> Option<&'p str> {
        let mut current = Some(path);
        while let Some(candidate) = current {
            if self.get_handler(candidate).is_ok() {
                return Some(candidate);
            }
            current = parent(candidate);
        }
        None
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
