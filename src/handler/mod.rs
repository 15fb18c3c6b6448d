// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Handlers
//!
//! A handler owns exactly one [`PathPattern`] and turns a change under that
//! pattern into side effects on an external system. It is a stateless
//! strategy object: everything a call needs travels in the
//! [`HandlerContext`].
//!
//! # Lifecycle of one change
//!
//! ```text
//! set()                 commit()
//! ─────                 ────────────────────────────────────────────
//! validate(ctx)   ──>   pre_apply(ctx) ─> apply(ctx) ─> post_apply(ctx)
//!                                  │ failure later in the commit
//!                                  ▼
//!                              rollback(ctx)   (compensation, best-effort)
//! ```
//!
//! Dependencies are declared as patterns: a change owned by this handler is
//! applied after every pending change whose handler pattern equals one of
//! [`Handler::dependencies`].

pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::NetworkError;
use crate::external::{Dataplane, DataplaneError, RoutingEngine, RoutingError};
use crate::path::{PathError, PathPattern};

pub use registry::{HandlerRegistry, RegistryError};

/// One intended mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerContext {
    pub session_id: String,
    /// Concrete dotted path (never a pattern)
    pub path: String,
    /// Value before the change; captured once at `set` time
    pub old_value: Option<Value>,
    /// Value after the change; `null` removes the resource
    pub new_value: Value,
    /// Set by a post-apply callback when the routing engine must reload
    #[serde(default)]
    pub reload_needed: bool,
}

impl HandlerContext {
    pub fn new(
        session_id: impl Into<String>,
        path: impl Into<String>,
        old_value: Option<Value>,
        new_value: Value,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            path: path.into(),
            old_value,
            new_value,
            reload_needed: false,
        }
    }

    /// The change removes the resource
    pub fn is_removal(&self) -> bool {
        self.new_value.is_null()
    }

    /// The resource did not exist before the change
    pub fn is_creation(&self) -> bool {
        self.old_value.as_ref().map_or(true, Value::is_null) && !self.new_value.is_null()
    }

    /// Decode the new value into a typed configuration node
    pub fn new_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.new_value.clone()).map_err(|e| HandlerError::InvalidValue {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Decode both sides of the change; `None` marks an absent resource
    pub fn states<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<(Option<T>, Option<T>), HandlerError> {
        let new = if self.is_removal() {
            None
        } else {
            Some(self.new_as()?)
        };
        Ok((self.old_as()?, new))
    }

    /// Decode the old value, `None` when the resource was absent
    pub fn old_as<T: serde::de::DeserializeOwned>(&self) -> Result<Option<T>, HandlerError> {
        match &self.old_value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| HandlerError::InvalidValue {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

/// A validation rejection tied to the path it concerns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors raised by handler callbacks
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid value at {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Dataplane(#[from] DataplaneError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        HandlerError::Validation(message.into())
    }
}

impl From<NetworkError> for HandlerError {
    fn from(err: NetworkError) -> Self {
        HandlerError::Validation(err.to_string())
    }
}

/// Owner of one configuration path pattern
#[async_trait]
pub trait Handler: Send + Sync {
    fn pattern(&self) -> &PathPattern;

    /// Patterns whose pending changes must be applied first
    fn dependencies(&self) -> &[PathPattern] {
        &[]
    }

    async fn validate(&self, ctx: &HandlerContext) -> Result<(), HandlerError>;

    async fn apply(&self, ctx: &HandlerContext) -> Result<(), HandlerError>;

    /// Compensating action for a previously applied change
    async fn rollback(&self, ctx: &HandlerContext) -> Result<(), HandlerError>;

    async fn pre_apply(&self, _ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        Ok(())
    }

    /// May flag `ctx.reload_needed`
    async fn post_apply(&self, _ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Step of [`apply_with_callbacks`] that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStage {
    PreApply,
    Apply,
    PostApply,
}

impl ApplyStage {
    /// Whether `apply` already produced side effects for this change
    pub fn applied(&self) -> bool {
        matches!(self, ApplyStage::PostApply)
    }
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApplyStage::PreApply => "pre-apply",
            ApplyStage::Apply => "apply",
            ApplyStage::PostApply => "post-apply",
        })
    }
}

#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: ApplyStage,
    #[source]
    pub source: HandlerError,
}

impl StageError {
    pub fn new(stage: ApplyStage, source: HandlerError) -> Self {
        Self { stage, source }
    }
}

/// pre-apply → apply → post-apply
pub async fn apply_with_callbacks(
    handler: &dyn Handler,
    ctx: &mut HandlerContext,
) -> Result<(), StageError> {
    handler
        .pre_apply(ctx)
        .await
        .map_err(|source| StageError::new(ApplyStage::PreApply, source))?;
    handler
        .apply(ctx)
        .await
        .map_err(|source| StageError::new(ApplyStage::Apply, source))?;
    handler
        .post_apply(ctx)
        .await
        .map_err(|source| StageError::new(ApplyStage::PostApply, source))
}

/// Collaborators handed to handler factories
#[derive(Clone)]
pub struct HandlerDeps {
    pub dataplane: Arc<dyn Dataplane>,
    pub routing: Option<Arc<dyn RoutingEngine>>,
}

impl HandlerDeps {
    pub fn new(dataplane: Arc<dyn Dataplane>) -> Self {
        Self {
            dataplane,
            routing: None,
        }
    }

    pub fn with_routing(mut self, routing: Arc<dyn RoutingEngine>) -> Self {
        self.routing = Some(routing);
        self
    }
}

pub type HandlerFactory = fn(&HandlerDeps) -> Arc<dyn Handler>;

/// Factories assembled at bootstrap and fed to
/// [`HandlerRegistry::auto_register_all`]
#[derive(Clone, Default)]
pub struct HandlerCatalog {
    factories: Vec<HandlerFactory>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factory: HandlerFactory) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn push(&mut self, factory: HandlerFactory) {
        self.factories.push(factory);
    }

    pub fn factories(&self) -> &[HandlerFactory] {
        &self.factories
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
