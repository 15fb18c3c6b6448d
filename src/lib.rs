// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration transaction engine for a broadband network gateway
//!
//! Declarative configuration is staged in candidate sessions, applied to the
//! dataplane and routing engine through path-owning handlers in dependency
//! order, and recorded as numbered versions that can be rolled back to.
//!
//! # Module Organization
//!
//! - [`path`] - dotted paths, typed wildcards and segment encoding
//! - [`config`] - configuration model, path accessor, plugin namespaces
//! - [`handler`] - handler trait, context and registry
//! - [`handlers`] - built-in feature handlers
//! - [`session`] - candidate session state
//! - [`diff`] - added / modified / deleted summaries
//! - [`version`] - version history and durable storage
//! - [`manager`] - sessions, commit pipeline and rollback
//! - [`external`] - dataplane and routing-engine capabilities
//! - [`domain`] - validated network value objects
//! - [`errors`] - engine error taxonomy

pub mod config;
pub mod diff;
pub mod domain;
pub mod errors;
pub mod external;
pub mod handler;
pub mod handlers;
pub mod manager;
pub mod path;
pub mod session;
pub mod version;

// Re-export commonly used types
pub use config::{Config, ConfigAccessor, PluginRegistry};
pub use diff::{Change, ChangeKind, ConfigDiff};
pub use errors::{ConfigError, ConfigResult};
pub use external::{Dataplane, LoggingDataplane, RoutingEngine};
pub use handler::{
    Handler, HandlerCatalog, HandlerContext, HandlerDeps, HandlerError, HandlerRegistry,
    ValidationIssue,
};
pub use manager::{ConfigManager, ManagerConfig};
pub use path::PathPattern;
pub use session::SessionInfo;
pub use version::{ConfigStorage, ConfigVersion, FileStorage, MemoryStorage};
