// Copyright (c) 2025 - Cowboy AI, Inc.
//! BNG Configuration Daemon (demo)
//!
//! Bootstraps the configuration engine, restores history and startup
//! configuration from disk, then stages and commits one interface change.
//!
//! Run with: cargo run --bin bng-configd
//!
//! Environment:
//! - `BNG_CONFIG_VERSION_DIR` - directory for version files
//! - `BNG_CONFIG_STARTUP_PATH` - startup configuration file
//! - `BNG_CONFIG_PERSIST_VERSIONS` - `false` to keep history in memory only
//! - `BNG_CONFIG_FRR_PATH` - enables the FRR routing engine, writing here
//! - `BNG_DEMO_INTERFACE` - interface to configure (default `eth0`)

use anyhow::{Context, Result};
use bng_config::external::{CommandRoutingEngine, RoutingEngineConfig};
use bng_config::{
    ConfigManager, HandlerCatalog, HandlerDeps, HandlerRegistry, LoggingDataplane, ManagerConfig,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Settings for the demo daemon
#[derive(Debug, Clone)]
struct DaemonConfig {
    /// Engine storage settings
    manager: ManagerConfig,
    /// Routing engine settings, when enabled
    routing: Option<RoutingEngineConfig>,
    /// Interface the demo commit creates
    interface: String,
}

impl DaemonConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let manager = ManagerConfig::from_env().context("Invalid engine configuration")?;

        let routing = std::env::var("BNG_CONFIG_FRR_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map(|path| RoutingEngineConfig::default().with_config_path(path));

        let interface =
            std::env::var("BNG_DEMO_INTERFACE").unwrap_or_else(|_| "eth0".to_string());

        Ok(Self {
            manager,
            routing,
            interface,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting BNG configuration daemon");

    let config = DaemonConfig::from_env()?;
    info!("Configuration loaded:");
    info!("  - Version dir: {:?}", config.manager.version_dir);
    info!("  - Startup path: {:?}", config.manager.startup_path);
    info!("  - Persist versions: {}", config.manager.persist_versions);

    // Handlers
    let mut deps = HandlerDeps::new(Arc::new(LoggingDataplane::new()));
    let routing = config
        .routing
        .clone()
        .map(|routing| Arc::new(CommandRoutingEngine::new(routing)));
    if let Some(routing) = &routing {
        deps = deps.with_routing(routing.clone());
    }

    let mut registry = HandlerRegistry::new();
    let registered = registry.auto_register_all(&HandlerCatalog::builtin(), &deps);
    info!("Registered {} handlers", registered);

    let mut manager = ConfigManager::new(Arc::new(registry), config.manager.clone());
    match routing {
        Some(routing) => manager = manager.with_routing(routing),
        None => warn!("BNG_CONFIG_FRR_PATH not set, routing reloads are skipped"),
    }

    // Restore state
    let versions = manager
        .load_versions()
        .await
        .context("Failed to load version history")?;
    let restored = manager
        .load_startup()
        .await
        .context("Failed to load startup configuration")?;
    info!("Loaded {} versions, startup restored: {}", versions, restored);

    // Demo transaction
    let session = manager.create_candidate_session().await;
    let path = format!("interfaces.{}", config.interface);
    manager
        .set(
            &session,
            &path,
            json!({
                "name": config.interface,
                "description": "uplink",
                "mtu": 1500,
                "enabled": true,
                "ipv4": ["192.0.2.1/24"],
            }),
        )
        .await
        .with_context(|| format!("Failed to stage {}", path))?;

    for change in manager.dry_run(&session).await?.changes() {
        info!("  {}", change);
    }

    let version = manager
        .commit_with_message(&session, Some("demo interface".to_string()))
        .await
        .context("Commit failed")?;
    info!(
        "Committed version {} ({}) at {}",
        version.version, version.commit_id, version.timestamp
    );

    for entry in manager.list_versions().await {
        info!(
            "  v{} {} {}",
            entry.version,
            entry.timestamp.to_rfc3339(),
            entry.message.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
