// Copyright (c) 2025 - Cowboy AI, Inc.
//! Routing Engine Capability
//!
//! The commit pipeline talks to the routing-protocol engine in three steps:
//!
//! ```text
//! generate(config) ──> rendered text ──> test(text) ──> reload(text)
//!   (pure)                               (offline)      (live engine)
//! ```
//!
//! [`render_frr_config`] produces FRR-style text from a [`Config`] snapshot.
//! [`CommandRoutingEngine`] writes that text to disk and drives the engine's
//! own check and reload commands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

use crate::config::Config;
use crate::path::{codec, WildcardKind};

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Failed to render routing configuration: {0}")]
    Render(String),

    #[error("Routing configuration test failed: {0}")]
    TestFailed(String),

    #[error("Routing engine reload failed: {0}")]
    ReloadFailed(String),

    #[error("Routing engine command is empty")]
    EmptyCommand,

    #[error("Routing engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::fmt::Error> for RoutingError {
    fn from(err: std::fmt::Error) -> Self {
        RoutingError::Render(err.to_string())
    }
}

/// External routing-protocol engine
#[async_trait]
pub trait RoutingEngine: Send + Sync {
    /// Render engine configuration from a config snapshot
    fn generate(&self, config: &Config) -> Result<String, RoutingError>;

    /// Offline validation of rendered configuration
    async fn test(&self, rendered: &str) -> Result<(), RoutingError>;

    /// Load rendered configuration into the live engine
    async fn reload(&self, rendered: &str) -> Result<(), RoutingError>;
}

/// Render FRR-style configuration text
pub fn render_frr_config(config: &Config) -> Result<String, RoutingError> {
    let mut out = String::new();
    writeln!(out, "frr defaults traditional")?;
    writeln!(out, "!")?;

    for (name, vrf) in &config.vrfs {
        writeln!(out, "vrf {}", name)?;
        if let Some(description) = &vrf.description {
            writeln!(out, " description {}", description)?;
        }
        writeln!(out, " table {}", vrf.table_id)?;
        writeln!(out, "exit-vrf")?;
        writeln!(out, "!")?;
    }

    for (name, iface) in &config.interfaces {
        match &iface.vrf {
            Some(vrf) => writeln!(out, "interface {} vrf {}", name, vrf)?,
            None => writeln!(out, "interface {}", name)?,
        }
        if let Some(description) = &iface.description {
            writeln!(out, " description {}", description)?;
        }
        for address in &iface.ipv4 {
            writeln!(out, " ip address {}", address)?;
        }
        for address in &iface.ipv6 {
            writeln!(out, " ipv6 address {}", address)?;
        }
        if !iface.enabled {
            writeln!(out, " shutdown")?;
        }
        writeln!(out, "exit")?;
        writeln!(out, "!")?;
    }

    if let Some(statics) = &config.protocols.static_routes {
        for route in &statics.routes {
            let mut line = format!("ip route {} {}", route.prefix, route.next_hop);
            if let Some(distance) = route.distance {
                write!(line, " {}", distance)?;
            }
            if let Some(vrf) = &route.vrf {
                write!(line, " vrf {}", vrf)?;
            }
            writeln!(out, "{}", line)?;
        }
        if !statics.routes.is_empty() {
            writeln!(out, "!")?;
        }
    }

    if let Some(bgp) = &config.protocols.bgp {
        writeln!(out, "router bgp {}", bgp.asn)?;
        if let Some(router_id) = &bgp.router_id {
            writeln!(out, " bgp router-id {}", router_id)?;
        }
        for (key, neighbor) in &bgp.neighbors {
            let peer = codec::decode(WildcardKind::Ip, key);
            writeln!(out, " neighbor {} remote-as {}", peer, neighbor.remote_as)?;
            if let Some(description) = &neighbor.description {
                writeln!(out, " neighbor {} description {}", peer, description)?;
            }
            if let Some(source) = &neighbor.update_source {
                writeln!(out, " neighbor {} update-source {}", peer, source)?;
            }
            if neighbor.shutdown {
                writeln!(out, " neighbor {} shutdown", peer)?;
            }
        }
        if !bgp.networks.is_empty() {
            writeln!(out, " !")?;
            writeln!(out, " address-family ipv4 unicast")?;
            for network in &bgp.networks {
                writeln!(out, "  network {}", network)?;
            }
            writeln!(out, " exit-address-family")?;
        }
        writeln!(out, "exit")?;
        writeln!(out, "!")?;
    }

    if let Some(ospf) = &config.protocols.ospf {
        writeln!(out, "router ospf")?;
        if let Some(router_id) = &ospf.router_id {
            writeln!(out, " ospf router-id {}", router_id)?;
        }
        for (area, settings) in &ospf.areas {
            for network in &settings.networks {
                writeln!(out, " network {} area {}", network, area)?;
            }
        }
        writeln!(out, "exit")?;
        writeln!(out, "!")?;
        for (area, settings) in &ospf.areas {
            for iface in &settings.interfaces {
                writeln!(out, "interface {}", iface)?;
                writeln!(out, " ip ospf area {}", area)?;
                writeln!(out, "exit")?;
            }
        }
    }

    writeln!(out, "end")?;
    Ok(out)
}

/// Placeholder replaced by the rendered file path in command argv
pub const CONFIG_PLACEHOLDER: &str = "{config}";

/// Where the rendered file goes and which commands check and load it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEngineConfig {
    pub config_path: PathBuf,
    pub test_command: Vec<String>,
    pub reload_command: Vec<String>,
}

impl Default for RoutingEngineConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("/etc/frr/frr.conf"),
            test_command: ["vtysh", "--dryrun", "-f", CONFIG_PLACEHOLDER]
                .map(String::from)
                .to_vec(),
            reload_command: ["/usr/lib/frr/frr-reload.py", "--reload", CONFIG_PLACEHOLDER]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl RoutingEngineConfig {
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_test_command<S: Into<String>>(mut self, argv: impl IntoIterator<Item = S>) -> Self {
        self.test_command = argv.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reload_command<S: Into<String>>(mut self, argv: impl IntoIterator<Item = S>) -> Self {
        self.reload_command = argv.into_iter().map(Into::into).collect();
        self
    }

    /// Scratch file used for offline tests, next to the live file
    pub fn candidate_path(&self) -> PathBuf {
        self.config_path.with_extension("candidate")
    }
}

/// Routing engine driven through external commands
#[derive(Debug, Clone, Default)]
pub struct CommandRoutingEngine {
    config: RoutingEngineConfig,
}

impl CommandRoutingEngine {
    pub fn new(config: RoutingEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingEngineConfig {
        &self.config
    }

    async fn run(&self, argv: &[String], file: &Path) -> Result<(), String> {
        let file = file.to_string_lossy();
        let mut args = argv.iter().map(|arg| arg.replace(CONFIG_PLACEHOLDER, &file));
        let program = args.next().ok_or_else(|| "empty command".to_string())?;

        tracing::debug!(%program, "running routing engine command");
        let output = Command::new(&program)
            .args(args)
            .output()
            .await
            .map_err(|e| format!("{}: {}", program, e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), std::io::Error> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}

#[async_trait]
impl RoutingEngine for CommandRoutingEngine {
    fn generate(&self, config: &Config) -> Result<String, RoutingError> {
        render_frr_config(config)
    }

    async fn test(&self, rendered: &str) -> Result<(), RoutingError> {
        if self.config.test_command.is_empty() {
            return Err(RoutingError::EmptyCommand);
        }
        let candidate = self.config.candidate_path();
        write_atomic(&candidate, rendered).await?;
        self.run(&self.config.test_command, &candidate)
            .await
            .map_err(RoutingError::TestFailed)
    }

    async fn reload(&self, rendered: &str) -> Result<(), RoutingError> {
        if self.config.reload_command.is_empty() {
            return Err(RoutingError::EmptyCommand);
        }
        write_atomic(&self.config.config_path, rendered).await?;
        self.run(&self.config.reload_command, &self.config.config_path)
            .await
            .map_err(RoutingError::ReloadFailed)?;
        tracing::info!(path = %self.config.config_path.display(), "routing engine reloaded");
        Ok(())
    }
}
