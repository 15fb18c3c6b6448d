// Copyright (c) 2025 - Cowboy AI, Inc.
//! BGP Handlers
//!
//! - `protocols.bgp` → [`BgpHandler`], the BGP instance; applied after
//!   interface changes in the same commit
//! - `protocols.bgp.neighbors.<*:ip>` → [`BgpNeighborHandler`], one peer,
//!   keyed by its hex-encoded address; applied after the instance
//!
//! Both take effect through the routing engine, so each applied change
//! flags a reload.

use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;

use crate::config::{BgpConfig, BgpNeighborConfig};
use crate::domain::{parse_router_id, validate_asn, IpPrefix};
use crate::handler::{Handler, HandlerContext, HandlerDeps, HandlerError};
use crate::path::{codec, PathPattern, Segment, WildcardKind};

fn bgp_pattern() -> PathPattern {
    PathPattern::from_segments(vec![Segment::literal("protocols"), Segment::literal("bgp")])
}

fn interfaces_pattern() -> PathPattern {
    PathPattern::from_segments(vec![
        Segment::literal("interfaces"),
        Segment::Wildcard(WildcardKind::Generic),
    ])
}

/// Decode a neighbor map key into its address
///
/// Keys must be in encoded segment form; a dotted literal could never be
/// addressed as a path.
pub fn neighbor_address(key: &str) -> Result<IpAddr, HandlerError> {
    if !codec::segment_matches(WildcardKind::Ip, key) {
        return Err(HandlerError::validation(format!(
            "neighbor key {:?} is not an encoded address segment",
            key
        )));
    }
    parse_peer(&codec::decode(WildcardKind::Ip, key))
}

fn parse_peer(address: &str) -> Result<IpAddr, HandlerError> {
    address
        .parse()
        .map_err(|_| HandlerError::validation(format!("neighbor {:?} is not an IP address", address)))
}

fn validate_neighbor(neighbor: &BgpNeighborConfig) -> Result<(), HandlerError> {
    validate_asn(neighbor.remote_as)?;
    if let Some(source) = &neighbor.update_source {
        if source.is_empty() {
            return Err(HandlerError::validation("update-source must not be empty"));
        }
    }
    Ok(())
}

pub struct BgpHandler {
    pattern: PathPattern,
    dependencies: Vec<PathPattern>,
}

impl Default for BgpHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl BgpHandler {
    pub fn new() -> Self {
        Self {
            pattern: bgp_pattern(),
            dependencies: vec![interfaces_pattern()],
        }
    }

    pub fn factory(_deps: &HandlerDeps) -> Arc<dyn Handler> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl Handler for BgpHandler {
    fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    fn dependencies(&self) -> &[PathPattern] {
        &self.dependencies
    }

    async fn validate(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        if ctx.is_removal() {
            return Ok(());
        }
        let bgp: BgpConfig = ctx.new_as()?;
        validate_asn(bgp.asn)?;
        if let Some(router_id) = &bgp.router_id {
            parse_router_id(router_id)?;
        }
        for network in &bgp.networks {
            IpPrefix::new(network)?;
        }
        for (key, neighbor) in &bgp.neighbors {
            neighbor_address(key)?;
            validate_neighbor(neighbor)?;
        }
        Ok(())
    }

    async fn apply(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let (_, new) = ctx.states::<BgpConfig>()?;
        match new {
            Some(bgp) => tracing::info!(asn = bgp.asn, neighbors = bgp.neighbors.len(), "bgp instance staged"),
            None => tracing::info!("bgp instance removal staged"),
        }
        Ok(())
    }

    async fn rollback(&self, _ctx: &HandlerContext) -> Result<(), HandlerError> {
        tracing::info!("bgp instance change withdrawn");
        Ok(())
    }

    async fn post_apply(&self, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        ctx.reload_needed = true;
        Ok(())
    }
}

pub struct BgpNeighborHandler {
    pattern: PathPattern,
    dependencies: Vec<PathPattern>,
}

impl Default for BgpNeighborHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl BgpNeighborHandler {
    pub fn new() -> Self {
        Self {
            pattern: PathPattern::from_segments(vec![
                Segment::literal("protocols"),
                Segment::literal("bgp"),
                Segment::literal("neighbors"),
                Segment::Wildcard(WildcardKind::Ip),
            ]),
            dependencies: vec![bgp_pattern()],
        }
    }

    pub fn factory(_deps: &HandlerDeps) -> Arc<dyn Handler> {
        Arc::new(Self::new())
    }

    /// Peer address carried in the change's path
    pub fn peer(&self, ctx: &HandlerContext) -> Result<IpAddr, HandlerError> {
        let address = self
            .pattern
            .extract(&ctx.path)?
            .pop()
            .ok_or_else(|| HandlerError::validation("missing neighbor address"))?;
        parse_peer(&address)
    }
}

#[async_trait]
impl Handler for BgpNeighborHandler {
    fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    fn dependencies(&self) -> &[PathPattern] {
        &self.dependencies
    }

    async fn validate(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        self.peer(ctx)?;
        if ctx.is_removal() {
            return Ok(());
        }
        validate_neighbor(&ctx.new_as::<BgpNeighborConfig>()?)
    }

    async fn apply(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let peer = self.peer(ctx)?;
        tracing::info!(%peer, removal = ctx.is_removal(), "bgp neighbor staged");
        Ok(())
    }

    async fn rollback(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let peer = self.peer(ctx)?;
        tracing::info!(%peer, "bgp neighbor change withdrawn");
        Ok(())
    }

    async fn post_apply(&self, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        ctx.reload_needed = true;
        Ok(())
    }
}
