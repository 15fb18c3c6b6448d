// Copyright (c) 2025 - Cowboy AI, Inc.
//! Static Route Handler
//!
//! Owns `protocols.static`, the whole static route table. Routes are
//! installed by the routing engine, so an applied change flags a reload.

use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;

use crate::config::{StaticConfig, StaticRoute};
use crate::domain::{IpPrefix, NetworkError};
use crate::handler::{Handler, HandlerContext, HandlerDeps, HandlerError};
use crate::path::{PathPattern, Segment};

pub struct StaticRouteHandler {
    pattern: PathPattern,
}

impl Default for StaticRouteHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticRouteHandler {
    pub fn new() -> Self {
        Self {
            pattern: PathPattern::from_segments(vec![
                Segment::literal("protocols"),
                Segment::literal("static"),
            ]),
        }
    }

    pub fn factory(_deps: &HandlerDeps) -> Arc<dyn Handler> {
        Arc::new(Self::new())
    }
}

fn validate_route(route: &StaticRoute) -> Result<(), HandlerError> {
    let prefix = IpPrefix::new(&route.prefix)?;
    let next_hop: IpAddr = route
        .next_hop
        .parse()
        .map_err(|_| NetworkError::InvalidIpAddress(route.next_hop.clone()))?;
    if prefix.is_ipv4() != next_hop.is_ipv4() {
        return Err(NetworkError::FamilyMismatch(format!(
            "{} via {}",
            route.prefix, route.next_hop
        ))
        .into());
    }
    if route.distance == Some(0) {
        return Err(HandlerError::validation(format!(
            "route {}: administrative distance must be 1-255",
            route.prefix
        )));
    }
    Ok(())
}

#[async_trait]
impl Handler for StaticRouteHandler {
    fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    async fn validate(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        if ctx.is_removal() {
            return Ok(());
        }
        let table: StaticConfig = ctx.new_as()?;
        for route in &table.routes {
            validate_route(route)?;
        }
        Ok(())
    }

    async fn apply(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let (_, new) = ctx.states::<StaticConfig>()?;
        let routes = new.map_or(0, |table| table.routes.len());
        tracing::info!(routes, "static route table staged");
        Ok(())
    }

    async fn rollback(&self, _ctx: &HandlerContext) -> Result<(), HandlerError> {
        tracing::info!("static route table change withdrawn");
        Ok(())
    }

    async fn post_apply(&self, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        ctx.reload_needed = true;
        Ok(())
    }
}
