// Copyright (c) 2025 - Cowboy AI, Inc.
//! VRF Handler
//!
//! Owns `vrfs.*`. VRF definitions only feed the rendered routing
//! configuration, so this handler validates and logs.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::VrfConfig;
use crate::handler::{Handler, HandlerContext, HandlerDeps, HandlerError};
use crate::path::{PathPattern, Segment, WildcardKind};

/// Kernel table ids reserved for the default, main and local tables
const RESERVED_TABLES: std::ops::RangeInclusive<u32> = 253..=255;

pub struct VrfHandler {
    pattern: PathPattern,
}

impl Default for VrfHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl VrfHandler {
    pub fn new() -> Self {
        Self {
            pattern: PathPattern::from_segments(vec![
                Segment::literal("vrfs"),
                Segment::Wildcard(WildcardKind::Generic),
            ]),
        }
    }

    pub fn factory(_deps: &HandlerDeps) -> Arc<dyn Handler> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl Handler for VrfHandler {
    fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    async fn validate(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        if ctx.is_removal() {
            return Ok(());
        }
        let vrf: VrfConfig = ctx.new_as()?;
        if vrf.table_id == 0 || RESERVED_TABLES.contains(&vrf.table_id) {
            return Err(HandlerError::validation(format!(
                "table id {} is reserved",
                vrf.table_id
            )));
        }
        Ok(())
    }

    async fn apply(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        tracing::info!(path = %ctx.path, removal = ctx.is_removal(), "vrf change applied");
        Ok(())
    }

    async fn rollback(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        tracing::info!(path = %ctx.path, "vrf change reverted");
        Ok(())
    }
}
