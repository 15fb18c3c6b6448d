// Copyright (c) 2025 - Cowboy AI, Inc.
//! Candidate Sessions
//!
//! A session owns a private copy of the configuration plus the ordered list
//! of changes accepted so far. The list keeps call order; dependency order is
//! only computed at commit time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::handler::HandlerContext;

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    config: Config,
    pending: Vec<HandlerContext>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Start a session from a copy of `base`
    pub fn new(id: impl Into<String>, base: &Config) -> Self {
        Self {
            id: id.into(),
            config: base.clone(),
            pending: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn pending(&self) -> &[HandlerContext] {
        &self.pending
    }

    pub fn push(&mut self, ctx: HandlerContext) {
        self.pending.push(ctx);
    }

    /// Replace the candidate with a copy of `base`, dropping pending changes
    pub fn reset_to(&mut self, base: &Config) {
        self.config = base.clone();
        self.pending.clear();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn into_parts(self) -> (Config, Vec<HandlerContext>) {
        (self.config, self.pending)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            created_at: self.created_at,
            pending_changes: self.pending.len(),
        }
    }
}

/// Listing entry for an open session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub pending_changes: usize,
}
