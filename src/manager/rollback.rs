// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rollback to a recorded version
//!
//! The target snapshot is compared against running configuration. Each
//! differing path is mapped to the nearest path a handler owns, and those
//! owners become the reconstructed session's pending changes. They are
//! verified, then applied directly through `apply` in diff order.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::ConfigManager;
use crate::config::Config;
use crate::diff::ConfigDiff;
use crate::errors::{ConfigError, ConfigResult};
use crate::handler::HandlerContext;
use crate::session::Session;
use crate::version::ConfigVersion;

impl ConfigManager {
    /// Restore running configuration to version `version`
    pub async fn rollback(&self, version: u64) -> ConfigResult<ConfigVersion> {
        let mut state = self.state.write().await;
        let target = state.versions.get(version)?.config.clone();

        let mut session = Session::new(format!("rollback-{}", version), &target);
        for ctx in self.rollback_changes(&state.running, &target, session.id())? {
            session.push(ctx);
        }

        let issues = self.collect_issues(session.pending()).await;
        if !issues.is_empty() {
            warn!(version, issues = issues.len(), "rollback target failed verification");
            return Err(ConfigError::VerificationFailed(issues));
        }

        let (config, mut pending) = session.into_parts();
        info!(version, changes = pending.len(), "rollback started");
        self.apply_changes(&mut pending, false).await?;

        let summary = ConfigDiff::from_pending(&pending).into_changes();
        let message = format!("rollback to version {}", version);
        self.finalize(&mut state, summary, Some(message), config).await
    }

    fn rollback_changes(
        &self,
        running: &Config,
        target: &Config,
        session_id: &str,
    ) -> ConfigResult<Vec<HandlerContext>> {
        let diff = ConfigDiff::between_configs(running, target)?;

        let mut owners: Vec<String> = Vec::new();
        for change in diff.changes() {
            let path = change.path.strip_prefix("plugins.").unwrap_or(&change.path);
            match self.registry.resolve_owner(path) {
                Some(owner) => {
                    if !owners.iter().any(|o| o == owner) {
                        owners.push(owner.to_string());
                    }
                }
                None => debug!(path, "no handler owns path, restored from snapshot only"),
            }
        }

        owners
            .into_iter()
            .map(|path| -> ConfigResult<HandlerContext> {
                let old_value = self.accessor.get(running, &path)?;
                let new_value = self.accessor.get(target, &path)?.unwrap_or(Value::Null);
                Ok(HandlerContext::new(session_id, path, old_value, new_value))
            })
            .collect()
    }
}
