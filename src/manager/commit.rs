// Copyright (c) 2025 - Cowboy AI, Inc.
//! Commit pipeline: sort → guard → apply → reload → finalize

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::sort::dependency_order;
use super::{ConfigManager, EngineState};
use crate::config::Config;
use crate::diff::{Change, ConfigDiff};
use crate::errors::{ConfigError, ConfigResult};
use crate::external::{RoutingEngine, RoutingError};
use crate::handler::{
    apply_with_callbacks, ApplyStage, HandlerContext, HandlerRegistry, StageError,
};
use crate::version::ConfigVersion;

impl ConfigManager {
    /// Commit a candidate session without a message
    pub async fn commit(&self, id: &str) -> ConfigResult<ConfigVersion> {
        self.commit_with_message(id, None).await
    }

    /// Apply a session's pending changes and record a new version
    ///
    /// On any apply or reload failure every change applied so far is
    /// compensated in reverse order, running configuration is untouched and
    /// the session stays open. A persistence failure is reported after the
    /// new configuration is already live.
    pub async fn commit_with_message(
        &self,
        id: &str,
        message: Option<String>,
    ) -> ConfigResult<ConfigVersion> {
        let mut state = self.state.write().await;
        let session = state.session(id)?;

        let order = dependency_order(&self.registry, session.pending())?;
        if order.is_empty() {
            return Err(ConfigError::NoChanges);
        }

        let mut changes: Vec<HandlerContext> = order
            .iter()
            .map(|&i| session.pending()[i].clone())
            .collect();
        let candidate = session.config().clone();
        let summary = ConfigDiff::from_pending(session.pending()).into_changes();

        info!(
            session = %id,
            changes = changes.len(),
            order = ?changes.iter().map(|c| c.path.as_str()).collect::<Vec<_>>(),
            "commit started"
        );

        self.apply_changes(&mut changes, true).await?;

        if changes.iter().any(|c| c.reload_needed) {
            if let Err(err) = run_reload(self.routing.as_ref(), &candidate).await {
                error!(session = %id, error = %err, "routing engine reload failed");
                unwind(&self.registry, &changes).await;
                return Err(ConfigError::Reload(err));
            }
        }

        state.sessions.remove(id);
        self.finalize(&mut state, summary, message, candidate).await
    }

    /// Apply changes in order, compensating applied ones on the first failure
    ///
    /// `callbacks` selects the full pre/post-apply sequence; without it only
    /// `apply` runs.
    pub(super) async fn apply_changes(
        &self,
        changes: &mut [HandlerContext],
        callbacks: bool,
    ) -> ConfigResult<()> {
        for i in 0..changes.len() {
            let handler = match self.registry.get_handler(&changes[i].path) {
                Ok(handler) => handler,
                Err(err) => {
                    unwind(&self.registry, &changes[..i]).await;
                    return Err(err.into());
                }
            };

            let ctx = &mut changes[i];
            debug!(path = %ctx.path, "applying change");
            let result = if callbacks {
                apply_with_callbacks(handler.as_ref(), ctx).await
            } else {
                handler
                    .apply(ctx)
                    .await
                    .map_err(|source| StageError::new(ApplyStage::Apply, source))
            };

            if let Err(err) = result {
                let path = changes[i].path.clone();
                error!(path = %path, error = %err, "apply failed, compensating");
                let applied = if err.stage.applied() { i + 1 } else { i };
                unwind(&self.registry, &changes[..applied]).await;
                return Err(ConfigError::ApplyFailed { path, source: err });
            }
        }
        Ok(())
    }

    /// Record the version, swap running and startup, then persist both
    pub(super) async fn finalize(
        &self,
        state: &mut EngineState,
        changes: Vec<Change>,
        message: Option<String>,
        config: Config,
    ) -> ConfigResult<ConfigVersion> {
        let version = state.versions.append(changes, message, config.clone());
        state.running = config;
        state.startup = state.running.clone();
        info!(
            version = version.version,
            commit_id = %version.commit_id,
            changes = version.changes.len(),
            "version committed"
        );

        let mut failure = None;
        if self.config.persist_versions {
            if let Err(err) = self.storage.write_version(&version).await {
                error!(version = version.version, error = %err, "failed to persist version");
                failure.get_or_insert(err);
            }
        }
        if let Err(err) = self.storage.write_startup(&state.startup).await {
            error!(version = version.version, error = %err, "failed to persist startup configuration");
            failure.get_or_insert(err);
        }

        match failure {
            Some(source) => Err(ConfigError::Persistence {
                version: version.version,
                source,
            }),
            None => Ok(version),
        }
    }
}

/// Best-effort compensation of `applied`, newest first
pub(super) async fn unwind(registry: &HandlerRegistry, applied: &[HandlerContext]) {
    for ctx in applied.iter().rev() {
        let result = match registry.get_handler(&ctx.path) {
            Ok(handler) => handler.rollback(ctx).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => debug!(path = %ctx.path, "change compensated"),
            Err(error) => warn!(path = %ctx.path, %error, "compensation failed"),
        }
    }
}

/// generate → test → reload
async fn run_reload(
    routing: Option<&Arc<dyn RoutingEngine>>,
    config: &Config,
) -> Result<(), RoutingError> {
    let Some(routing) = routing else {
        warn!("reload requested but no routing engine is configured");
        return Ok(());
    };

    let rendered = routing.generate(config)?;
    routing.test(&rendered).await?;
    routing.reload(&rendered).await?;
    info!(bytes = rendered.len(), "routing engine reloaded");
    Ok(())
}
