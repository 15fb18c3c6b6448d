// Copyright (c) 2025 - Cowboy AI, Inc.
//! Interface Handler
//!
//! Owns `interfaces.*`. Programs the dataplane with the difference between
//! the old and new interface definitions; rollback programs the reverse
//! difference.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::InterfaceConfig;
use crate::domain::{IpPrefix, Mtu};
use crate::external::Dataplane;
use crate::handler::{Handler, HandlerContext, HandlerDeps, HandlerError};
use crate::path::{PathPattern, Segment, WildcardKind};

pub struct InterfaceHandler {
    pattern: PathPattern,
    dataplane: Arc<dyn Dataplane>,
}

impl InterfaceHandler {
    pub fn new(dataplane: Arc<dyn Dataplane>) -> Self {
        Self {
            pattern: PathPattern::from_segments(vec![
                Segment::literal("interfaces"),
                Segment::Wildcard(WildcardKind::Generic),
            ]),
            dataplane,
        }
    }

    pub fn factory(deps: &HandlerDeps) -> Arc<dyn Handler> {
        Arc::new(Self::new(Arc::clone(&deps.dataplane)))
    }

    fn interface_name(&self, ctx: &HandlerContext) -> Result<String, HandlerError> {
        self.pattern
            .extract(&ctx.path)?
            .pop()
            .ok_or_else(|| HandlerError::validation("missing interface name"))
    }

    async fn reconcile(
        &self,
        name: &str,
        from: Option<&InterfaceConfig>,
        to: Option<&InterfaceConfig>,
    ) -> Result<(), HandlerError> {
        match (from, to) {
            (None, None) => Ok(()),
            (Some(_), None) => {
                self.dataplane.delete_interface(name).await?;
                Ok(())
            }
            (None, Some(to)) => {
                self.dataplane.create_interface(name).await?;
                self.update(name, &InterfaceConfig::default(), to, true).await
            }
            (Some(from), Some(to)) => self.update(name, from, to, false).await,
        }
    }

    async fn update(
        &self,
        name: &str,
        from: &InterfaceConfig,
        to: &InterfaceConfig,
        created: bool,
    ) -> Result<(), HandlerError> {
        let dp = &self.dataplane;

        if from.description != to.description {
            dp.set_description(name, to.description.as_deref().unwrap_or(""))
                .await?;
        }
        if from.mtu != to.mtu {
            dp.set_mtu(name, to.mtu.unwrap_or(Mtu::DEFAULT)).await?;
        }

        for address in from.ipv4.iter().filter(|a| !to.ipv4.contains(a)) {
            dp.delete_ipv4_address(name, address).await?;
        }
        for address in to.ipv4.iter().filter(|a| !from.ipv4.contains(a)) {
            dp.add_ipv4_address(name, address).await?;
        }
        for address in from.ipv6.iter().filter(|a| !to.ipv6.contains(a)) {
            dp.delete_ipv6_address(name, address).await?;
        }
        for address in to.ipv6.iter().filter(|a| !from.ipv6.contains(a)) {
            dp.add_ipv6_address(name, address).await?;
        }

        if created || from.enabled != to.enabled {
            dp.set_enabled(name, to.enabled).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Handler for InterfaceHandler {
    fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    async fn validate(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let name = self.interface_name(ctx)?;
        if ctx.is_removal() {
            return Ok(());
        }

        let iface: InterfaceConfig = ctx.new_as()?;
        if !iface.name.is_empty() && iface.name != name {
            return Err(HandlerError::validation(format!(
                "interface name {:?} does not match path key {:?}",
                iface.name, name
            )));
        }
        if let Some(mtu) = iface.mtu {
            Mtu::new(mtu)?;
        }
        for address in &iface.ipv4 {
            IpPrefix::new_v4(address)?;
        }
        for address in &iface.ipv6 {
            IpPrefix::new_v6(address)?;
        }
        Ok(())
    }

    async fn apply(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let name = self.interface_name(ctx)?;
        let (old, new) = ctx.states::<InterfaceConfig>()?;
        tracing::debug!(interface = %name, "applying interface change");
        self.reconcile(&name, old.as_ref(), new.as_ref()).await
    }

    async fn rollback(&self, ctx: &HandlerContext) -> Result<(), HandlerError> {
        let name = self.interface_name(ctx)?;
        let (old, new) = ctx.states::<InterfaceConfig>()?;
        tracing::debug!(interface = %name, "reverting interface change");
        self.reconcile(&name, new.as_ref(), old.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{DataplaneOp, LoggingDataplane};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn handler() -> (InterfaceHandler, Arc<LoggingDataplane>) {
        let dataplane = Arc::new(LoggingDataplane::new());
        (InterfaceHandler::new(dataplane.clone()), dataplane)
    }

    fn ctx(old: Option<Value>, new: Value) -> HandlerContext {
        HandlerContext::new("session-1", "interfaces.eth0", old, new)
    }

    #[tokio::test]
    async fn test_create_programs_everything() {
        let (handler, dataplane) = handler();
        let change = ctx(
            None,
            json!({"name": "eth0", "mtu": 9000, "enabled": true, "ipv4": ["192.0.2.1/24"]}),
        );

        handler.apply(&change).await.unwrap();

        assert_eq!(
            dataplane.ops(),
            vec![
                DataplaneOp::CreateInterface { name: "eth0".into() },
                DataplaneOp::SetMtu { name: "eth0".into(), mtu: 9000 },
                DataplaneOp::AddIpv4 { name: "eth0".into(), address: "192.0.2.1/24".into() },
                DataplaneOp::SetEnabled { name: "eth0".into(), enabled: true },
            ]
        );
    }

    #[tokio::test]
    async fn test_modify_programs_only_differences() {
        let (handler, dataplane) = handler();
        let change = ctx(
            Some(json!({"name": "eth0", "enabled": true, "ipv4": ["192.0.2.1/24"]})),
            json!({"name": "eth0", "enabled": true, "ipv4": ["198.51.100.1/24"]}),
        );

        handler.apply(&change).await.unwrap();

        assert_eq!(
            dataplane.ops(),
            vec![
                DataplaneOp::DeleteIpv4 { name: "eth0".into(), address: "192.0.2.1/24".into() },
                DataplaneOp::AddIpv4 { name: "eth0".into(), address: "198.51.100.1/24".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_rollback_restores_default_mtu() {
        let (handler, dataplane) = handler();
        let change = ctx(
            Some(json!({"name": "eth0", "enabled": true})),
            json!({"name": "eth0", "enabled": true, "mtu": 9000}),
        );

        handler.apply(&change).await.unwrap();
        handler.rollback(&change).await.unwrap();

        assert_eq!(
            dataplane.ops(),
            vec![
                DataplaneOp::SetMtu { name: "eth0".into(), mtu: 9000 },
                DataplaneOp::SetMtu { name: "eth0".into(), mtu: Mtu::DEFAULT },
            ]
        );
    }

    #[tokio::test]
    async fn test_clearing_mtu_resets_to_default() {
        let (handler, dataplane) = handler();
        let change = ctx(
            Some(json!({"name": "eth0", "enabled": true, "mtu": 9000})),
            json!({"name": "eth0", "enabled": true}),
        );

        handler.apply(&change).await.unwrap();

        assert_eq!(
            dataplane.ops(),
            vec![DataplaneOp::SetMtu { name: "eth0".into(), mtu: 1500 }]
        );
    }

    #[tokio::test]
    async fn test_rollback_of_creation_deletes() {
        let (handler, dataplane) = handler();
        let change = ctx(None, json!({"name": "eth0", "enabled": true}));

        handler.rollback(&change).await.unwrap();

        assert_eq!(
            dataplane.ops(),
            vec![DataplaneOp::DeleteInterface { name: "eth0".into() }]
        );
    }

    #[tokio::test]
    async fn test_null_value_deletes_interface() {
        let (handler, dataplane) = handler();
        let change = ctx(Some(json!({"name": "eth0"})), Value::Null);

        handler.validate(&change).await.unwrap();
        handler.apply(&change).await.unwrap();

        assert_eq!(
            dataplane.ops(),
            vec![DataplaneOp::DeleteInterface { name: "eth0".into() }]
        );
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_values() {
        let (handler, _) = handler();

        for bad in [
            json!({"mtu": 20}),
            json!({"ipv4": ["2001:db8::1/64"]}),
            json!({"ipv6": ["192.0.2.1/24"]}),
            json!({"name": "eth1"}),
            json!({"enabled": "sometimes"}),
        ] {
            assert!(handler.validate(&ctx(None, bad.clone())).await.is_err(), "{}", bad);
        }
        handler
            .validate(&ctx(None, json!({"name": "eth0", "mtu": 1500})))
            .await
            .unwrap();
    }
}
