// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dataplane Driver Capability
//!
//! The engine never drives the packet path itself. Handlers hold an
//! `Arc<dyn Dataplane>` and issue one simple call per low-level operation.
//!
//! [`LoggingDataplane`] records every operation instead of performing it and
//! can be told to fail selected operations, which is how commit unwinding is
//! exercised without a real driver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Errors reported by a dataplane driver
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataplaneError {
    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Dataplane rejected {op}: {reason}")]
    Rejected { op: String, reason: String },

    #[error("Dataplane unavailable: {0}")]
    Unavailable(String),
}

/// Interface-level operations a handler may request
#[async_trait]
pub trait Dataplane: Send + Sync {
    async fn create_interface(&self, name: &str) -> Result<(), DataplaneError>;

    async fn delete_interface(&self, name: &str) -> Result<(), DataplaneError>;

    async fn set_description(&self, name: &str, description: &str) -> Result<(), DataplaneError>;

    async fn set_mtu(&self, name: &str, mtu: u32) -> Result<(), DataplaneError>;

    async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), DataplaneError>;

    async fn add_ipv4_address(&self, name: &str, address: &str) -> Result<(), DataplaneError>;

    async fn delete_ipv4_address(&self, name: &str, address: &str) -> Result<(), DataplaneError>;

    async fn add_ipv6_address(&self, name: &str, address: &str) -> Result<(), DataplaneError>;

    async fn delete_ipv6_address(&self, name: &str, address: &str) -> Result<(), DataplaneError>;
}

/// A recorded dataplane call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DataplaneOp {
    CreateInterface { name: String },
    DeleteInterface { name: String },
    SetDescription { name: String, description: String },
    SetMtu { name: String, mtu: u32 },
    SetEnabled { name: String, enabled: bool },
    AddIpv4 { name: String, address: String },
    DeleteIpv4 { name: String, address: String },
    AddIpv6 { name: String, address: String },
    DeleteIpv6 { name: String, address: String },
}

impl DataplaneOp {
    pub fn interface(&self) -> &str {
        match self {
            DataplaneOp::CreateInterface { name }
            | DataplaneOp::DeleteInterface { name }
            | DataplaneOp::SetDescription { name, .. }
            | DataplaneOp::SetMtu { name, .. }
            | DataplaneOp::SetEnabled { name, .. }
            | DataplaneOp::AddIpv4 { name, .. }
            | DataplaneOp::DeleteIpv4 { name, .. }
            | DataplaneOp::AddIpv6 { name, .. }
            | DataplaneOp::DeleteIpv6 { name, .. } => name,
        }
    }
}

impl fmt::Display for DataplaneOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataplaneOp::CreateInterface { name } => write!(f, "create-interface {}", name),
            DataplaneOp::DeleteInterface { name } => write!(f, "delete-interface {}", name),
            DataplaneOp::SetDescription { name, description } => {
                write!(f, "set-description {} {:?}", name, description)
            }
            DataplaneOp::SetMtu { name, mtu } => write!(f, "set-mtu {} {}", name, mtu),
            DataplaneOp::SetEnabled { name, enabled } => {
                write!(f, "set-enabled {} {}", name, enabled)
            }
            DataplaneOp::AddIpv4 { name, address } => write!(f, "add-ipv4 {} {}", name, address),
            DataplaneOp::DeleteIpv4 { name, address } => {
                write!(f, "delete-ipv4 {} {}", name, address)
            }
            DataplaneOp::AddIpv6 { name, address } => write!(f, "add-ipv6 {} {}", name, address),
            DataplaneOp::DeleteIpv6 { name, address } => {
                write!(f, "delete-ipv6 {} {}", name, address)
            }
        }
    }
}

type FailurePredicate = Box<dyn Fn(&DataplaneOp) -> bool + Send + Sync>;

/// Dataplane that logs and records operations instead of performing them
#[derive(Default)]
pub struct LoggingDataplane {
    ops: Mutex<Vec<DataplaneOp>>,
    fail_when: Option<FailurePredicate>,
}

impl fmt::Debug for LoggingDataplane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingDataplane")
            .field("ops", &self.ops())
            .field("fails", &self.fail_when.is_some())
            .finish()
    }
}

impl LoggingDataplane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every operation matching `predicate`
    pub fn fail_when(mut self, predicate: impl Fn(&DataplaneOp) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Operations accepted so far, in call order
    pub fn ops(&self) -> Vec<DataplaneOp> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn record(&self, op: DataplaneOp) -> Result<(), DataplaneError> {
        if self.fail_when.as_ref().is_some_and(|fail| fail(&op)) {
            tracing::warn!(%op, "dataplane operation rejected");
            return Err(DataplaneError::Rejected {
                op: op.to_string(),
                reason: "injected failure".into(),
            });
        }
        tracing::info!(%op, "dataplane operation");
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).push(op);
        Ok(())
    }
}

#[async_trait]
impl Dataplane for LoggingDataplane {
    async fn create_interface(&self, name: &str) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::CreateInterface { name: name.into() })
    }

    async fn delete_interface(&self, name: &str) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::DeleteInterface { name: name.into() })
    }

    async fn set_description(&self, name: &str, description: &str) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::SetDescription {
            name: name.into(),
            description: description.into(),
        })
    }

    async fn set_mtu(&self, name: &str, mtu: u32) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::SetMtu { name: name.into(), mtu })
    }

    async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::SetEnabled {
            name: name.into(),
            enabled,
        })
    }

    async fn add_ipv4_address(&self, name: &str, address: &str) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::AddIpv4 {
            name: name.into(),
            address: address.into(),
        })
    }

    async fn delete_ipv4_address(&self, name: &str, address: &str) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::DeleteIpv4 {
            name: name.into(),
            address: address.into(),
        })
    }

    async fn add_ipv6_address(&self, name: &str, address: &str) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::AddIpv6 {
            name: name.into(),
            address: address.into(),
        })
    }

    async fn delete_ipv6_address(&self, name: &str, address: &str) -> Result<(), DataplaneError> {
        self.record(DataplaneOp::DeleteIpv6 {
            name: name.into(),
            address: address.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_operations_in_order() {
        let dataplane = LoggingDataplane::new();

        dataplane.create_interface("eth0").await.unwrap();
        dataplane.set_mtu("eth0", 9000).await.unwrap();

        assert_eq!(
            dataplane.ops(),
            vec![
                DataplaneOp::CreateInterface { name: "eth0".into() },
                DataplaneOp::SetMtu { name: "eth0".into(), mtu: 9000 },
            ]
        );
    }

    #[tokio::test]
    async fn test_injected_failure_is_not_recorded() {
        let dataplane = LoggingDataplane::new()
            .fail_when(|op| matches!(op, DataplaneOp::SetMtu { .. }));

        dataplane.create_interface("eth0").await.unwrap();
        let err = dataplane.set_mtu("eth0", 9000).await.unwrap_err();

        assert!(matches!(err, DataplaneError::Rejected { .. }));
        assert_eq!(dataplane.ops().len(), 1);
    }

    #[test]
    fn test_op_display() {
        let op = DataplaneOp::AddIpv4 {
            name: "eth0".into(),
            address: "192.0.2.1/24".into(),
        };
        assert_eq!(op.to_string(), "add-ipv4 eth0 192.0.2.1/24");
        assert_eq!(op.interface(), "eth0");
    }
}
