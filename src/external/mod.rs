// Copyright (c) 2025 - Cowboy AI, Inc.
//! External Collaborators
//!
//! Capability traits for the systems the engine changes but does not own:
//!
//! - [`dataplane`] - interface and address programming, used by handlers
//! - [`routing`] - routing-protocol engine generate / test / reload, used by
//!   the commit pipeline when a change flags a reload

pub mod dataplane;
pub mod routing;

pub use dataplane::{Dataplane, DataplaneError, DataplaneOp, LoggingDataplane};
pub use routing::{
    render_frr_config, CommandRoutingEngine, RoutingEngine, RoutingEngineConfig, RoutingError,
};
