// Copyright (c) 2025 - Cowboy AI, Inc.
//! Built-in Feature Handlers
//!
//! | Pattern                          | Handler                | Depends on       |
//! |----------------------------------|------------------------|------------------|
//! | `interfaces.*`                   | [`InterfaceHandler`]   |                  |
//! | `vrfs.*`                         | [`VrfHandler`]         |                  |
//! | `protocols.bgp`                  | [`BgpHandler`]         | `interfaces.*`   |
//! | `protocols.bgp.neighbors.<*:ip>` | [`BgpNeighborHandler`] | `protocols.bgp`  |
//! | `protocols.static`               | [`StaticRouteHandler`] |                  |

pub mod bgp;
pub mod interface;
pub mod static_route;
pub mod vrf;

pub use bgp::{BgpHandler, BgpNeighborHandler};
pub use interface::InterfaceHandler;
pub use static_route::StaticRouteHandler;
pub use vrf::VrfHandler;

use crate::handler::HandlerCatalog;

impl HandlerCatalog {
    /// Every handler shipped with the crate
    pub fn builtin() -> Self {
        HandlerCatalog::new()
            .with(InterfaceHandler::factory)
            .with(VrfHandler::factory)
            .with(BgpHandler::factory)
            .with(BgpNeighborHandler::factory)
            .with(StaticRouteHandler::factory)
    }
}
