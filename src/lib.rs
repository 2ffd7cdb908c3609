//! shipsplit - ShipStation multi-warehouse order splitter
//!
//! Receives the "new orders" webhook, splits every order whose items ship
//! from more than one warehouse into one order per warehouse, and assigns
//! each split to the warehouse's user.
//!
//! # Modules
//!
//! - [`core_types`] - Id aliases (OrderId, WarehouseId, UserId)
//! - [`config`] - YAML config with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`shipstation`] - API client, split/update transforms, orchestration
//! - [`gateway`] - axum HTTP layer

pub mod core_types;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod shipstation;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use core_types::{OrderId, UserId, WarehouseId};
pub use shipstation::{
    ApiError, CancelledOrderPurge, OrderApi, OrderSync, PurgeReport, ShipStationClient,
    ShipStationConfig, SyncError, SyncOutcome,
};
