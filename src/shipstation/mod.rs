//! ShipStation order splitting
//!
//! - [`client`]: HTTP client and the [`OrderApi`] seam
//! - [`reference`]: per-invocation warehouse/user lookups
//! - [`split`] / [`update`]: pure order transforms
//! - [`sync`]: webhook orchestration
//! - [`purge`]: cancelled-order cleanup

pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "mock-api")]
pub mod mock;
pub mod models;
pub mod purge;
pub mod reference;
pub mod retry;
pub mod split;
pub mod sync;
pub mod update;

pub use client::{OrderApi, ShipStationClient};
pub use config::ShipStationConfig;
pub use error::{ApiError, SyncError};
#[cfg(feature = "mock-api")]
pub use mock::MockOrderApi;
pub use models::{Order, WebhookPayload};
pub use purge::{CancelledOrderPurge, PurgeReport};
pub use reference::ReferenceData;
pub use retry::RetryPolicy;
pub use sync::{OrderSync, SyncOutcome, SyncReport};
