//! Core types used throughout the system
//!
//! Identifier aliases for the entities the upstream order API hands out.
//! They give call sites semantic meaning without a newtype wrapper.

/// Order ID - assigned by the upstream API once an order is persisted.
///
/// # Constraints:
/// - Absent on drafts that must be created as new orders
/// - Never invented locally; only copied from API responses
pub type OrderId = i64;

/// Warehouse ID - numeric ship-from location id.
pub type WarehouseId = i64;

/// User ID - upstream account GUID, e.g. `"123e4567-e89b-12d3-a456-426614174000"`.
pub type UserId = String;
