//! Typed payloads of the upstream order API
//!
//! Orders travel out of the API and back into the bulk-create call, so every
//! struct that is written back keeps the fields it does not model in a
//! flattened `extra` map. Nothing the API sent is lost on the round trip.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core_types::{OrderId, UserId, WarehouseId};

/// Item option naming the warehouse that supplies the item
pub const VENDOR_OPTION: &str = "vendor";

/// Status of orders eligible for splitting
pub const AWAITING_SHIPMENT: &str = "awaiting_shipment";

/// Webhook payload type this service handles
pub const ORDER_NOTIFY: &str = "ORDER_NOTIFY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_key: Option<String>,
    pub order_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order_status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "AdvancedOptions::is_empty")]
    pub advanced_options: AdvancedOptions,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_paid: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_amount: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub shipping_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// `customField1` tag string, empty when the API sent none
    pub fn tags(&self) -> &str {
        self.advanced_options.custom_field1.as_deref().unwrap_or("")
    }

    pub fn is_awaiting_shipment(&self) -> bool {
        self.order_status == AWAITING_SHIPMENT
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
    #[serde(
        default,
        rename = "customField1",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_field1: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdvancedOptions {
    pub fn is_empty(&self) -> bool {
        self.warehouse_id.is_none() && self.custom_field1.is_none() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ItemOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Warehouse named by the `vendor` option. Missing or empty values are `None`.
    pub fn vendor(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|opt| opt.name == VENDOR_OPTION)
            .and_then(|opt| opt.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Inbound webhook body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub resource_url: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Paged order listing (`GET <resource_url>`, `GET /orders?...`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
}

/// Response of `POST /orders/createorders`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrdersResponse {
    #[serde(default)]
    pub has_errors: bool,
    #[serde(default)]
    pub results: Vec<CreateOrderResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResult {
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub order_key: Option<String>,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Body of `POST /orders/assignuser`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignUserRequest {
    pub order_ids: Vec<OrderId>,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignUserResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
