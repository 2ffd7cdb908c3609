//! Warehouse resolution and order splitting
//!
//! The upstream API only lets a ship-from warehouse be chosen when an order
//! is created. The first partition therefore reuses the original order
//! (and should be the default warehouse, which new orders get anyway);
//! every other partition is submitted as a brand-new order.

use rust_decimal::Decimal;

use super::error::SyncError;
use super::models::Order;
use super::reference::ReferenceData;

/// Distinct `vendor` values across the order's items, in first-seen order.
///
/// An item without a vendor contributes a `None` entry; it is kept so the
/// split reports the order instead of silently dropping those items.
pub fn resolve_warehouses(order: &Order) -> Vec<Option<String>> {
    let mut seen: Vec<Option<String>> = Vec::new();
    for item in &order.items {
        let vendor = item.vendor().map(str::to_string);
        if !seen.contains(&vendor) {
            seen.push(vendor);
        }
    }
    seen
}

/// Move the default warehouse (if present) to the front, keeping the rest stable.
pub fn default_first<'a>(names: &[&'a str], default_name: &str) -> Vec<&'a str> {
    let (mut ordered, rest): (Vec<&str>, Vec<&str>) =
        names.iter().partition(|name| **name == default_name);
    ordered.extend(rest);
    ordered
}

/// Order number with any `-<suffix>` from an earlier split removed
pub fn base_order_number(order_number: &str) -> &str {
    order_number.split('-').next().unwrap_or(order_number)
}

/// Partition `order` into one draft per warehouse.
pub fn split_order(
    order: &Order,
    warehouses: &[Option<String>],
    refs: &ReferenceData,
) -> Result<Vec<Order>, SyncError> {
    let default = refs.default_warehouse()?;

    let names = warehouses
        .iter()
        .map(|w| w.as_deref())
        .collect::<Option<Vec<&str>>>()
        .ok_or_else(|| SyncError::UntaggedItems {
            order_number: order.order_number.clone(),
        })?;
    let names = default_first(&names, &default.warehouse_name);
    let base_number = base_order_number(&order.order_number);

    names
        .iter()
        .enumerate()
        .map(|(i, name)| -> Result<Order, SyncError> {
            let mut draft = order.clone();
            draft.items.retain(|item| item.vendor() == Some(*name));
            draft.order_number = format!("{}-{}", base_number, name);
            draft.warehouse_location = Some(name.to_string());
            draft.advanced_options.warehouse_id = Some(refs.warehouse_id(name)?);

            if i != 0 {
                draft.order_key = None;
                draft.order_id = None;
                draft.amount_paid = Some(Decimal::ZERO);
                draft.tax_amount = Some(Decimal::ZERO);
                draft.shipping_amount = Some(Decimal::ZERO);
            }

            Ok(draft)
        })
        .collect()
}
