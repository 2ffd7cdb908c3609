//! Field rewriting for split drafts
//!
//! Stamps each draft with its warehouse, the responsible user and the
//! `customField1` tags that mark it as processed.

use super::error::SyncError;
use super::models::{Item, Order};
use super::reference::ReferenceData;

/// Idempotency marker: orders carrying it are never processed again
pub const PROCESSED_MARKER: &str = "webhook_processed";

const LEGACY_SPLIT_TAG: &str = "vendor-split";
const SPLIT_TAG: &str = "order_split";

pub fn is_processed(order: &Order) -> bool {
    order.tags().contains(PROCESSED_MARKER)
}

/// Prepend the marker and the vendor tag to `existing`, rename the legacy
/// split tag, drop empty and duplicate tags (first occurrence wins).
pub fn merge_tags(warehouse_location: &str, existing: &str) -> String {
    let combined = format!(
        "{}, vendor-{}, {}",
        PROCESSED_MARKER,
        warehouse_location.to_lowercase(),
        existing
    )
    .replace(LEGACY_SPLIT_TAG, SPLIT_TAG);

    let mut tags: Vec<&str> = Vec::new();
    for tag in combined.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags.join(", ")
}

/// Finalize a draft. A draft without a location falls back to the default
/// warehouse.
pub fn update_order(mut draft: Order, refs: &ReferenceData) -> Result<Order, SyncError> {
    let location = match draft.warehouse_location.take() {
        Some(location) => location,
        None => refs.default_warehouse()?.warehouse_name.clone(),
    };

    draft.advanced_options.warehouse_id = Some(refs.warehouse_id(&location)?);
    draft.advanced_options.custom_field1 = Some(merge_tags(&location, draft.tags()));
    draft.items = draft
        .items
        .into_iter()
        .map(|item| update_item(item, refs))
        .collect::<Result<_, _>>()?;
    draft.user_id = Some(refs.user_id(&location)?);
    draft.warehouse_location = Some(location);

    Ok(draft)
}

/// Items take their location from their own `vendor` option.
pub fn update_item(mut item: Item, refs: &ReferenceData) -> Result<Item, SyncError> {
    let location = match item.vendor() {
        Some(vendor) => vendor.to_string(),
        None => refs.default_warehouse()?.warehouse_name.clone(),
    };

    item.warehouse_id = Some(refs.warehouse_id(&location)?);
    item.warehouse_location = Some(location);
    Ok(item)
}
