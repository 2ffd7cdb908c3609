//! New-order webhook orchestration
//!
//! One invocation walks:
//!
//! ```text
//! validate ─▶ fetch orders ─▶ filter ─┬─▶ (nothing eligible) done
//!                                     └─▶ load warehouses/users
//!                                          ─▶ split + update every order
//!                                          ─▶ bulk create
//!                                          ─▶ assign users (bounded fan-out)
//! ```
//!
//! Every step except the assignment fan-out depends on the previous one and
//! runs sequentially. There is no transaction across the upstream calls: a
//! failure after the bulk create leaves the created orders in place.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::client::OrderApi;
use super::error::{ApiError, SyncError};
use super::models::{
    AssignUserRequest, AssignUserResponse, CreateOrdersResponse, ORDER_NOTIFY, Order,
    WebhookPayload,
};
use super::reference::ReferenceData;
use super::split::{resolve_warehouses, split_order};
use super::update::{is_processed, update_order};

pub const SUCCESS_MESSAGE: &str = "Shipstation new order webhook succeeded!";

/// Result handed back to the HTTP layer: `{ "message": .. }` or `{ "error": .. }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Message(String),
    Error(String),
}

impl SyncOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// What one invocation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub orders_found: usize,
    pub drafts_submitted: usize,
    pub created: Vec<String>,
    pub bulk_has_errors: bool,
    pub assigned: usize,
}

pub struct OrderSync {
    api: Arc<dyn OrderApi>,
    assign_concurrency: usize,
}

impl OrderSync {
    pub fn new(api: Arc<dyn OrderApi>, assign_concurrency: usize) -> Self {
        Self {
            api,
            assign_concurrency: assign_concurrency.max(1),
        }
    }

    /// Webhook entry point. Never fails: errors become [`SyncOutcome::Error`].
    pub async fn on_new_orders(&self, payload: &WebhookPayload) -> SyncOutcome {
        let span = info_span!("on_new_orders", id = %Uuid::new_v4());
        async {
            info!("Shipstation new order webhook received");
            match self.run(payload).await {
                Ok(report) => {
                    info!(
                        found = report.orders_found,
                        submitted = report.drafts_submitted,
                        assigned = report.assigned,
                        "{}",
                        SUCCESS_MESSAGE
                    );
                    SyncOutcome::Message(SUCCESS_MESSAGE.to_string())
                }
                Err(e) => {
                    error!("Shipstation new order webhook error: {}", e);
                    SyncOutcome::Error(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn run(&self, payload: &WebhookPayload) -> Result<SyncReport, SyncError> {
        let resource_url = validate_payload(payload)?;

        let page = self.api.list_orders(resource_url).await?;
        let eligible = filter_eligible(page.orders);
        if eligible.is_empty() {
            info!("No new orders found");
            return Ok(SyncReport::default());
        }

        let refs = ReferenceData::load(self.api.as_ref()).await?;
        info!("{} new orders found", eligible.len());

        let drafts = prepare_batch(&eligible, &refs)?;
        info!("{} orders updated", drafts.len());

        let mut report = SyncReport {
            orders_found: eligible.len(),
            drafts_submitted: drafts.len(),
            ..Default::default()
        };
        if drafts.is_empty() {
            return Ok(report);
        }

        let response = self.api.create_orders(&drafts).await?;
        report.created = response
            .results
            .iter()
            .map(|r| r.order_number.clone())
            .collect();
        info!("Orders updated: {}", report.created.join(", "));

        if response.has_errors {
            report.bulk_has_errors = true;
            warn!("Bulk create reported errors, skipping user assignment");
            return Ok(report);
        }

        info!("Assigning users to updated orders");
        let requests = assignment_requests(&drafts, &response);
        report.assigned = self.assign_users(requests).await?;
        Ok(report)
    }

    /// Run every assignment, at most `assign_concurrency` at a time, and
    /// report failures only after all of them finished.
    async fn assign_users(
        &self,
        requests: Vec<(String, AssignUserRequest)>,
    ) -> Result<usize, SyncError> {
        let total = requests.len();
        let semaphore = Semaphore::new(self.assign_concurrency);

        let results: Vec<(String, Result<AssignUserResponse, ApiError>)> =
            join_all(requests.into_iter().map(|(order_number, request)| {
                let semaphore = &semaphore;
                async move {
                    // The semaphore is never closed.
                    let _permit = semaphore.acquire().await.ok();
                    let result = self.api.assign_user(&request).await;
                    (order_number, result)
                }
            }))
            .await;

        let mut failed = 0;
        for (order_number, result) in &results {
            match result {
                Ok(response) => info!("{} {}", order_number, response.message),
                Err(e) => {
                    failed += 1;
                    warn!("{} user assignment failed: {}", order_number, e);
                }
            }
        }

        if failed > 0 {
            return Err(SyncError::AssignmentFailed { failed, total });
        }
        Ok(total)
    }
}

/// The webhook must name a resource URL and be an `ORDER_NOTIFY` delivery.
pub fn validate_payload(payload: &WebhookPayload) -> Result<&str, SyncError> {
    let resource_url = payload.resource_url.as_deref().filter(|u| !u.is_empty());
    let resource_type = payload.resource_type.as_deref().filter(|t| !t.is_empty());

    match (resource_url, resource_type) {
        (Some(url), Some(ORDER_NOTIFY)) => Ok(url),
        (Some(_), Some(other)) => Err(SyncError::Validation(format!(
            "unsupported resource_type {}",
            other
        ))),
        _ => Err(SyncError::Validation(
            "missing resource_url or resource_type".to_string(),
        )),
    }
}

/// Awaiting-shipment orders that do not carry the processed marker yet
pub fn filter_eligible(orders: Vec<Order>) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|order| order.is_awaiting_shipment())
        .filter(|order| !is_processed(order))
        .collect()
}

/// Split and finalize every order into one flat batch.
pub fn prepare_batch(orders: &[Order], refs: &ReferenceData) -> Result<Vec<Order>, SyncError> {
    let mut batch = Vec::new();
    for order in orders {
        let drafts = split_order(order, &resolve_warehouses(order), refs)?;
        for draft in drafts {
            batch.push(update_order(draft, refs)?);
        }
    }
    Ok(batch)
}

/// One request per draft that has both an order id and a user.
///
/// Drafts created by the bulk call take their id from the bulk results.
/// Results come back in request order, so the result at the draft's own
/// position is preferred; otherwise the first unclaimed successful result
/// with the same order number is used. Each result is claimed at most once,
/// since splits of different orders can share an order number.
pub fn assignment_requests(
    drafts: &[Order],
    response: &CreateOrdersResponse,
) -> Vec<(String, AssignUserRequest)> {
    let results = &response.results;
    let mut claimed = vec![false; results.len()];
    let mut requests = Vec::new();

    for (i, draft) in drafts.iter().enumerate() {
        let matches = |j: usize| {
            !claimed[j] && results[j].success && results[j].order_number == draft.order_number
        };
        let slot = if i < results.len() && matches(i) {
            Some(i)
        } else {
            (0..results.len()).find(|&j| matches(j))
        };
        if let Some(j) = slot {
            claimed[j] = true;
        }

        let Some(order_id) = draft
            .order_id
            .or_else(|| slot.and_then(|j| results[j].order_id))
        else {
            continue;
        };
        let Some(user_id) = draft.user_id.clone() else {
            continue;
        };
        requests.push((
            draft.order_number.clone(),
            AssignUserRequest {
                order_ids: vec![order_id],
                user_id,
            },
        ));
    }
    requests
}
