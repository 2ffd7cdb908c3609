//! Scripted in-memory [`OrderApi`]
//!
//! Serves canned orders, warehouses and users, and records every mutating
//! call so tests can assert on what the pipeline sent upstream.
//!
//! ```rust,ignore
//! let api = MockOrderApi::new()
//!     .with_orders(vec![order])
//!     .with_warehouses(warehouses)
//!     .with_users(users);
//! let outcome = OrderSync::new(Arc::new(api.clone()), 4).on_new_orders(payload).await;
//! assert_eq!(api.assignments().len(), 2);
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::client::OrderApi;
use super::error::ApiError;
use super::models::{
    AssignUserRequest, AssignUserResponse, CreateOrderResult, CreateOrdersResponse, Order,
    OrderPage, User, Warehouse,
};
use crate::core_types::OrderId;

/// First id handed to orders created through the mock
pub const FIRST_CREATED_ID: OrderId = 9000;

#[derive(Clone, Default)]
pub struct MockOrderApi {
    state: Arc<Mutex<MockState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[derive(Default)]
struct MockState {
    orders: Vec<Order>,
    warehouses: Vec<Warehouse>,
    users: Vec<User>,
    list_orders_error: Option<StatusCode>,
    create_response: Option<CreateOrdersResponse>,
    created_count: i64,
    failing_assignments: HashSet<OrderId>,
    assign_delay: Duration,
    cancelled_pages: Vec<Vec<Order>>,
    delete_failures: HashMap<OrderId, u32>,

    fetched_urls: Vec<String>,
    reference_loads: usize,
    created_batches: Vec<Vec<Order>>,
    assignments: Vec<AssignUserRequest>,
    delete_attempts: Vec<OrderId>,
    deleted: Vec<OrderId>,
}

fn unavailable() -> ApiError {
    ApiError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "mock failure".to_string(),
    }
}

impl MockOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded calls from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        self.state().orders = orders;
        self
    }

    pub fn with_warehouses(self, warehouses: Vec<Warehouse>) -> Self {
        self.state().warehouses = warehouses;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.state().users = users;
        self
    }

    /// Make `list_orders` fail with `status`
    pub fn with_list_orders_error(self, status: StatusCode) -> Self {
        self.state().list_orders_error = Some(status);
        self
    }

    /// Replace the generated bulk-create response
    pub fn with_create_response(self, response: CreateOrdersResponse) -> Self {
        self.state().create_response = Some(response);
        self
    }

    pub fn with_failing_assignment(self, order_id: OrderId) -> Self {
        self.state().failing_assignments.insert(order_id);
        self
    }

    /// Hold each assign-user call for `delay` so overlap can be observed
    pub fn with_assign_delay(self, delay: Duration) -> Self {
        self.state().assign_delay = delay;
        self
    }

    /// Pages served by `list_cancelled_orders`, page 1 first
    pub fn with_cancelled_pages(self, pages: Vec<Vec<Order>>) -> Self {
        self.state().cancelled_pages = pages;
        self
    }

    /// Make `delete_order(order_id)` fail `times` times before succeeding
    pub fn with_delete_failures(self, order_id: OrderId, times: u32) -> Self {
        self.state().delete_failures.insert(order_id, times);
        self
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.state().fetched_urls.clone()
    }

    pub fn reference_loads(&self) -> usize {
        self.state().reference_loads
    }

    pub fn created_batches(&self) -> Vec<Vec<Order>> {
        self.state().created_batches.clone()
    }

    pub fn assignments(&self) -> Vec<AssignUserRequest> {
        self.state().assignments.clone()
    }

    pub fn delete_attempts(&self) -> Vec<OrderId> {
        self.state().delete_attempts.clone()
    }

    pub fn deleted(&self) -> Vec<OrderId> {
        self.state().deleted.clone()
    }

    /// Highest number of assign-user calls observed running at once
    pub fn max_concurrent_assignments(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn generated_response(state: &mut MockState, orders: &[Order]) -> CreateOrdersResponse {
        let results = orders
            .iter()
            .map(|order| {
                let order_id = order.order_id.unwrap_or_else(|| {
                    state.created_count += 1;
                    FIRST_CREATED_ID + state.created_count - 1
                });
                CreateOrderResult {
                    order_id: Some(order_id),
                    order_number: order.order_number.clone(),
                    order_key: order.order_key.clone(),
                    success: true,
                    error_message: None,
                }
            })
            .collect();

        CreateOrdersResponse {
            has_errors: false,
            results,
        }
    }
}

#[async_trait]
impl OrderApi for MockOrderApi {
    async fn list_orders(&self, resource_url: &str) -> Result<OrderPage, ApiError> {
        let mut state = self.state();
        state.fetched_urls.push(resource_url.to_string());
        if let Some(status) = state.list_orders_error {
            return Err(ApiError::Status {
                status,
                body: "mock failure".to_string(),
            });
        }

        let orders = state.orders.clone();
        Ok(OrderPage {
            total: orders.len() as u32,
            page: 1,
            pages: 1,
            orders,
        })
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        let mut state = self.state();
        state.reference_loads += 1;
        Ok(state.warehouses.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.state().users.clone())
    }

    async fn create_orders(&self, orders: &[Order]) -> Result<CreateOrdersResponse, ApiError> {
        let mut state = self.state();
        state.created_batches.push(orders.to_vec());
        let response = match state.create_response.clone() {
            Some(response) => response,
            None => Self::generated_response(&mut state, orders),
        };
        Ok(response)
    }

    async fn assign_user(
        &self,
        request: &AssignUserRequest,
    ) -> Result<AssignUserResponse, ApiError> {
        let (delay, fails) = {
            let mut state = self.state();
            state.assignments.push(request.clone());
            let fails = request
                .order_ids
                .iter()
                .any(|id| state.failing_assignments.contains(id));
            (state.assign_delay, fails)
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fails {
            return Err(unavailable());
        }
        Ok(AssignUserResponse {
            success: true,
            message: "User assigned successfully".to_string(),
        })
    }

    async fn list_cancelled_orders(&self, page: u32) -> Result<OrderPage, ApiError> {
        let state = self.state();
        let pages = state.cancelled_pages.len() as u32;
        let orders = state
            .cancelled_pages
            .get(page.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default();
        let total = state.cancelled_pages.iter().map(Vec::len).sum::<usize>() as u32;
        Ok(OrderPage {
            orders,
            total,
            page,
            pages,
        })
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), ApiError> {
        let mut state = self.state();
        state.delete_attempts.push(order_id);
        if let Some(remaining) = state.delete_failures.get_mut(&order_id)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(unavailable());
        }
        state.deleted.push(order_id);
        Ok(())
    }
}
