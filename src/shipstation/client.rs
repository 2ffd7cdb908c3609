//! Upstream order API client
//!
//! [`OrderApi`] is the seam the sync pipeline talks to. [`ShipStationClient`]
//! is the HTTP implementation: every call carries the configured Basic
//! authorization header and goes through the [`RetryPolicy`].

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::config::ShipStationConfig;
use super::error::ApiError;
use super::models::{
    AssignUserRequest, AssignUserResponse, CreateOrdersResponse, Order, OrderPage, User,
    Warehouse,
};
use super::retry::RetryPolicy;
use crate::core_types::OrderId;

/// Operations the order pipeline needs from the upstream API
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Fetch the order list a webhook points at
    async fn list_orders(&self, resource_url: &str) -> Result<OrderPage, ApiError>;

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, ApiError>;

    /// Active users only
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// Create or update many orders in one call. Orders carrying an
    /// `orderKey` update the existing order, the rest are created.
    async fn create_orders(&self, orders: &[Order]) -> Result<CreateOrdersResponse, ApiError>;

    async fn assign_user(
        &self,
        request: &AssignUserRequest,
    ) -> Result<AssignUserResponse, ApiError>;

    async fn list_cancelled_orders(&self, page: u32) -> Result<OrderPage, ApiError>;

    async fn delete_order(&self, order_id: OrderId) -> Result<(), ApiError>;
}

/// HTTP client for the upstream order API
#[derive(Debug, Clone)]
pub struct ShipStationClient {
    client: Client,
    base_url: String,
    authorization: String,
    retry: RetryPolicy,
}

impl ShipStationClient {
    pub fn new(config: &ShipStationConfig) -> Result<Self, ApiError> {
        if config.api_key.is_empty() {
            return Err(ApiError::Config("SHIPSTATION_API_KEY is not set".to_string()));
        }

        info!("Initializing order API client for {}", config.api_url);

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            authorization: config.authorization(),
            retry: config.retry_policy(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs (e.g. a webhook `resource_url`) are used verbatim,
    /// anything else is joined to the base URL.
    pub fn url_for(&self, endpoint: &str) -> Result<String, ApiError> {
        if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
            return Ok(endpoint.to_string());
        }
        if endpoint.is_empty() || endpoint.contains("://") {
            return Err(ApiError::InvalidEndpoint(endpoint.to_string()));
        }
        if endpoint.starts_with('/') {
            Ok(format!("{}{}", self.base_url, endpoint))
        } else {
            Ok(format!("{}/{}", self.base_url, endpoint))
        }
    }

    /// Perform an API call with retry. A body is only sent with POST.
    pub async fn call<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url_for(endpoint)?;
        let label = format!("{} {}", method, endpoint);
        let body = body.filter(|_| method == Method::POST);
        let url = url.as_str();

        self.retry
            .run(&label, move || self.send_once(method.clone(), url, body))
            .await
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.call::<(), T>(Method::GET, endpoint, None).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.call(Method::POST, endpoint, Some(body)).await
    }

    async fn send_once<B, T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes[..]
        };
        serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl OrderApi for ShipStationClient {
    async fn list_orders(&self, resource_url: &str) -> Result<OrderPage, ApiError> {
        self.get(resource_url).await
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        self.get("/warehouses").await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users?showInactive=false").await
    }

    async fn create_orders(&self, orders: &[Order]) -> Result<CreateOrdersResponse, ApiError> {
        self.post("/orders/createorders", orders).await
    }

    async fn assign_user(
        &self,
        request: &AssignUserRequest,
    ) -> Result<AssignUserResponse, ApiError> {
        self.post("/orders/assignuser", request).await
    }

    async fn list_cancelled_orders(&self, page: u32) -> Result<OrderPage, ApiError> {
        self.get(&format!("/orders?orderStatus=cancelled&page={}", page))
            .await
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), ApiError> {
        self.call::<(), Value>(Method::DELETE, &format!("/orders/{}", order_id), None)
            .await?;
        Ok(())
    }
}
