//! ShipStationClient against a stub upstream served by axum on an
//! ephemeral port.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use shipsplit::shipstation::models::AssignUserRequest;
use shipsplit::shipstation::{
    ApiError, OrderApi, OrderSync, ShipStationClient, ShipStationConfig, WebhookPayload,
};

/// Basic base64("key:secret")
const EXPECTED_AUTH: &str = "Basic a2V5OnNlY3JldA==";

#[derive(Default)]
struct Upstream {
    order_failures_left: u32,
    order_requests: u32,
    auth_headers: Vec<String>,
    created: Vec<Value>,
    assigned: Vec<Value>,
}

type Shared = Arc<Mutex<Upstream>>;

fn record_auth(state: &Shared, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.lock().unwrap().auth_headers.push(auth);
}

async fn orders(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    let mut s = state.lock().unwrap();
    s.order_requests += 1;
    if s.order_failures_left > 0 {
        s.order_failures_left -= 1;
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "try later" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "orders": [{
                "orderId": 1001,
                "orderKey": "key-1001",
                "orderNumber": "1001",
                "orderStatus": "awaiting_shipment",
                "amountPaid": 49.99,
                "advancedOptions": { "customField1": "vendor-split" },
                "items": [
                    { "sku": "a", "options": [{ "name": "vendor", "value": "WEST" }] },
                    { "sku": "b", "options": [{ "name": "vendor", "value": "EAST" }] }
                ]
            }],
            "total": 1,
            "page": 1,
            "pages": 1
        })),
    )
}

async fn warehouses() -> Json<Value> {
    Json(json!([
        { "warehouseId": 5, "warehouseName": "EAST", "isDefault": true },
        { "warehouseId": 7, "warehouseName": "WEST", "isDefault": false }
    ]))
}

async fn users() -> Json<Value> {
    Json(json!([
        { "userId": "u-east", "name": "EAST", "userName": "east@example.test" },
        { "userId": "u-west", "name": "WEST", "userName": "west@example.test" }
    ]))
}

async fn create_orders(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let results: Vec<Value> = body
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, order)| {
            json!({
                "orderId": order.get("orderId").cloned().unwrap_or(json!(9000 + i)),
                "orderNumber": order["orderNumber"],
                "success": true
            })
        })
        .collect();
    state.lock().unwrap().created.push(body);
    Json(json!({ "hasErrors": false, "results": results }))
}

async fn assign_user(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().assigned.push(body);
    Json(json!({ "success": true, "message": "User assigned successfully" }))
}

async fn delete_order() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "order not found" })),
    )
}

async fn spawn_upstream(order_failures: u32) -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(Upstream {
        order_failures_left: order_failures,
        ..Default::default()
    }));
    let app = Router::new()
        .route("/orders", get(orders))
        .route("/warehouses", get(warehouses))
        .route("/users", get(users))
        .route("/orders/createorders", post(create_orders))
        .route("/orders/assignuser", post(assign_user))
        .route("/orders/{id}", delete(delete_order))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn client_for(base: &str) -> ShipStationClient {
    let config = ShipStationConfig {
        api_url: base.to_string(),
        api_key: "key".to_string(),
        api_secret: Some("secret".to_string()),
        max_retries: 3,
        retry_delay_ms: 10,
        ..Default::default()
    };
    ShipStationClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let (base, state) = spawn_upstream(2).await;
    let client = client_for(&base);

    let page = client
        .list_orders(&format!("{}/orders?importBatch=abc", base))
        .await
        .unwrap();

    assert_eq!(page.orders.len(), 1);
    assert_eq!(page.orders[0].order_number, "1001");
    let s = state.lock().unwrap();
    assert_eq!(s.order_requests, 3);
    assert!(s.auth_headers.iter().all(|h| h == EXPECTED_AUTH));
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let (base, state) = spawn_upstream(10).await;
    let client = client_for(&base);

    let result = client.list_orders("/orders").await;

    assert!(matches!(
        result,
        Err(ApiError::Status { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE
    ));
    assert_eq!(state.lock().unwrap().order_requests, 4);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let (base, _state) = spawn_upstream(0).await;
    let client = client_for(&base);

    let result = client.delete_order(42).await;

    assert!(matches!(
        result,
        Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn test_assign_user_body_is_camel_case() {
    let (base, state) = spawn_upstream(0).await;
    let client = client_for(&base);

    let response = client
        .assign_user(&AssignUserRequest {
            order_ids: vec![1001],
            user_id: "u-east".to_string(),
        })
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(
        state.lock().unwrap().assigned,
        vec![json!({ "orderIds": [1001], "userId": "u-east" })]
    );
}

#[tokio::test]
async fn test_sync_end_to_end_over_http() {
    let (base, state) = spawn_upstream(1).await;
    let sync = OrderSync::new(Arc::new(client_for(&base)), 2);
    let payload = WebhookPayload {
        resource_url: Some(format!("{}/orders?importBatch=abc", base)),
        resource_type: Some("ORDER_NOTIFY".to_string()),
    };

    let report = sync.run(&payload).await.unwrap();

    assert_eq!(report.orders_found, 1);
    assert_eq!(report.assigned, 2);

    let s = state.lock().unwrap();
    assert_eq!(s.created.len(), 1);
    let batch = s.created[0].as_array().unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["orderNumber"], "1001-EAST");
    assert_eq!(batch[0]["orderId"], 1001);
    assert_eq!(batch[0]["userId"], "u-east");
    assert_eq!(batch[0]["advancedOptions"]["warehouseId"], 5);
    assert_eq!(
        batch[0]["advancedOptions"]["customField1"],
        "webhook_processed, vendor-east, order_split"
    );
    assert_eq!(batch[1]["orderNumber"], "1001-WEST");
    assert!(batch[1].get("orderId").is_none());
    assert!(batch[1].get("orderKey").is_none());
    assert_eq!(batch[1]["amountPaid"], 0.0);
    assert_eq!(batch[1]["items"][0]["sku"], "a");
    assert_eq!(batch[1]["items"][0]["warehouseId"], 7);

    let mut assigned = s.assigned.clone();
    assigned.sort_by_key(|a| a["orderIds"][0].as_i64());
    assert_eq!(
        assigned,
        vec![
            json!({ "orderIds": [1001], "userId": "u-east" }),
            json!({ "orderIds": [9001], "userId": "u-west" }),
        ]
    );
}
