//! Webhook handlers

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use super::super::state::AppState;
use super::super::types::{ErrorResponse, MessageResponse, TokenQuery};
use crate::shipstation::{SyncOutcome, WebhookPayload};

/// GET /webhooks
pub async fn webhooks_index() -> Json<MessageResponse> {
    Json(MessageResponse::new("ok"))
}

/// POST /webhooks/shipstation/on-new-orders
///
/// - token mismatch: 401 `{error: "unauthorized"}`
/// - unreadable body: 400 `{error}`
/// - otherwise the sync outcome: 200 `{message}` or 500 `{error}`
pub async fn on_new_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Response {
    if !state.is_authorized(query.token.as_deref()) {
        warn!("Rejected webhook delivery with missing or wrong token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("unauthorized")),
        )
            .into_response();
    }

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Unreadable webhook body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(rejection.body_text())),
            )
                .into_response();
        }
    };

    let outcome = state.sync.on_new_orders(&payload).await;
    let status = match outcome {
        SyncOutcome::Message(_) => StatusCode::OK,
        SyncOutcome::Error(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(outcome)).into_response()
}
