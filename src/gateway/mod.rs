//! HTTP gateway
//!
//! ```text
//! GET  /webhooks                              -> { "message": "ok" }
//! POST /webhooks/shipstation/on-new-orders    -> OrderSync::on_new_orders
//! GET  /health                                -> status, build hash, time
//! ```
//!
//! In serverless mode every route is mounted under [`SERVERLESS_PREFIX`].

pub mod handlers;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::GatewayConfig;
use crate::shipstation::OrderSync;
use state::AppState;

pub const SERVERLESS_PREFIX: &str = "/.netlify/functions";

pub fn build_router(state: Arc<AppState>, serverless: bool) -> Router {
    let routes = Router::new()
        .route("/webhooks", get(handlers::webhooks_index))
        .route(
            "/webhooks/shipstation/on-new-orders",
            post(handlers::on_new_orders),
        )
        .route("/health", get(handlers::health_check));

    let app = if serverless {
        Router::new().nest(SERVERLESS_PREFIX, routes)
    } else {
        routes
    };
    app.with_state(state)
}

pub async fn run_server(config: &GatewayConfig, sync: Arc<OrderSync>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(sync, config.webhook_token.clone()));
    let app = build_router(state, config.serverless);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    info!("Gateway listening on http://{}", addr);
    if config.serverless {
        info!("Serverless mode: routes mounted under {}", SERVERLESS_PREFIX);
    }
    if config.webhook_token.is_none() {
        info!("No webhook token configured, webhook route is unauthenticated");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
