//! shipsplit - webhook server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────┐    ┌─────────────┐
//! │ Webhook  │───▶│ Gateway  │───▶│ OrderSync │───▶│ ShipStation │
//! │ delivery │    │ (axum)   │    │           │    │   API       │
//! └──────────┘    └──────────┘    └───────────┘    └─────────────┘
//! ```
//!
//! Flags: `--env/-e <name>` selects `config/<name>.yaml`, `--port <n>`
//! overrides the listen port.

use std::sync::Arc;

use anyhow::Context;
use shipsplit::config::AppConfig;
use shipsplit::gateway;
use shipsplit::shipstation::{OrderSync, ShipStationClient};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = shipsplit::logging::init_logging(&app_config)?;

    tracing::info!(
        "Starting shipsplit {} in {} mode",
        gateway::handlers::health::GIT_HASH,
        env
    );
    tracing::info!("ShipStation API: {}", app_config.shipstation.api_url);

    let client = ShipStationClient::new(&app_config.shipstation)
        .context("failed to build ShipStation client")?;
    let sync = Arc::new(OrderSync::new(
        Arc::new(client),
        app_config.shipstation.assign_concurrency,
    ));

    gateway::run_server(&app_config.gateway, sync).await
}
