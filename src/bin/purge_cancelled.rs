//! Delete every cancelled order in the ShipStation account.
//!
//! Usage: `purge_cancelled [--env <name>] [--max-passes <n>]`

use std::sync::Arc;

use anyhow::Context;
use shipsplit::config::AppConfig;
use shipsplit::shipstation::{CancelledOrderPurge, ShipStationClient};

fn get_arg(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_arg(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string());
    let app_config = AppConfig::load(&env)?;
    let _log_guard = shipsplit::logging::init_logging(&app_config)?;

    let client = ShipStationClient::new(&app_config.shipstation)
        .context("failed to build ShipStation client")?;
    let mut purge = CancelledOrderPurge::new(Arc::new(client));
    if let Some(passes) = get_arg(&["--max-passes"]) {
        let passes: u32 = passes
            .parse()
            .with_context(|| format!("invalid --max-passes value: {}", passes))?;
        purge = purge.with_max_passes(passes);
    }

    let report = purge.run().await?;
    println!(
        "found {}, deleted {}, failed {} after {} passes",
        report.found,
        report.deleted,
        report.failed.len(),
        report.passes
    );
    if !report.failed.is_empty() {
        anyhow::bail!("could not delete orders: {:?}", report.failed);
    }
    Ok(())
}
