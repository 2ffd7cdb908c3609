use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::shipstation::ShipStationConfig;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub shipstation: ShipStationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Mount routes under the functions prefix instead of `/`
    pub serverless: bool,
    /// Shared secret expected as `?token=` on the webhook route
    pub webhook_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "shipsplit.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            gateway: GatewayConfig::default(),
            shipstation: ShipStationConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3005,
            serverless: false,
            webhook_token: None,
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml` (if present) and apply environment overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse {}", path))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Environment variables win over file values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SHIPSTATION_API_URL") {
            self.shipstation.api_url = url;
        }
        if let Some(key) = lookup("SHIPSTATION_API_KEY") {
            self.shipstation.api_key = key;
        }
        if let Some(secret) = lookup("SHIPSTATION_API_SECRET") {
            self.shipstation.api_secret = Some(secret);
        }
        if let Some(token) = lookup("WEBHOOK_TOKEN").filter(|t| !t.is_empty()) {
            self.gateway.webhook_token = Some(token);
        }
        if let Some(flag) = lookup("SERVERLESS") {
            self.gateway.serverless = !matches!(flag.as_str(), "" | "0" | "false");
        }
        if let Some(port) = lookup("PORT") {
            self.gateway.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }
}
