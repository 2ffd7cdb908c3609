use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::RetryPolicy;

pub const DEFAULT_API_URL: &str = "https://ssapi.shipstation.com";

/// Upstream order API connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ShipStationConfig {
    pub api_url: String,
    /// Either the pre-encoded Basic credential, or the key half of `key:secret`
    pub api_key: String,
    pub api_secret: Option<String>,
    pub timeout_secs: u64,
    /// Additional attempts after the first one fails transiently
    pub max_retries: u32,
    /// Attempt `n` waits `n * retry_delay_ms`
    pub retry_delay_ms: u64,
    /// Upper bound on concurrent assign-user calls
    pub assign_concurrency: usize,
}

impl Default for ShipStationConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            api_secret: None,
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 2000,
            assign_concurrency: 8,
        }
    }
}

impl ShipStationConfig {
    /// Value of the `Authorization` header sent with every call
    pub fn authorization(&self) -> String {
        match self.api_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {
                let raw = format!("{}:{}", self.api_key, secret);
                format!("Basic {}", STANDARD.encode(raw))
            }
            _ => format!("Basic {}", self.api_key),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
