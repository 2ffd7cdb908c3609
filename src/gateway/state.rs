use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::shipstation::OrderSync;

/// Gateway state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<OrderSync>,
    /// Expected `?token=` on the webhook route, if any
    pub webhook_token: Option<String>,
}

impl AppState {
    pub fn new(sync: Arc<OrderSync>, webhook_token: Option<String>) -> Self {
        Self {
            sync,
            webhook_token: webhook_token.filter(|t| !t.is_empty()),
        }
    }

    /// True when no token is configured or `provided` matches it
    pub fn is_authorized(&self, provided: Option<&str>) -> bool {
        match &self.webhook_token {
            Some(expected) => provided
                .map(|p| p.as_bytes().ct_eq(expected.as_bytes()).into())
                .unwrap_or(false),
            None => true,
        }
    }
}
