use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Network failures, timeouts, 5xx and 429 are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Shipstation new order webhook FAILED: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(String),

    #[error("No user named after warehouse: {0}")]
    UserNotFound(String),

    #[error("No default warehouse configured")]
    NoDefaultWarehouse,

    #[error("Order {order_number} has items without a vendor option")]
    UntaggedItems { order_number: String },

    #[error("{failed} of {total} user assignments failed")]
    AssignmentFailed { failed: usize, total: usize },
}
