//! Gateway request/response types

pub mod response;

pub use response::{ErrorResponse, HealthResponse, MessageResponse, TokenQuery};
