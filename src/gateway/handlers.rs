pub mod health;
pub mod webhooks;

pub use health::health_check;
pub use webhooks::{on_new_orders, webhooks_index};
