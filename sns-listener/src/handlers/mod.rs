pub mod health;
pub mod metrics;
pub mod status;
pub mod webhook;

pub use health::{health_check, not_found};
pub use metrics::metrics;
pub use status::{clear_messages, status_page, StatusTemplate};
pub use webhook::{receive_notification, webhook_liveness, WebhookStatus};
