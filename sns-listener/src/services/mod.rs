pub mod confirmation;
pub mod metrics;
pub mod sns_client;
pub mod store;
pub mod subscriber;

pub use confirmation::{confirm_subscription, spawn_confirmation};
pub use metrics::{get_metrics, init_metrics, record_notification};
pub use sns_client::{ControlPlane, SnsClient, SnsError};
pub use store::{MessageStore, StoreSnapshot};
pub use subscriber::{auto_subscribe, spawn_auto_subscribe, webhook_endpoint};
