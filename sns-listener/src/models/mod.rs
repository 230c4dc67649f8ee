pub mod envelope;
pub mod record;

pub use envelope::{SnsEnvelope, SnsMessage, topic_name_from_arn};
pub use record::NotificationRecord;
