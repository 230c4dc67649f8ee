use chrono::{DateTime, Utc};
use serde::Serialize;

use super::envelope::topic_name_from_arn;

/// A notification accepted by the webhook. Never mutated once stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationRecord {
    pub received_at: DateTime<Utc>,
    pub topic_arn: String,
    pub topic_name: String,
    pub message_id: String,
    pub content: String,
}

impl NotificationRecord {
    /// Build a record stamped with the current time.
    pub fn new(topic_arn: String, message_id: String, content: String) -> Self {
        Self::with_timestamp(Utc::now(), topic_arn, message_id, content)
    }

    pub fn with_timestamp(
        received_at: DateTime<Utc>,
        topic_arn: String,
        message_id: String,
        content: String,
    ) -> Self {
        let topic_name = topic_name_from_arn(&topic_arn).to_string();
        Self {
            received_at,
            topic_arn,
            topic_name,
            message_id,
            content,
        }
    }

    pub fn timestamp(&self) -> String {
        self.received_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
