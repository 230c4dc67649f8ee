//! Inbound SNS HTTP(S) delivery payloads.
//!
//! SNS posts the same JSON shape for every message kind and tells them apart
//! with the `Type` field. The envelope is kept as a loose JSON object and
//! each branch reads only the fields it needs, so an odd value in a field
//! the branch ignores never fails the delivery.

use serde_json::{Map, Value};

use super::record::NotificationRecord;
use crate::error::WebhookError;

pub const SUBSCRIPTION_CONFIRMATION: &str = "SubscriptionConfirmation";
pub const NOTIFICATION: &str = "Notification";

const TYPE: &str = "Type";
const TOPIC_ARN: &str = "TopicArn";
const MESSAGE_ID: &str = "MessageId";
const MESSAGE: &str = "Message";
const SUBSCRIBE_URL: &str = "SubscribeURL";

/// Used for a missing `TopicArn` or `MessageId`.
pub const UNKNOWN: &str = "Unknown";
/// Used for a missing `Message`.
pub const NO_CONTENT: &str = "No content";

/// Raw envelope: any JSON object.
#[derive(Debug, Default, Clone)]
pub struct SnsEnvelope {
    fields: Map<String, Value>,
}

/// Envelope after dispatch on `Type`, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SnsMessage {
    SubscriptionConfirmation {
        topic_arn: Option<String>,
        subscribe_url: Option<String>,
    },
    Notification(NotificationRecord),
    /// Missing `Type`, or one this service does not handle. Carries the
    /// raw `Type` text for logging.
    Unrecognized(Option<String>),
}

impl SnsEnvelope {
    /// Decode a request body. The body must be a JSON object; SNS sends it
    /// with `Content-Type: text/plain`, so the header is not consulted.
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        match serde_json::from_slice(body)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(WebhookError::NotAnObject),
        }
    }

    /// `Type`, when it is a string.
    pub fn kind(&self) -> Option<&str> {
        self.str_field(TYPE)
    }

    pub fn topic_arn(&self) -> Option<&str> {
        self.str_field(TOPIC_ARN)
    }

    pub fn message_id(&self) -> Option<&str> {
        self.str_field(MESSAGE_ID)
    }

    /// Dispatch on `Type`.
    ///
    /// Only a notification can fail: its `TopicArn` must be a string because
    /// the topic name is derived from it. Other non-string values are kept
    /// as their JSON text.
    pub fn into_message(self) -> Result<SnsMessage, WebhookError> {
        let message = match self.kind() {
            Some(SUBSCRIPTION_CONFIRMATION) => SnsMessage::SubscriptionConfirmation {
                topic_arn: self.topic_arn().map(str::to_string),
                subscribe_url: self.str_field(SUBSCRIBE_URL).map(str::to_string),
            },
            Some(NOTIFICATION) => {
                let topic_arn = match self.field(TOPIC_ARN) {
                    None => UNKNOWN.to_string(),
                    Some(Value::String(arn)) => arn.clone(),
                    Some(_) => return Err(WebhookError::InvalidField(TOPIC_ARN)),
                };
                SnsMessage::Notification(NotificationRecord::new(
                    topic_arn,
                    self.text_field(MESSAGE_ID)
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    self.text_field(MESSAGE)
                        .unwrap_or_else(|| NO_CONTENT.to_string()),
                ))
            }
            _ => SnsMessage::Unrecognized(self.text_field(TYPE)),
        };
        Ok(message)
    }

    // `null` counts as absent.
    fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    fn text_field(&self, key: &str) -> Option<String> {
        self.field(key).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

/// Last `:`-separated segment of a topic ARN, or the whole input when it has
/// no colon.
pub fn topic_name_from_arn(topic_arn: &str) -> &str {
    topic_arn.rsplit(':').next().unwrap_or(topic_arn)
}
