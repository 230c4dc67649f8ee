use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;

use crate::error::WebhookError;
use crate::models::{SnsEnvelope, SnsMessage};
use crate::services::{record_notification, spawn_confirmation};
use crate::startup::AppState;

pub const LIVENESS_MESSAGE: &str = "SNS Webhook is active";

/// Body of every successful webhook response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookStatus {
    SubscriptionConfirming,
    MessageReceived,
    UnknownRequestType,
}

pub async fn webhook_liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Accept an SNS delivery.
///
/// The body is read as raw bytes: SNS posts JSON with a `text/plain`
/// content type.
#[tracing::instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn receive_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookStatus>, WebhookError> {
    let envelope = SnsEnvelope::from_slice(&body)?;
    tracing::info!(
        message_type = envelope.kind().unwrap_or("<missing>"),
        topic_arn = envelope.topic_arn().unwrap_or("<missing>"),
        message_id = envelope.message_id().unwrap_or("<missing>"),
        "Received notification"
    );

    let status = match envelope.into_message()? {
        SnsMessage::SubscriptionConfirmation {
            topic_arn,
            subscribe_url,
        } => {
            match subscribe_url {
                Some(url) => spawn_confirmation(state.http_client.clone(), url),
                None => tracing::warn!(
                    topic_arn = topic_arn.as_deref().unwrap_or("<missing>"),
                    "Subscription confirmation without SubscribeURL"
                ),
            }
            WebhookStatus::SubscriptionConfirming
        }
        SnsMessage::Notification(record) => {
            let topic_name = record.topic_name.clone();
            let message_id = record.message_id.clone();
            let count = state.store.record(record);
            record_notification(&topic_name);
            tracing::info!(
                topic = %topic_name,
                message_id = %message_id,
                topic_count = count,
                "Stored message"
            );
            WebhookStatus::MessageReceived
        }
        SnsMessage::Unrecognized(kind) => {
            tracing::warn!(
                message_type = kind.as_deref().unwrap_or("<missing>"),
                "Unknown request type"
            );
            WebhookStatus::UnknownRequestType
        }
    };

    Ok(Json(status))
}
