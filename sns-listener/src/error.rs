use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure while handling a webhook delivery.
///
/// Rendered as HTTP 500 with `{"status": "error", "message": ...}` so SNS
/// sees the delivery as failed; never propagated further than the route.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("{0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("{0} must be a string")]
    InvalidField(&'static str),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Error processing request");
        error_response(self.to_string())
    }
}

pub(crate) fn error_response(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "status": "error",
            "message": message,
        })),
    )
        .into_response()
}
