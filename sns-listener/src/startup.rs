//! Application startup and lifecycle management.

use axum::{
    middleware::from_fn,
    response::Response,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{http_trace_layer, request_id_middleware};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::ListenerConfig;
use crate::error::error_response;
use crate::handlers::{
    clear_messages, health_check, metrics, not_found, receive_notification, status_page,
    webhook_liveness,
};
use crate::services::{webhook_endpoint, MessageStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MessageStore>,
    /// Used for subscription confirmation requests.
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(store: Arc<MessageStore>, http_client: reqwest::Client) -> Self {
        Self { store, http_client }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(MessageStore::new()), reqwest::Client::new())
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "request handler panicked".to_string()
    };

    tracing::error!(error = %message, "Error processing request");
    error_response(message)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status_page))
        .route("/clear", post(clear_messages))
        .route("/webhook", get(webhook_liveness).post(receive_notification))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    webhook_url: String,
    state: AppState,
}

impl Application {
    /// Bind the listener. Port 0 picks a free port, which tests rely on.
    pub async fn build(config: ListenerConfig) -> Result<Self, AppError> {
        let address = config.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let webhook_url = webhook_endpoint(config.subscription.public_url.as_deref(), port);

        Ok(Self {
            port,
            listener,
            webhook_url,
            state: AppState::default(),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// URL advertised to SNS when subscribing.
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}
