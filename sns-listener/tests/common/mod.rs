#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    routing::get,
    Router,
};
use sns_listener::config::SnsConfig;
use sns_listener::services::ControlPlane;
use sns_listener::startup::{build_router, AppState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::default();
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let (status, _, body) = self
            .request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        (status, body)
    }

    pub async fn post(&self, uri: &str) -> (StatusCode, String) {
        let (status, _, body) = self
            .request(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        (status, body)
    }

    /// Post a raw webhook body the way SNS does (`text/plain`).
    pub async fn post_webhook(&self, body: &str) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = self
            .request(
                Request::builder()
                    .method("POST")
                    .uri("/webhook")
                    .header("content-type", "text/plain; charset=UTF-8")
                    .header("x-amz-sns-message-type", "Notification")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        let json = serde_json::from_str(&body).expect("webhook responses are JSON");
        (status, json)
    }

    pub fn record_count(&self) -> usize {
        self.state.store.len()
    }

    pub fn topic_count(&self, topic: &str) -> u64 {
        self.state.store.topic_count(topic)
    }

    pub fn assert_counters_consistent(&self) {
        let snapshot = self.state.store.snapshot();
        let sum: u64 = snapshot.topics.values().sum();
        assert_eq!(sum as usize, snapshot.total());
    }
}

pub fn notification(topic_arn: &str, message_id: &str, message: &str) -> String {
    serde_json::json!({
        "Type": "Notification",
        "MessageId": message_id,
        "TopicArn": topic_arn,
        "Message": message,
        "Timestamp": "2024-05-01T12:00:00.000Z",
        "SignatureVersion": "1",
        "Signature": "EXAMPLE",
        "SigningCertURL": "http://localhost:4566/_aws/sns/SimpleNotificationService-0000.pem",
        "UnsubscribeURL": "http://localhost:4566/?Action=Unsubscribe"
    })
    .to_string()
}

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Poll `condition` for up to two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

/// Target for `SubscribeURL` that counts the GETs it receives.
#[derive(Clone, Default)]
pub struct ConfirmationTarget {
    pub hits: Arc<AtomicUsize>,
}

impl ConfirmationTarget {
    pub async fn spawn() -> (Self, String) {
        let target = Self::default();
        let router = Router::new()
            .route("/confirm", get(confirm))
            .with_state(target.clone());
        let base_url = spawn_server(router).await;
        (target, base_url)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn confirm(State(target): State<ConfirmationTarget>) -> &'static str {
    target.hits.fetch_add(1, Ordering::SeqCst);
    "<ConfirmSubscriptionResponse/>"
}

/// Control plane double that serves a fixed topic list and records every
/// subscribe call.
#[derive(Default)]
pub struct RecordingControlPlane {
    pub topics: Vec<String>,
    /// Topics whose subscription is rejected.
    pub failing: Vec<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingControlPlane {
    pub fn new(topics: &[&str], failing: &[&str]) -> Self {
        Self {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            failing: failing.iter().map(|t| t.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(topic_arn, endpoint)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControlPlane for RecordingControlPlane {
    async fn list_topics(&self) -> Vec<String> {
        self.topics.clone()
    }

    async fn subscribe(&self, topic_arn: &str, endpoint: &str) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .push((topic_arn.to_string(), endpoint.to_string()));
        if self.failing.iter().any(|t| t == topic_arn) {
            None
        } else {
            Some(format!("{}:sub-1", topic_arn))
        }
    }
}

/// HTTP endpoint that answers every request with a 500 and keeps the
/// `Authorization` header it was sent.
#[derive(Clone, Default)]
pub struct RejectingEndpoint {
    authorizations: Arc<Mutex<Vec<String>>>,
}

impl RejectingEndpoint {
    pub async fn spawn() -> (Self, SnsConfig) {
        let endpoint = Self::default();
        let router = Router::new()
            .fallback(reject)
            .with_state(endpoint.clone());
        let base_url = spawn_server(router).await;
        let config = SnsConfig {
            endpoint: base_url,
            max_attempts: 1,
            ..SnsConfig::default()
        };
        (endpoint, config)
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.authorizations.lock().unwrap().clone()
    }
}

async fn reject(State(endpoint): State<RejectingEndpoint>, headers: HeaderMap) -> StatusCode {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        endpoint.authorizations.lock().unwrap().push(auth.to_string());
    }
    StatusCode::INTERNAL_SERVER_ERROR
}
