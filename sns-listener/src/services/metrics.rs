//! Prometheus metrics for sns-listener.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock, PoisonError};

pub static REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static NOTIFICATIONS_RECEIVED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static SUBSCRIPTION_CONFIRMATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static SUBSCRIPTIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Topic names come from unauthenticated request bodies, so the `topic`
/// label is capped. Names past the cap share [`OVERFLOW_TOPIC_LABEL`].
/// Counters are process-lifetime and are not reset by `/clear`.
pub const MAX_TOPIC_LABELS: usize = 100;
pub const OVERFLOW_TOPIC_LABEL: &str = "_other";
static TOPIC_LABELS: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Register collectors. Later calls are no-ops.
pub fn init_metrics() {
    if REGISTRY.get().is_some() {
        return;
    }

    let registry = Registry::new();

    let notifications = IntCounterVec::new(
        Opts::new(
            "sns_notifications_received_total",
            "Notifications stored, by topic name",
        ),
        &["topic"],
    )
    .expect("metric can be created");

    let confirmations = IntCounterVec::new(
        Opts::new(
            "sns_subscription_confirmations_total",
            "Subscription confirmation attempts, by outcome",
        ),
        &["status"],
    )
    .expect("metric can be created");

    let subscriptions = IntCounterVec::new(
        Opts::new(
            "sns_subscriptions_total",
            "Subscribe calls made on startup, by outcome",
        ),
        &["status"],
    )
    .expect("metric can be created");

    registry
        .register(Box::new(notifications.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(confirmations.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(subscriptions.clone()))
        .expect("collector can be registered");

    let _ = REGISTRY.set(registry);
    let _ = NOTIFICATIONS_RECEIVED_TOTAL.set(notifications);
    let _ = SUBSCRIPTION_CONFIRMATIONS_TOTAL.set(confirmations);
    let _ = SUBSCRIPTIONS_TOTAL.set(subscriptions);
}

/// Metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return "# Metrics registry not initialized\n".to_string();
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_notification(topic: &str) {
    if let Some(counter) = NOTIFICATIONS_RECEIVED_TOTAL.get() {
        let mut seen = TOPIC_LABELS
            .get_or_init(Default::default)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let label = bounded_label(&mut seen, topic, MAX_TOPIC_LABELS);
        counter.with_label_values(&[label]).inc();
    }
}

fn bounded_label<'a>(seen: &mut HashSet<String>, topic: &'a str, limit: usize) -> &'a str {
    if seen.contains(topic) {
        return topic;
    }
    if seen.len() < limit {
        seen.insert(topic.to_string());
        return topic;
    }
    OVERFLOW_TOPIC_LABEL
}

pub fn record_confirmation(status: &str) {
    if let Some(counter) = SUBSCRIPTION_CONFIRMATIONS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

pub fn record_subscription(status: &str) {
    if let Some(counter) = SUBSCRIPTIONS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}
