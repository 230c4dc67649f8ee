//! One-shot auto-subscription run at startup.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::sns_client::ControlPlane;

/// Webhook URL advertised to SNS: the configured public URL, or the
/// loopback address of the bound port.
pub fn webhook_endpoint(public_url: Option<&str>, port: u16) -> String {
    match public_url {
        Some(url) => url.to_string(),
        None => format!("http://localhost:{}/webhook", port),
    }
}

/// Subscribe `endpoint` to every topic, one after the other. A failed
/// topic does not stop the rest. Returns how many subscriptions succeeded.
pub async fn auto_subscribe(control_plane: &dyn ControlPlane, endpoint: &str) -> usize {
    let topics = control_plane.list_topics().await;
    tracing::info!(count = topics.len(), "Found topics");

    let mut subscribed = 0;
    for topic_arn in &topics {
        tracing::info!(topic_arn = %topic_arn, "Auto-subscribing to topic");
        if control_plane.subscribe(topic_arn, endpoint).await.is_some() {
            subscribed += 1;
        }
    }

    tracing::info!(
        subscribed,
        total = topics.len(),
        endpoint = %endpoint,
        "Auto-subscription finished"
    );
    subscribed
}

/// Run [`auto_subscribe`] on a background task after `delay`, giving the
/// HTTP server time to start accepting the confirmation requests.
pub fn spawn_auto_subscribe(
    control_plane: Arc<dyn ControlPlane>,
    endpoint: String,
    delay: Duration,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        tracing::info!(delay_ms = delay.as_millis() as u64, "Waiting for server to start before subscribing");
        tokio::time::sleep(delay).await;
        tracing::info!(endpoint = %endpoint, "Auto-subscribing to all topics");
        auto_subscribe(control_plane.as_ref(), &endpoint).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockControlPlane {
        topics: Vec<String>,
        failing: Vec<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockControlPlane {
        fn new(topics: &[&str], failing: &[&str]) -> Self {
            Self {
                topics: topics.iter().map(|t| t.to_string()).collect(),
                failing: failing.iter().map(|t| t.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ControlPlane for MockControlPlane {
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
                Some(format!("{}:sub", topic_arn))
            }
        }
    }

    #[test]
    fn endpoint_prefers_public_url() {
        assert_eq!(
            webhook_endpoint(Some("http://example.com:8000/webhook"), 8000),
            "http://example.com:8000/webhook"
        );
        assert_eq!(webhook_endpoint(None, 8123), "http://localhost:8123/webhook");
    }

    #[tokio::test]
    async fn subscribes_each_topic_in_order() {
        let mock = MockControlPlane::new(&["arn:a:orders", "arn:a:billing"], &[]);

        let subscribed = auto_subscribe(&mock, "http://localhost:8000/webhook").await;

        assert_eq!(subscribed, 2);
        assert_eq!(
            mock.calls(),
            vec![
                ("arn:a:orders".to_string(), "http://localhost:8000/webhook".to_string()),
                ("arn:a:billing".to_string(), "http://localhost:8000/webhook".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_topic_does_not_abort_the_rest() {
        let mock = MockControlPlane::new(&["arn:a:one", "arn:a:two", "arn:a:three"], &["arn:a:two"]);

        let subscribed = auto_subscribe(&mock, "http://localhost:8000/webhook").await;

        assert_eq!(subscribed, 2);
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn no_topics_means_no_subscribe_calls() {
        let mock = MockControlPlane::new(&[], &[]);
        assert_eq!(auto_subscribe(&mock, "http://localhost:8000/webhook").await, 0);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_waits_for_the_delay() {
        let mock = Arc::new(MockControlPlane::new(&["arn:a:orders"], &[]));

        let handle = spawn_auto_subscribe(
            mock.clone(),
            "http://localhost:8000/webhook".to_string(),
            Duration::from_secs(2),
        );

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(mock.calls().is_empty());

        assert_eq!(handle.await.unwrap(), 1);
        assert_eq!(mock.calls().len(), 1);
    }
}
