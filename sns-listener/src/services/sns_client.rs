use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_sns::{
    config::{retry::RetryConfig, Credentials, IdentityCache, SharedCredentialsProvider},
    error::DisplayErrorContext,
    Client,
};
use secrecy::ExposeSecret;
use thiserror::Error;

use super::metrics::record_subscription;
use crate::config::SnsConfig;

/// Delivery protocol used for every subscription this service creates.
pub const DELIVERY_PROTOCOL: &str = "http";

#[derive(Debug, Error)]
pub enum SnsError {
    #[error("Failed to list topics: {0}")]
    ListTopics(String),

    #[error("Failed to subscribe: {0}")]
    Subscribe(String),
}

/// Administrative side of the messaging service.
///
/// Both operations swallow failures: they are logged and reported as an
/// empty list or `None`.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Every topic ARN known to the service, in service order.
    async fn list_topics(&self) -> Vec<String>;

    /// Subscribe `endpoint` to `topic_arn` over HTTP. Returns the
    /// subscription ARN acknowledged by the service.
    async fn subscribe(&self, topic_arn: &str, endpoint: &str) -> Option<String>;
}

/// SNS client bound to a fixed endpoint, region and static credentials.
#[derive(Clone)]
pub struct SnsClient {
    client: Client,
    endpoint: String,
}

impl SnsClient {
    pub fn new(config: &SnsConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.expose_secret().clone(),
            None,
            None,
            "sns-listener-config",
        );

        let sns_config = aws_sdk_sns::Config::builder()
            .region(Region::new(config.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .identity_cache(IdentityCache::no_cache())
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts.max(1)))
            .endpoint_url(&config.endpoint)
            .build();

        tracing::info!(
            endpoint = %config.endpoint,
            region = %config.region,
            "SNS client initialized"
        );

        Self {
            client: Client::from_conf(sns_config),
            endpoint: config.endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch all topic ARNs across every `ListTopics` page.
    pub async fn try_list_topics(&self) -> Result<Vec<String>, SnsError> {
        let mut pages = self.client.list_topics().into_paginator().send();
        let mut topics = Vec::new();

        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|e| SnsError::ListTopics(DisplayErrorContext(&e).to_string()))?;
            topics.extend(
                page.topics()
                    .iter()
                    .filter_map(|topic| topic.topic_arn().map(str::to_string)),
            );
        }

        Ok(topics)
    }

    pub async fn try_subscribe(&self, topic_arn: &str, endpoint: &str) -> Result<String, SnsError> {
        let output = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(DELIVERY_PROTOCOL)
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|e| SnsError::Subscribe(DisplayErrorContext(&e).to_string()))?;

        Ok(output.subscription_arn().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl ControlPlane for SnsClient {
    async fn list_topics(&self) -> Vec<String> {
        match self.try_list_topics().await {
            Ok(topics) => topics,
            Err(e) => {
                tracing::error!(error = %e, endpoint = %self.endpoint, "Failed to list topics");
                Vec::new()
            }
        }
    }

    async fn subscribe(&self, topic_arn: &str, endpoint: &str) -> Option<String> {
        match self.try_subscribe(topic_arn, endpoint).await {
            Ok(subscription_arn) => {
                record_subscription("success");
                tracing::info!(
                    topic_arn = %topic_arn,
                    subscription_arn = %subscription_arn,
                    "Subscribed to topic"
                );
                Some(subscription_arn)
            }
            Err(e) => {
                record_subscription("failure");
                tracing::error!(topic_arn = %topic_arn, error = %e, "Failed to subscribe to topic");
                None
            }
        }
    }
}
