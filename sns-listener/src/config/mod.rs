use clap::Parser;
use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    #[serde(default)]
    pub server: core_config::Config,
    #[serde(default)]
    pub sns: SnsConfig,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

/// Control-plane connection settings. The defaults target a local
/// LocalStack-style emulator and are not meant for real AWS accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct SnsConfig {
    #[serde(default = "default_sns_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_access_key_id")]
    pub access_key_id: String,
    #[serde(default = "default_secret_access_key")]
    pub secret_access_key: Secret<String>,
    /// Attempts per control-plane call, retries included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Run the one-shot auto-subscription task on startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Webhook URL advertised to SNS instead of the loopback default.
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
}

fn default_sns_endpoint() -> String {
    "http://localhost:4566".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_access_key_id() -> String {
    "test".to_string()
}

fn default_secret_access_key() -> Secret<String> {
    Secret::new("test".to_string())
}

fn default_max_attempts() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_startup_delay_ms() -> u64 {
    2000
}

impl Default for SnsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sns_endpoint(),
            region: default_region(),
            access_key_id: default_access_key_id(),
            secret_access_key: default_secret_access_key(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            public_url: None,
            startup_delay_ms: default_startup_delay_ms(),
        }
    }
}

impl SubscriptionConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

/// Command line flags. Anything given here wins over file and environment
/// configuration.
#[derive(Parser, Debug, Default)]
#[clap(name = "sns-listener", about = "SNS Listener", version)]
pub struct CliArgs {
    /// Port to run the server on [default: 8000]
    #[clap(long)]
    pub port: Option<u16>,

    /// Host to bind to [default: 0.0.0.0]
    #[clap(long)]
    pub host: Option<String>,

    /// Public URL for subscription (e.g., http://example.com:8000/webhook)
    #[clap(long)]
    pub public_url: Option<String>,
}

impl ListenerConfig {
    pub fn load() -> Result<Self, AppError> {
        core_config::load()
    }

    pub fn with_cli_overrides(mut self, args: CliArgs) -> Self {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(host) = args.host {
            self.server.host = host;
        }
        if args.public_url.is_some() {
            self.subscription.public_url = args.public_url;
        }
        self
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            server: core_config::Config::default(),
            sns: SnsConfig::default(),
            subscription: SubscriptionConfig::default(),
        }
    }
}
