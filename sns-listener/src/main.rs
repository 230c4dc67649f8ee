use clap::Parser;
use service_core::observability::init_tracing;
use sns_listener::config::{CliArgs, ListenerConfig};
use sns_listener::services::{init_metrics, spawn_auto_subscribe, ControlPlane, SnsClient};
use sns_listener::startup::Application;
use std::sync::Arc;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = ListenerConfig::load()
        .map_err(|e| {
            eprintln!("Failed to read configuration: {}", e);
            anyhow::anyhow!("Configuration error: {}", e)
        })?
        .with_cli_overrides(args);

    init_tracing(
        "sns-listener",
        &config.server.log_level,
        config.server.otlp_endpoint.as_deref(),
    );

    init_metrics();

    let app = Application::build(config.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start sns-listener: {}", e))?;

    if config.subscription.enabled {
        let control_plane: Arc<dyn ControlPlane> = Arc::new(SnsClient::new(&config.sns));
        spawn_auto_subscribe(
            control_plane,
            app.webhook_url().to_string(),
            config.subscription.startup_delay(),
        );
    } else {
        tracing::info!("Auto-subscription disabled");
    }

    tracing::info!("{}", "=".repeat(70));
    tracing::info!("SNS Listener starting on http://{}:{}", config.server.host, app.port());
    tracing::info!("Web interface: http://localhost:{}", app.port());
    tracing::info!("Webhook endpoint: http://localhost:{}/webhook", app.port());
    tracing::info!("Advertised webhook URL: {}", app.webhook_url());
    tracing::info!("SNS control plane: {}", config.sns.endpoint);
    tracing::info!("{}", "=".repeat(70));

    app.run_until_stopped(shutdown_signal()).await?;

    Ok(())
}
