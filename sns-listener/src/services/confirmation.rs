use reqwest::Client;

use super::metrics::record_confirmation;

/// Complete the SNS subscription handshake by fetching `subscribe_url`.
///
/// Runs once; the outcome is only logged.
#[tracing::instrument(skip(client))]
pub async fn confirm_subscription(client: Client, subscribe_url: String) -> bool {
    tracing::info!("Confirming subscription");

    let result = match client.get(&subscribe_url).send().await {
        Ok(response) => response.error_for_status().map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            record_confirmation("success");
            tracing::info!("Subscription confirmed");
            true
        }
        Err(e) => {
            record_confirmation("failure");
            tracing::error!(error = %e, "Failed to confirm subscription");
            false
        }
    }
}

/// Fire-and-forget variant used by the webhook handler.
pub fn spawn_confirmation(client: Client, subscribe_url: String) {
    tokio::spawn(confirm_subscription(client, subscribe_url));
}
