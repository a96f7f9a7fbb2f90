use std::{sync::Arc, time::Duration};

use anyhow::Result;
use sale_relay::{
    api::{AppState, router},
    clients::queue::QueueStore,
    config::{Config, IngestMode},
};
use tokio::{net::TcpListener, time::sleep};
use wiremock::MockServer;

pub const ACCOUNT_ID: &str = "acct-123";
pub const TOKEN: &str = "secret-token";
pub const QUEUE_KEY: &str = "sale_alert_queue";

pub fn test_config(sink_base_url: &str) -> Config {
    Config {
        kv_url: None,
        sale_queue_key: QUEUE_KEY.to_string(),
        ingest_mode: IngestMode::Queued,
        requeue_on_failure: false,
        se_account_id: Some(ACCOUNT_ID.to_string()),
        se_jwt_token: Some(TOKEN.to_string()),
        se_provider_id: Some("provider-9".to_string()),
        se_amount: Some("4.99".to_string()),
        se_display_name: Some("Merch Store".to_string()),
        se_username: Some("merchstore".to_string()),
        se_type: Some("tip".to_string()),
        se_api_base_url: sink_base_url.to_string(),
        se_avatar_url: "https://example.com/avatar.png".to_string(),
        se_provider: "twitch".to_string(),
        se_is_mock: true,
        sale_message_template: "Sale Detected!".to_string(),
        sink_timeout_seconds: 5,
        server_port: 0,
    }
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn spawn_app(config: Config, queue: Option<Arc<dyn QueueStore>>) -> Result<String> {
    let state = Arc::new(AppState::new(config, queue)?);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move { axum::serve(listener, router(state)).await });

    Ok(format!("http://{}", addr))
}

/// Polls the mock server until it has seen `count` requests or two seconds pass.
pub async fn wait_for_requests(server: &MockServer, count: usize) -> usize {
    for _ in 0..40 {
        let seen = server.received_requests().await.unwrap_or_default().len();
        if seen >= count {
            return seen;
        }
        sleep(Duration::from_millis(50)).await;
    }

    server.received_requests().await.unwrap_or_default().len()
}
