use std::sync::Arc;

use anyhow::{Error, Result};
use sale_relay::{
    api::run_api_server,
    clients::{queue::QueueStore, redis::RedisQueue},
    config::{Config, IngestMode},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load()?;

    let queue: Option<Arc<dyn QueueStore>> = match config.kv_url.as_deref() {
        Some(url) if !url.is_empty() => match RedisQueue::connect(url).await {
            Ok(queue) => Some(Arc::new(queue) as Arc<dyn QueueStore>),
            Err(e) => {
                error!(error = %e, "Could not connect to queue store");
                None
            }
        },
        _ => {
            error!("KV_URL is not set, queue store disabled");
            None
        }
    };

    if queue.is_none() && config.ingest_mode == IngestMode::Queued {
        warn!("Serving without a queue store; ingestion will answer 500 until restarted");
    }

    if let Err(e) = config.relay_settings() {
        warn!(error = %e, "Relay settings incomplete; queue processing will fail");
    }

    info!(mode = ?config.ingest_mode, "Configuration loaded");

    run_api_server(config, queue).await
}
