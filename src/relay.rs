//! Queue draining and relay to the overlay API.
//!
//! Delivery is at-most-once: an entry is gone from the queue as soon as it is
//! popped, and a failed delivery loses it unless requeueing is switched on.

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::{
    clients::{overlay::OverlayClient, queue::QueueStore},
    config::{Config, RelaySettings, default_message_template},
    error::RelayError,
    models::{activity::ActivityPayload, sale::SaleEvent, template::render_message},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Nothing was queued. This is the steady state between sales.
    QueueEmpty,
    Delivered,
}

/// Pops at most one entry and relays it.
///
/// Settings are validated before the queue is touched.
#[instrument(name = "process_queue", skip_all, fields(queue_key = %config.sale_queue_key))]
pub async fn process_next(
    store: &dyn QueueStore,
    overlay: &OverlayClient,
    config: &Config,
) -> Result<ProcessOutcome, RelayError> {
    let settings = config.relay_settings().inspect_err(|e| {
        error!(error = %e, "Relay configuration incomplete");
    })?;

    let entry = store
        .pop_front(&config.sale_queue_key)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to read from queue");
            RelayError::QueueRead(e)
        })?;

    let Some(entry) = entry else {
        info!("Queue is empty. Nothing to process.");
        return Ok(ProcessOutcome::QueueEmpty);
    };

    let event = SaleEvent::from_entry(&entry).inspect_err(|e| {
        error!(error = %e, entry = %entry, "Dropping unreadable queue entry");
    })?;

    info!(fields = event.fields().len(), "Processing sale from queue");

    match relay_event(&event, overlay, &settings).await {
        Ok(()) => Ok(ProcessOutcome::Delivered),
        Err(e) => {
            if config.requeue_on_failure {
                restore(store, &config.sale_queue_key, &entry).await;
            } else {
                warn!(error = %e, "Sale notification lost after failed delivery");
            }
            Err(e)
        }
    }
}

/// Builds the activity for one sale and sends it.
pub async fn relay_event(
    event: &SaleEvent,
    overlay: &OverlayClient,
    settings: &RelaySettings,
) -> Result<(), RelayError> {
    let message = render_message(&settings.message_template, event).unwrap_or_else(|e| {
        warn!(error = %e, "Message template could not be rendered, using default");
        default_message_template()
    });

    let payload = ActivityPayload::new(settings, message, Utc::now());

    overlay
        .send_activity(&settings.account_id, &settings.jwt_token, &payload)
        .await
}

async fn restore(store: &dyn QueueStore, key: &str, entry: &str) {
    match store.append(key, entry).await {
        Ok(depth) => info!(depth, "Failed sale returned to queue"),
        Err(e) => error!(error = %e, "Failed to return sale to queue, it is lost"),
    }
}
