use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{error::RelayError, models::activity::ActivityPayload};

/// Outbound adapter for the streaming-overlay activities API.
///
/// Failures are reported to the caller and never retried here.
#[derive(Clone)]
pub struct OverlayClient {
    http_client: Client,
    base_url: String,
}

impl OverlayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        info!(base_url, "Overlay client initialized");

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn activity_url(&self, account_id: &str) -> String {
        format!("{}/{}", self.base_url, account_id)
    }

    pub async fn send_activity(
        &self,
        account_id: &str,
        token: &str,
        payload: &ActivityPayload,
    ) -> Result<(), RelayError> {
        let url = self.activity_url(account_id);

        debug!(url = %url, activity_type = %payload.activity_type, "Sending overlay activity");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Overlay request failed");
                RelayError::DeliveryFailed {
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            info!(status = status.as_u16(), response = %body, "Overlay activity accepted");
            Ok(())
        } else {
            warn!(status = status.as_u16(), response = %body, "Overlay API rejected activity");
            Err(RelayError::DeliveryFailed {
                status: Some(status.as_u16()),
                message: format!("overlay API returned {}: {}", status, body),
            })
        }
    }
}
