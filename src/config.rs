use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::RelayError;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Append to the queue and let the worker relay later.
    #[default]
    Queued,
    /// Relay inside the request, without durability.
    Direct,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub kv_url: Option<String>,

    #[serde(default = "default_queue_key")]
    pub sale_queue_key: String,

    #[serde(default)]
    pub ingest_mode: IngestMode,

    #[serde(default)]
    pub requeue_on_failure: bool,

    pub se_account_id: Option<String>,
    pub se_jwt_token: Option<String>,
    pub se_provider_id: Option<String>,
    pub se_amount: Option<String>,
    pub se_display_name: Option<String>,
    pub se_username: Option<String>,
    pub se_type: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub se_api_base_url: String,

    #[serde(default = "default_avatar_url")]
    pub se_avatar_url: String,

    #[serde(default = "default_provider")]
    pub se_provider: String,

    #[serde(default = "default_is_mock")]
    pub se_is_mock: bool,

    #[serde(default = "default_message_template")]
    pub sale_message_template: String,

    #[serde(default = "default_sink_timeout_seconds")]
    pub sink_timeout_seconds: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_queue_key() -> String {
    "sale_alert_queue".to_string()
}

fn default_api_base_url() -> String {
    "https://api.streamelements.com/kappa/v2/activities".to_string()
}

fn default_avatar_url() -> String {
    "https://cdn.streamelements.com/assets/dashboard/my-overlays/overlay-default-preview-2.jpg"
        .to_string()
}

fn default_provider() -> String {
    "twitch".to_string()
}

fn default_is_mock() -> bool {
    true
}

pub fn default_message_template() -> String {
    "Sale Detected!".to_string()
}

fn default_sink_timeout_seconds() -> u64 {
    10
}

fn default_server_port() -> u16 {
    5000
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_secs(self.sink_timeout_seconds)
    }

    pub fn relay_settings(&self) -> Result<RelaySettings, RelayError> {
        RelaySettings::from_config(self)
    }
}

/// Trusted overlay fields. These never come from the inbound webhook.
#[derive(Clone, Debug, PartialEq)]
pub struct RelaySettings {
    pub account_id: String,
    pub jwt_token: String,
    pub provider_id: String,
    pub amount: f64,
    pub display_name: String,
    pub username: String,
    pub activity_type: String,
    pub avatar_url: String,
    pub provider: String,
    pub is_mock: bool,
    pub message_template: String,
}

impl RelaySettings {
    /// Reports every missing setting at once.
    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        let mut missing = Vec::new();

        let mut require = |name: &'static str, value: &Option<String>| -> String {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let account_id = require("SE_ACCOUNT_ID", &config.se_account_id);
        let jwt_token = require("SE_JWT_TOKEN", &config.se_jwt_token);
        let provider_id = require("SE_PROVIDER_ID", &config.se_provider_id);
        let amount_raw = require("SE_AMOUNT", &config.se_amount);
        let display_name = require("SE_DISPLAY_NAME", &config.se_display_name);
        let username = require("SE_USERNAME", &config.se_username);
        let activity_type = require("SE_TYPE", &config.se_type);

        let amount = if amount_raw.is_empty() {
            0.0
        } else {
            match amount_raw.parse::<f64>() {
                Ok(amount) if amount.is_finite() => amount,
                _ => {
                    missing.push("SE_AMOUNT");
                    0.0
                }
            }
        };

        if !missing.is_empty() {
            return Err(RelayError::ConfigIncomplete { missing });
        }

        Ok(Self {
            account_id,
            jwt_token,
            provider_id,
            amount,
            display_name,
            username,
            activity_type,
            avatar_url: config.se_avatar_url.clone(),
            provider: config.se_provider.clone(),
            is_mock: config.se_is_mock,
            message_template: config.sale_message_template.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> Config {
        Config {
            kv_url: None,
            sale_queue_key: default_queue_key(),
            ingest_mode: IngestMode::Queued,
            requeue_on_failure: false,
            se_account_id: Some("acct".to_string()),
            se_jwt_token: Some("token".to_string()),
            se_provider_id: Some("provider".to_string()),
            se_amount: Some("12.5".to_string()),
            se_display_name: Some("Shop".to_string()),
            se_username: Some("shop".to_string()),
            se_type: Some("tip".to_string()),
            se_api_base_url: default_api_base_url(),
            se_avatar_url: default_avatar_url(),
            se_provider: default_provider(),
            se_is_mock: default_is_mock(),
            sale_message_template: default_message_template(),
            sink_timeout_seconds: default_sink_timeout_seconds(),
            server_port: default_server_port(),
        }
    }

    #[test]
    fn complete_settings_are_accepted() {
        let settings = bare_config().relay_settings().unwrap();

        assert_eq!(settings.account_id, "acct");
        assert_eq!(settings.amount, 12.5);
        assert_eq!(settings.provider, "twitch");
        assert!(settings.is_mock);
    }

    #[test]
    fn empty_and_absent_values_are_both_missing() {
        let mut config = bare_config();
        config.se_jwt_token = None;
        config.se_username = Some("  ".to_string());

        match config.relay_settings() {
            Err(RelayError::ConfigIncomplete { missing }) => {
                assert_eq!(missing, vec!["SE_JWT_TOKEN", "SE_USERNAME"]);
            }
            other => panic!("expected ConfigIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let mut config = bare_config();
        config.se_amount = Some("ten".to_string());

        match config.relay_settings() {
            Err(RelayError::ConfigIncomplete { missing }) => assert_eq!(missing, vec!["SE_AMOUNT"]),
            other => panic!("expected ConfigIncomplete, got {:?}", other),
        }
    }
}
