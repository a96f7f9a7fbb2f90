use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RelaySettings;

/// Activity body accepted by the overlay API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    pub created_at: String,
    pub data: ActivityData,
    pub flagged: bool,
    pub provider: String,
    pub is_mock: bool,
    #[serde(rename = "type")]
    pub activity_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    pub amount: f64,
    pub avatar: String,
    pub display_name: String,
    pub username: String,
    pub provider_id: String,
    pub gifted: bool,
    pub message: String,
}

impl ActivityPayload {
    /// Identity and amount fields are copied from `settings` only.
    pub fn new(settings: &RelaySettings, message: String, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            data: ActivityData {
                amount: settings.amount,
                avatar: settings.avatar_url.clone(),
                display_name: settings.display_name.clone(),
                username: settings.username.clone(),
                provider_id: settings.provider_id.clone(),
                gifted: false,
                message,
            },
            flagged: false,
            provider: settings.provider.clone(),
            is_mock: settings.is_mock,
            activity_type: settings.activity_type.clone(),
        }
    }
}
