use serde::{Deserialize, Serialize};

/// Acknowledgment body returned to the webhook sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookResponse {
    pub status: String,
    pub message: String,
}

impl WebhookResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}
