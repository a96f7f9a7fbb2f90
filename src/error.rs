use axum::http::StatusCode;
use thiserror::Error;

use crate::clients::queue::QueueError;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound body was empty, not JSON, or not a non-empty object.
    #[error("no data received")]
    InvalidPayload,

    /// No queue store was established at startup.
    #[error("queue store not connected")]
    BackendUnavailable,

    #[error("failed to append to queue: {0}")]
    QueueWrite(#[source] QueueError),

    #[error("failed to read from queue: {0}")]
    QueueRead(#[source] QueueError),

    #[error("missing or invalid settings: {}", .missing.join(", "))]
    ConfigIncomplete { missing: Vec<&'static str> },

    /// A stored entry did not decode back into a sale.
    #[error("corrupt queue entry: {0}")]
    CorruptQueueEntry(#[source] serde_json::Error),

    #[error("delivery failed: {message}")]
    DeliveryFailed {
        status: Option<u16>,
        message: String,
    },
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidPayload => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
