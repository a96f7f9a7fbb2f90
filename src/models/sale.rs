use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RelayError;

/// A store webhook body. No schema is enforced beyond being a non-empty object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleEvent(Map<String, Value>);

impl SaleEvent {
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) if !fields.is_empty() => Ok(Self(fields)),
            _ => Err(RelayError::InvalidPayload),
        }
    }

    /// Decodes one queue entry written by [`SaleEvent::to_entry`].
    pub fn from_entry(entry: &str) -> Result<Self, RelayError> {
        serde_json::from_str(entry).map_err(RelayError::CorruptQueueEntry)
    }

    pub fn to_entry(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(|_| RelayError::InvalidPayload)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Looks up a dotted path such as `customer.first_name`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;

        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        Some(current)
    }
}

impl From<Map<String, Value>> for SaleEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
