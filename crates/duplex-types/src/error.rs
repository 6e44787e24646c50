//! Error types carried by (or raised while building) envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The reduced form of a failure that crosses the channel.
///
/// Only `name` and `message` survive. Stack traces, causes and any custom
/// fields of the original error are dropped before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferableError {
    /// Error class name, e.g. `"RangeError"`.
    #[serde(default)]
    pub name: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl TransferableError {
    /// Create a new transferable error.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Read the `error` member of a received response.
    ///
    /// Objects contribute their `name` and `message` members (non-string
    /// members are rendered as JSON text, missing ones become empty).
    /// Anything else is carried whole in `message` under the name `"Error"`.
    #[must_use]
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                name: map.get("name").map(text_of).unwrap_or_default(),
                message: map.get("message").map(text_of).unwrap_or_default(),
            },
            other => Self::new("Error", text_of(other)),
        }
    }

    /// Wire representation: `{ "name": .., "message": .. }`.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "message": self.message,
        })
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl fmt::Display for TransferableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.is_empty(), self.message.is_empty()) {
            (true, true) => f.write_str("Error"),
            (false, true) => f.write_str(&self.name),
            (true, false) => f.write_str(&self.message),
            (false, false) => write!(f, "{}: {}", self.name, self.message),
        }
    }
}

impl std::error::Error for TransferableError {}

/// Errors raised while building or encoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Outgoing requests need a method name.
    #[error("method name must not be empty")]
    EmptyMethod,

    /// Encoding to a channel message failed.
    #[error("envelope encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for envelope operations
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
