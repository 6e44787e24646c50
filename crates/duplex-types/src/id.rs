//! Request identifier for request/response correlation.
//!
//! Identifiers are plain integers handed out by one dispatcher instance.
//! They are only meaningful to the instance that allocated them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of one outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw integer.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Read an identifier off the wire.
    ///
    /// Only non-negative integers are identifiers we could have issued;
    /// strings, floats and negative numbers yield `None`.
    #[must_use]
    pub fn from_wire(value: &Value) -> Option<Self> {
        value.as_u64().map(Self)
    }

    /// Wire representation.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        Value::from(self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<RequestId> for u64 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}
