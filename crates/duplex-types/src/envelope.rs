//! # Envelope
//!
//! The unit of exchange on a Duplex channel.
//!
//! Inbound messages are parsed leniently with [`Envelope::from_message`]: a
//! missing or non-object message yields an envelope whose fields are all
//! `None`, so validation can reject it without special cases. Outbound
//! envelopes are built through the typed constructors and encoded with
//! [`Envelope::to_message`].

use crate::error::{EnvelopeError, EnvelopeResult, TransferableError};
use crate::id::RequestId;
use crate::JSONRPC_VERSION;
use serde::Serialize;
use serde_json::{Map, Value};

/// What an envelope claims to be, judged by its members alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Has a method and an id; the sender expects a response.
    Request,
    /// Has a method but no id.
    Notification,
    /// No method; correlated by id.
    Response,
}

/// A JSON-RPC 2.0 shaped message.
///
/// `result: Some(Value::Null)` and `result: None` are different: the former
/// was sent as `"result": null`, the latter was not sent at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<Value>,
}

impl Envelope {
    /// Parse a received channel message.
    ///
    /// Never fails. Members of the wrong type are treated as absent, except
    /// `id`, `params`, `result`, `error` and `jsonrpc` which are kept verbatim
    /// (a null `id` counts as absent). `method` must be a string.
    #[must_use]
    pub fn from_message(message: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = message else {
            return Self::default();
        };

        Self {
            id: map.get("id").filter(|v| !v.is_null()).cloned(),
            method: map
                .get("method")
                .and_then(Value::as_str)
                .map(str::to_owned),
            params: map.get("params").cloned(),
            result: map.get("result").cloned(),
            error: map.get("error").cloned(),
            jsonrpc: map.get("jsonrpc").cloned(),
        }
    }

    /// Build a request expecting a response.
    pub fn request(id: RequestId, method: &str, params: Vec<Value>) -> EnvelopeResult<Self> {
        Self::request_raw(id, method, Value::Array(params))
    }

    /// Build a request whose `params` is sent as given (array or single value).
    pub fn request_raw(id: RequestId, method: &str, params: Value) -> EnvelopeResult<Self> {
        let mut envelope = Self::notification_raw(method, params)?;
        envelope.id = Some(id.to_wire());
        Ok(envelope)
    }

    /// Build a notification (no `id`, no response expected).
    pub fn notification(method: &str, params: Vec<Value>) -> EnvelopeResult<Self> {
        Self::notification_raw(method, Value::Array(params))
    }

    /// Build a notification whose `params` is sent as given.
    pub fn notification_raw(method: &str, params: Value) -> EnvelopeResult<Self> {
        if method.is_empty() {
            return Err(EnvelopeError::EmptyMethod);
        }
        Ok(Self {
            method: Some(method.to_owned()),
            params: Some(params),
            jsonrpc: Some(Value::from(JSONRPC_VERSION)),
            ..Self::default()
        })
    }

    /// Build a successful response. `id` is echoed from the request.
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            jsonrpc: Some(Value::from(JSONRPC_VERSION)),
            ..Self::default()
        }
    }

    /// Build a failed response. `id` is echoed from the request.
    #[must_use]
    pub fn failure(id: Option<Value>, error: &TransferableError) -> Self {
        Self {
            id,
            error: Some(error.to_wire()),
            jsonrpc: Some(Value::from(JSONRPC_VERSION)),
            ..Self::default()
        }
    }

    /// Encode as a channel message.
    pub fn to_message(&self) -> EnvelopeResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// True when `jsonrpc` is exactly the string `"2.0"`.
    #[must_use]
    pub fn has_supported_version(&self) -> bool {
        matches!(&self.jsonrpc, Some(Value::String(tag)) if tag == JSONRPC_VERSION)
    }

    /// Non-empty method name, if any.
    #[must_use]
    pub fn method_name(&self) -> Option<&str> {
        self.method.as_deref().filter(|m| !m.is_empty())
    }

    #[must_use]
    pub fn kind(&self) -> EnvelopeKind {
        match (self.method_name(), &self.id) {
            (Some(_), Some(_)) => EnvelopeKind::Request,
            (Some(_), None) => EnvelopeKind::Notification,
            (None, _) => EnvelopeKind::Response,
        }
    }

    /// Identifier as one we could have issued.
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        self.id.as_ref().and_then(RequestId::from_wire)
    }

    /// Positional arguments of a request (see [`normalize_params`]).
    #[must_use]
    pub fn arguments(&self) -> Vec<Value> {
        normalize_params(self.params.clone())
    }

    /// The error member of a response, if one was sent and is not null.
    #[must_use]
    pub fn transferable_error(&self) -> Option<TransferableError> {
        self.error
            .as_ref()
            .filter(|e| !e.is_null())
            .map(TransferableError::from_wire)
    }
}

impl From<Envelope> for Value {
    fn from(envelope: Envelope) -> Self {
        let mut map = Map::new();
        let fields = [
            ("id", envelope.id),
            ("method", envelope.method.map(Value::String)),
            ("params", envelope.params),
            ("result", envelope.result),
            ("error", envelope.error),
            ("jsonrpc", envelope.jsonrpc),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(key.to_owned(), value);
            }
        }
        Value::Object(map)
    }
}

/// Normalize `params` into a positional argument list.
///
/// An array passes through unchanged. Any other value, including an absent
/// `params` (taken as `null`), becomes a one-element list.
#[must_use]
pub fn normalize_params(params: Option<Value>) -> Vec<Value> {
    match params {
        Some(Value::Array(args)) => args,
        Some(single) => vec![single],
        None => vec![Value::Null],
    }
}
