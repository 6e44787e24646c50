//! Envelope validation for inbound channel events.
//!
//! Checks run in a fixed order so each failure gets its own diagnostic:
//!
//! 1. origin (when an expected origin is configured)
//! 2. sender (when an expected sender is configured)
//! 3. protocol tag (`jsonrpc` must be exactly `"2.0"`)
//!
//! A message that passes is a request when it has a non-empty `method`,
//! otherwise a response.

use crate::ports::channel::{EndpointId, MessageEvent};
use crate::ports::diagnostics::{DiagnosticKind, Severity};
use duplex_types::Envelope;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Why an event was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Event origin differs from the expected origin.
    OriginMismatch {
        expected: String,
        received: Option<String>,
    },
    /// Event source differs from the expected sender.
    SenderMismatch {
        expected: EndpointId,
        received: Option<EndpointId>,
    },
    /// Protocol tag missing or wrong.
    ProtocolMismatch { data: Option<Value> },
}

impl Rejection {
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Rejection::OriginMismatch { .. } => DiagnosticKind::OriginMismatch,
            Rejection::SenderMismatch { .. } => DiagnosticKind::SenderMismatch,
            Rejection::ProtocolMismatch { .. } => DiagnosticKind::ProtocolMismatch,
        }
    }

    /// Sender problems may mean spoofing: error. A bad tag from a legitimate
    /// sender means channel misuse: warning.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Rejection::OriginMismatch { .. } | Rejection::SenderMismatch { .. } => Severity::Error,
            Rejection::ProtocolMismatch { .. } => Severity::Warn,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OriginMismatch { expected, received } => write!(
                f,
                "Ignoring message from origin {} (expected {expected}).",
                received.as_deref().unwrap_or("<none>")
            ),
            Rejection::SenderMismatch { expected, received } => write!(
                f,
                "Ignoring message from source {} (expected {expected}).",
                received
                    .as_ref()
                    .map(EndpointId::as_str)
                    .unwrap_or("<none>")
            ),
            Rejection::ProtocolMismatch { data } => {
                let rendered = data
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_else(|| "undefined".to_owned());
                write!(f, "Ignoring non-jsonrpc message {rendered}.")
            }
        }
    }
}

/// Validation result for one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Request or notification for the local namespace.
    Request(Envelope),
    /// Response to one of our requests.
    Response(Envelope),
    /// Dropped.
    Rejected(Rejection),
}

/// Decides what an inbound event is.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeValidator {
    expected_origin: Option<String>,
    expected_source: Option<EndpointId>,
}

impl EnvelopeValidator {
    #[must_use]
    pub fn new(expected_origin: Option<String>, expected_source: Option<EndpointId>) -> Self {
        Self {
            expected_origin,
            expected_source,
        }
    }

    #[must_use]
    pub fn expected_origin(&self) -> Option<&str> {
        self.expected_origin.as_deref()
    }

    #[must_use]
    pub fn expected_source(&self) -> Option<&EndpointId> {
        self.expected_source.as_ref()
    }

    pub fn validate(&self, event: &MessageEvent) -> Verdict {
        if let Some(expected) = &self.expected_origin {
            if event.origin.as_deref() != Some(expected.as_str()) {
                return Verdict::Rejected(Rejection::OriginMismatch {
                    expected: expected.clone(),
                    received: event.origin.clone(),
                });
            }
        }

        if let Some(expected) = &self.expected_source {
            if event.source.as_ref() != Some(expected) {
                return Verdict::Rejected(Rejection::SenderMismatch {
                    expected: expected.clone(),
                    received: event.source.clone(),
                });
            }
        }

        let envelope = Envelope::from_message(event.data.as_ref());
        if !envelope.has_supported_version() {
            return Verdict::Rejected(Rejection::ProtocolMismatch {
                data: event.data.clone(),
            });
        }

        if envelope.method_name().is_some() {
            debug!(id = ?envelope.id, method = ?envelope.method, "Inbound request");
            Verdict::Request(envelope)
        } else {
            debug!(id = ?envelope.id, "Inbound response");
            Verdict::Response(envelope)
        }
    }
}
