//! Error types for the dispatcher.
//!
//! Three audiences, three types:
//!
//! - [`ChannelError`]: the transport refused or failed a send.
//! - [`CallError`]: what an outgoing call can end in. Remote failures arrive
//!   as [`CallError::Remote`] carrying exactly the `{name, message}` pair the
//!   other side sent.
//! - [`MethodError`]: what a local namespace method fails with. It is reduced
//!   to a [`TransferableError`] before it crosses the channel.

use crate::domain::config::ConfigError;
use duplex_types::{EnvelopeError, RequestId, TransferableError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel has been closed.
    #[error("channel closed")]
    Closed,

    /// The transport rejected the message.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// How an outgoing call can fail.
#[derive(Debug, Error)]
pub enum CallError {
    /// The remote method failed (or did not exist).
    #[error("remote error: {0}")]
    Remote(TransferableError),

    /// The request envelope could not be built.
    #[error("invalid request: {0}")]
    Envelope(#[from] EnvelopeError),

    /// The request could not be sent.
    #[error("request not sent: {0}")]
    Send(ChannelError),

    /// No response arrived within the configured timeout.
    #[error("request {id} timed out after {after_ms}ms")]
    Timeout { id: RequestId, after_ms: u64 },

    /// The pending request was cancelled locally.
    #[error("request cancelled")]
    Cancelled,

    /// The dispatcher stopped listening before a response arrived.
    #[error("channel closed before a response arrived")]
    ChannelClosed,
}

impl CallError {
    /// The remote `{name, message}` pair, if this is a remote failure.
    #[must_use]
    pub fn remote(&self) -> Option<&TransferableError> {
        match self {
            CallError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised while constructing a dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `dispatch` was called outside a Tokio runtime.
    #[error("no tokio runtime available to host the listener")]
    NoRuntime,
}

/// Failure of a local namespace method.
///
/// Only `name` and `message` ever leave the process. `source` keeps the
/// underlying error for local logging.
#[derive(Clone)]
pub struct MethodError {
    pub name: String,
    pub message: String,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl MethodError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an arbitrary error. The name is the error's type name without
    /// its module path or generic parameters.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            name: short_type_name::<E>().to_owned(),
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    /// Argument of the wrong shape.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    /// Argument outside the accepted range.
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new("RangeError", message)
    }

    /// Lookup failure for a method absent from the namespace.
    pub(crate) fn not_found() -> Self {
        Self::new("MethodNotFound", "")
    }

    /// The underlying error, when built with [`MethodError::from_error`].
    #[must_use]
    pub fn source_error(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        self.source.as_deref()
    }

    /// Drop everything but `{name, message}`.
    #[must_use]
    pub fn reduce(&self) -> TransferableError {
        TransferableError::new(self.name.clone(), self.message.clone())
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl fmt::Debug for MethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodError")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl fmt::Display for MethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.reduce(), f)
    }
}

impl std::error::Error for MethodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_json::Error> for MethodError {
    fn from(e: serde_json::Error) -> Self {
        Self::type_error(e.to_string())
    }
}

impl From<TransferableError> for MethodError {
    fn from(e: TransferableError) -> Self {
        Self::new(e.name, e.message)
    }
}

/// Result type for outgoing calls
pub type CallResult<T> = Result<T, CallError>;
