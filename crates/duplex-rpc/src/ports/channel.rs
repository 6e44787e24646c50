//! Channel ports: the send primitive and the receive-event source.
//!
//! The dispatcher never owns a channel. The host supplies a [`MessageTarget`]
//! to post to and a [`MessageReceiver`] to listen on; one object may play
//! both roles.

use crate::error::ChannelError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Identity of one end of a channel, used for sender checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointId(Arc<str>);

impl EndpointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One delivered channel message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// The structured message. `None` when the channel delivered nothing.
    pub data: Option<Value>,
    /// Origin of the sending context, as reported by the transport.
    pub origin: Option<String>,
    /// Handle of the sending endpoint, as reported by the transport.
    pub source: Option<EndpointId>,
}

impl MessageEvent {
    /// An event carrying `data` with no origin or source information.
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self {
            data: Some(data),
            origin: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: EndpointId) -> Self {
        self.source = Some(source);
        self
    }
}

/// The remote endpoint handle we post to.
pub trait MessageTarget: Send + Sync {
    /// Identity of the remote context this handle refers to. Events it sends
    /// to us carry this as their `source`.
    fn target_id(&self) -> EndpointId;

    /// Origin the remote context declares, if the transport knows it.
    fn target_origin(&self) -> Option<String>;

    /// Post a message.
    ///
    /// With `Some(origin)` the transport must refuse to deliver unless the
    /// recipient's origin equals `origin`. With `None` no restriction applies.
    fn post_message(&self, message: Value, target_origin: Option<&str>) -> Result<(), ChannelError>;
}

/// The local event source we listen on.
#[async_trait]
pub trait MessageReceiver: Send + Sync {
    /// Identity of the local context.
    fn receiver_id(&self) -> EndpointId;

    /// Next delivered event. `None` once the channel is closed.
    async fn recv(&self) -> Option<MessageEvent>;
}
