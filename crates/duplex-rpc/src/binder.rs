//! Channel binder: turns a resolved configuration into the pieces the
//! dispatcher runs on.
//!
//! The outbound send is captured once, when the dispatcher is built. The
//! call shape (with or without a target origin) is fixed at that point and
//! every later send goes through the same closure.

use crate::domain::config::{NotificationPolicy, ResolvedConfig};
use crate::domain::namespace::Namespace;
use crate::error::{CallError, ChannelError};
use crate::ports::channel::{EndpointId, MessageReceiver, MessageTarget};
use crate::ports::diagnostics::Diagnostics;
use crate::validator::EnvelopeValidator;
use duplex_types::Envelope;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type PostFn = dyn Fn(Value) -> Result<(), ChannelError> + Send + Sync;

/// The captured send primitive.
#[derive(Clone)]
pub struct OutboundPort {
    post: Arc<PostFn>,
    target_id: EndpointId,
    target_origin: Option<String>,
}

impl OutboundPort {
    /// Capture `target`'s send.
    ///
    /// With `Some(origin)` every post carries that origin so the transport
    /// refuses delivery to anyone else. With `None` posts omit it.
    pub fn capture(target: Arc<dyn MessageTarget>, origin: Option<String>) -> Self {
        let target_id = target.target_id();
        let post: Arc<PostFn> = match origin.clone() {
            Some(origin) => Arc::new(move |message: Value| target.post_message(message, Some(&origin))),
            None => Arc::new(move |message: Value| target.post_message(message, None)),
        };
        debug!(target = %target_id, origin = ?origin, "Captured outbound send");

        Self {
            post,
            target_id,
            target_origin: origin,
        }
    }

    #[must_use]
    pub fn target_id(&self) -> &EndpointId {
        &self.target_id
    }

    /// Origin every post is restricted to, if any.
    #[must_use]
    pub fn target_origin(&self) -> Option<&str> {
        self.target_origin.as_deref()
    }

    /// Encode and post one envelope.
    pub fn send(&self, envelope: &Envelope) -> Result<(), CallError> {
        let message = envelope.to_message()?;
        (self.post)(message).map_err(CallError::Send)
    }
}

impl fmt::Debug for OutboundPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundPort")
            .field("target_id", &self.target_id)
            .field("target_origin", &self.target_origin)
            .finish_non_exhaustive()
    }
}

/// Everything the dispatcher is assembled from.
pub(crate) struct Binding {
    pub outbound: OutboundPort,
    pub receiver: Arc<dyn MessageReceiver>,
    pub validator: EnvelopeValidator,
    pub namespace: Arc<Namespace>,
    pub request_timeout: Option<Duration>,
    pub notifications: NotificationPolicy,
    pub diagnostics: Arc<dyn Diagnostics>,
}

/// Bind a resolved configuration.
///
/// Inbound validation and outbound addressing use the same expected origin.
pub(crate) fn bind(config: ResolvedConfig) -> Binding {
    let outbound = OutboundPort::capture(config.target, config.expected_origin.clone());
    let validator = EnvelopeValidator::new(config.expected_origin, config.expected_source);

    Binding {
        outbound,
        receiver: config.receiver,
        validator,
        namespace: config.namespace,
        request_timeout: config.request_timeout,
        notifications: config.notifications,
        diagnostics: config.diagnostics,
    }
}
