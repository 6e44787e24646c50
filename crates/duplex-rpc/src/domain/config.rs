//! Dispatcher configuration with validation.
//!
//! Two layers:
//!
//! - [`DispatchOptions`]: plain data, deserializable, validated by
//!   [`DispatchOptions::validate`].
//! - [`DispatchConfig`]: the builder handed to `dispatch`, holding the
//!   channel endpoints, the namespace and the diagnostic sinks on top of the
//!   options.

use crate::adapters::diagnostics::TracingDiagnostics;
use crate::domain::namespace::Namespace;
use crate::ports::channel::{EndpointId, MessageReceiver, MessageTarget};
use crate::ports::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Whether responses to `id`-less requests are transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPolicy {
    /// Send the computed response (its `id` member is omitted).
    #[default]
    Respond,
    /// Run the method, send nothing.
    Suppress,
}

/// Serializable dispatcher options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Expected origin of the remote side. Inbound events from any other
    /// origin are dropped and outbound posts are restricted to it.
    pub origin: Option<String>,
    /// Reject outgoing calls that have no response after this long.
    /// `None` waits forever.
    pub request_timeout_ms: Option<u64>,
    /// Response policy for notifications
    pub notifications: NotificationPolicy,
}

impl DispatchOptions {
    /// Validate options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(origin) = &self.origin {
            if origin.is_empty() {
                return Err(ConfigError::EmptyOrigin);
            }
            if origin == "*" {
                return Err(ConfigError::WildcardOrigin);
            }
        }

        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("expected origin cannot be empty")]
    EmptyOrigin,
    #[error("expected origin cannot be the wildcard \"*\"")]
    WildcardOrigin,
    #[error("request timeout cannot be 0")]
    ZeroTimeout,
}

/// Everything `dispatch` needs.
///
/// ```ignore
/// let (left, right) = MemoryPort::pair(None, None);
/// let config = DispatchConfig::new(Arc::new(left))
///     .namespace(Namespace::new().with_sync("ping", |_| Ok(json!("pong"))))
///     .request_timeout(Duration::from_secs(5));
/// let dispatcher = dispatch(config)?;
/// ```
pub struct DispatchConfig {
    target: Arc<dyn MessageTarget>,
    receiver: Arc<dyn MessageReceiver>,
    split: bool,
    namespace: Namespace,
    options: DispatchOptions,
    diagnostics: Arc<dyn Diagnostics>,
}

impl DispatchConfig {
    /// One endpoint is both the send target and the event source.
    pub fn new<E>(endpoint: Arc<E>) -> Self
    where
        E: MessageTarget + MessageReceiver + 'static,
    {
        let target: Arc<dyn MessageTarget> = endpoint.clone();
        let receiver: Arc<dyn MessageReceiver> = endpoint;
        Self::with_endpoints(target, receiver, false)
    }

    /// Distinct target and receiver.
    ///
    /// Inbound events must then come from the target (sender check), and the
    /// expected origin defaults to the target's declared origin.
    pub fn split(target: Arc<dyn MessageTarget>, receiver: Arc<dyn MessageReceiver>) -> Self {
        Self::with_endpoints(target, receiver, true)
    }

    fn with_endpoints(
        target: Arc<dyn MessageTarget>,
        receiver: Arc<dyn MessageReceiver>,
        split: bool,
    ) -> Self {
        Self {
            target,
            receiver,
            split,
            namespace: Namespace::new(),
            options: DispatchOptions::default(),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Methods the remote side may call. Defaults to an empty namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.options.origin = Some(origin.into());
        self
    }

    /// Sub-millisecond timeouts round up to 1 ms.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        let millis = if timeout.is_zero() {
            0
        } else {
            u64::try_from(timeout.as_millis().max(1)).unwrap_or(u64::MAX)
        };
        self.options.request_timeout_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn notifications(mut self, policy: NotificationPolicy) -> Self {
        self.options.notifications = policy;
        self
    }

    /// Diagnostic sinks. Defaults to [`TracingDiagnostics`].
    #[must_use]
    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Apply defaulting rules and validate.
    pub(crate) fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        self.options.validate()?;

        let expected_origin = self.options.origin.clone().or_else(|| {
            if self.split {
                self.target.target_origin().filter(|o| !o.is_empty() && o != "*")
            } else {
                None
            }
        });
        let expected_source = self.split.then(|| self.target.target_id());

        Ok(ResolvedConfig {
            target: self.target,
            receiver: self.receiver,
            namespace: Arc::new(self.namespace),
            expected_origin,
            expected_source,
            request_timeout: self.options.request_timeout(),
            notifications: self.options.notifications,
            diagnostics: self.diagnostics,
        })
    }
}

impl fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchConfig")
            .field("target", &self.target.target_id())
            .field("receiver", &self.receiver.receiver_id())
            .field("split", &self.split)
            .field("namespace", &self.namespace)
            .field("options", &self.options)
            .finish()
    }
}

/// Configuration after defaulting, consumed by the binder.
pub(crate) struct ResolvedConfig {
    pub target: Arc<dyn MessageTarget>,
    pub receiver: Arc<dyn MessageReceiver>,
    pub namespace: Arc<Namespace>,
    pub expected_origin: Option<String>,
    pub expected_source: Option<EndpointId>,
    pub request_timeout: Option<Duration>,
    pub notifications: NotificationPolicy,
    pub diagnostics: Arc<dyn Diagnostics>,
}
