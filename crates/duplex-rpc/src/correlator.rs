//! Request correlator: outgoing calls and the responses that settle them.
//!
//! A call registers in the [`PendingRequestStore`] before its envelope is
//! posted, so a response can never arrive ahead of its registry entry.
//! Responses are matched by identifier only; arrival order is irrelevant.

use crate::binder::OutboundPort;
use crate::domain::pending::PendingRequestStore;
use crate::error::{CallError, CallResult};
use duplex_types::{Envelope, EnvelopeError, RequestId};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// An outgoing call awaiting its response.
///
/// Resolves to the remote `result`, or to [`CallError::Remote`] carrying the
/// remote `{name, message}` pair.
#[must_use = "a call does nothing useful unless its result is awaited"]
pub struct PendingCall {
    id: Option<RequestId>,
    response: BoxFuture<'static, CallResult<Value>>,
}

impl PendingCall {
    fn failed(id: Option<RequestId>, error: CallError) -> Self {
        Self {
            id,
            response: futures::future::ready(Err(error)).boxed(),
        }
    }

    /// Identifier on the wire. `None` if the call failed before one was
    /// allocated.
    #[must_use]
    pub fn id(&self) -> Option<RequestId> {
        self.id
    }
}

impl Future for PendingCall {
    type Output = CallResult<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.response.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Issues outgoing calls and settles them from incoming responses.
#[derive(Debug)]
pub struct Correlator {
    pending: Arc<PendingRequestStore>,
    outbound: OutboundPort,
    timeout: Option<Duration>,
}

impl Correlator {
    pub fn new(outbound: OutboundPort, timeout: Option<Duration>) -> Self {
        Self {
            pending: Arc::new(PendingRequestStore::new()),
            outbound,
            timeout,
        }
    }

    #[must_use]
    pub fn pending(&self) -> &Arc<PendingRequestStore> {
        &self.pending
    }

    /// Call `method` with positional arguments.
    pub fn call(&self, method: &str, params: Vec<Value>) -> PendingCall {
        self.call_raw(method, Value::Array(params))
    }

    /// Call `method` with `params` sent as given.
    ///
    /// A non-array value reaches the remote method as its single argument.
    pub fn call_raw(&self, method: &str, params: Value) -> PendingCall {
        if method.is_empty() {
            return PendingCall::failed(None, EnvelopeError::EmptyMethod.into());
        }

        let (id, mut rx) = self.pending.register(method);

        let sent = Envelope::request_raw(id, method, params)
            .map_err(CallError::from)
            .and_then(|envelope| self.outbound.send(&envelope));
        if let Err(error) = sent {
            self.pending.discard(id);
            debug!(id = %id, method = method, error = %error, "Request not sent");
            return PendingCall::failed(Some(id), error);
        }
        debug!(id = %id, method = method, "Request sent");

        let pending = self.pending.clone();
        let deadline = self.timeout.map(|after| (Instant::now() + after, after));

        let response = async move {
            let received = match deadline {
                None => (&mut rx).await,
                Some((deadline, after)) => match timeout_at(deadline, &mut rx).await {
                    Ok(received) => received,
                    Err(_) if pending.expire(id) => {
                        return Err(CallError::Timeout {
                            id,
                            after_ms: after.as_millis() as u64,
                        });
                    }
                    // Settled while the deadline fired; take that outcome
                    Err(_) => (&mut rx).await,
                },
            };
            // Sender gone without a value: the store was dropped
            received.unwrap_or(Err(CallError::ChannelClosed))
        };

        Self::pending_call(id, response)
    }

    fn pending_call<F>(id: RequestId, response: F) -> PendingCall
    where
        F: Future<Output = CallResult<Value>> + Send + 'static,
    {
        PendingCall {
            id: Some(id),
            response: response.boxed(),
        }
    }

    /// Send a notification: no `id`, nothing registered, no response awaited.
    pub fn notify(&self, method: &str, params: Vec<Value>) -> CallResult<()> {
        let envelope = Envelope::notification(method, params)?;
        self.outbound.send(&envelope)?;
        debug!(method = method, "Notification sent");
        Ok(())
    }

    /// Settle the pending call a response belongs to.
    ///
    /// Returns false for an orphan: an id that was never issued here, was
    /// already settled, or is not an identifier this side allocates.
    pub fn accept_response(&self, response: &Envelope) -> bool {
        let Some(id) = response.request_id() else {
            self.pending
                .stats()
                .total_orphaned
                .fetch_add(1, Ordering::Relaxed);
            debug!(id = ?response.id, "Response without a usable id");
            return false;
        };

        let outcome = match response.transferable_error() {
            Some(error) => Err(error),
            None => Ok(response.result.clone().unwrap_or(Value::Null)),
        };
        self.pending.complete(id, outcome)
    }

    /// Cancel one outgoing call. Its caller sees [`CallError::Cancelled`].
    pub fn cancel(&self, id: RequestId) -> bool {
        self.pending.cancel(id)
    }
}
