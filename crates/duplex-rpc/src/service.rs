//! Dispatcher service - wires validator, invoker and correlator to a channel.
//!
//! `dispatch` spawns one listener task per dispatcher. The listener validates
//! each inbound event and either settles a pending call (response) or spawns
//! a handler task (request), so a slow method never holds up delivery of
//! other events.
//!
//! The listener is detached from the returned handle. It serves until the
//! receive source ends or [`Dispatcher::shutdown`] is called, so a side that
//! only answers may drop the handle right away.

use crate::binder::{self, Binding, OutboundPort};
use crate::correlator::{Correlator, PendingCall};
use crate::domain::config::{DispatchConfig, NotificationPolicy};
use crate::domain::pending::{PendingRequestStore, PendingStats};
use crate::error::{CallResult, DispatchError};
use crate::invoker::Invoker;
use crate::ports::channel::MessageReceiver;
use crate::ports::diagnostics::{DiagnosticKind, Diagnostics};
use crate::validator::{EnvelopeValidator, Verdict};
use duplex_types::{Envelope, RequestId};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Build a dispatcher and start listening on the configured receiver.
///
/// Must be called from within a Tokio runtime; the listener runs on it.
pub fn dispatch(config: DispatchConfig) -> Result<Dispatcher, DispatchError> {
    let resolved = config.resolve()?;
    let runtime = Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;

    let Binding {
        outbound,
        receiver,
        validator,
        namespace,
        request_timeout,
        notifications,
        diagnostics,
    } = binder::bind(resolved);

    let correlator = Arc::new(Correlator::new(outbound.clone(), request_timeout));
    let listener = Listener {
        receiver,
        validator,
        invoker: Invoker::new(namespace),
        correlator: correlator.clone(),
        outbound,
        notifications,
        diagnostics,
    };

    info!(
        origin = ?listener.validator.expected_origin(),
        source = ?listener.validator.expected_source().map(ToString::to_string),
        methods = listener.invoker.namespace().len(),
        "Dispatcher listening"
    );
    let handle = runtime.spawn(listener.run());

    Ok(Dispatcher {
        listener: Arc::new(ListenerControl {
            handle,
            pending: correlator.pending().clone(),
        }),
        correlator,
    })
}

/// Handle to a running dispatcher.
///
/// Cheap to clone. Dropping every clone leaves the listener running; calls
/// already in flight still settle when their responses arrive.
#[derive(Clone)]
pub struct Dispatcher {
    correlator: Arc<Correlator>,
    listener: Arc<ListenerControl>,
}

impl Dispatcher {
    /// Call a remote method with positional arguments.
    pub fn request(&self, method: &str, params: Vec<Value>) -> PendingCall {
        self.correlator.call(method, params)
    }

    /// Call a remote method with `params` sent exactly as given.
    pub fn request_with(&self, method: &str, params: Value) -> PendingCall {
        self.correlator.call_raw(method, params)
    }

    /// Fire-and-forget call. Nothing is registered and no response is awaited.
    pub fn notify(&self, method: &str, params: Vec<Value>) -> CallResult<()> {
        self.correlator.notify(method, params)
    }

    /// Cancel an outgoing call. Returns false if it already settled.
    pub fn cancel(&self, id: RequestId) -> bool {
        self.correlator.cancel(id)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlator.pending().pending_count()
    }

    #[must_use]
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.correlator.pending().is_pending(id)
    }

    #[must_use]
    pub fn stats(&self) -> &PendingStats {
        self.correlator.pending().stats()
    }

    /// Stop listening and fail every pending call with `ChannelClosed`.
    ///
    /// Handler tasks already running finish and still send their responses.
    pub fn shutdown(&self) {
        self.listener.stop();
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.listener.handle.is_finished()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("correlator", &self.correlator)
            .field("listening", &self.is_listening())
            .finish()
    }
}

/// Stops the listener on request. Dropping it detaches the task.
struct ListenerControl {
    handle: JoinHandle<()>,
    pending: Arc<PendingRequestStore>,
}

impl ListenerControl {
    fn stop(&self) {
        self.handle.abort();
        let rejected = self.pending.close_all();
        debug!(rejected = rejected, "Dispatcher stopped");
    }
}

/// The inbound side of one dispatcher.
struct Listener {
    receiver: Arc<dyn MessageReceiver>,
    validator: EnvelopeValidator,
    invoker: Invoker,
    correlator: Arc<Correlator>,
    outbound: OutboundPort,
    notifications: NotificationPolicy,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Listener {
    async fn run(self) {
        while let Some(event) = self.receiver.recv().await {
            match self.validator.validate(&event) {
                Verdict::Rejected(rejection) => {
                    self.diagnostics
                        .emit(rejection.severity(), rejection.kind(), &rejection.to_string());
                }
                Verdict::Request(request) => {
                    tokio::spawn(answer(
                        self.invoker.clone(),
                        self.outbound.clone(),
                        self.notifications,
                        self.diagnostics.clone(),
                        request,
                    ));
                }
                Verdict::Response(response) => {
                    if !self.correlator.accept_response(&response) {
                        let id = response
                            .id
                            .as_ref()
                            .map(Value::to_string)
                            .unwrap_or_else(|| "undefined".to_owned());
                        self.diagnostics.log(
                            DiagnosticKind::OrphanResponse,
                            &format!("Ignoring response with unknown id {id}."),
                        );
                    }
                }
            }
        }

        let rejected = self.correlator.pending().close_all();
        self.diagnostics.log(
            DiagnosticKind::ChannelClosed,
            &format!("Receive source ended; {rejected} pending request(s) rejected."),
        );
    }
}

/// Run one request and send its response.
async fn answer(
    invoker: Invoker,
    outbound: OutboundPort,
    notifications: NotificationPolicy,
    diagnostics: Arc<dyn Diagnostics>,
    request: Envelope,
) {
    let response = invoker.respond(&request).await;

    if request.id.is_none() && notifications == NotificationPolicy::Suppress {
        debug!(method = ?request.method, "Notification handled, response suppressed");
        return;
    }

    if let Err(error) = outbound.send(&response) {
        diagnostics.error(
            DiagnosticKind::ResponseSendFailed,
            &format!(
                "Failed to send response to {}: {error}",
                request.method.as_deref().unwrap_or_default()
            ),
        );
    }
}
