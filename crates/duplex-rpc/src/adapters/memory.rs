//! In-memory channel.
//!
//! [`MemoryPort::pair`] returns two connected ports, each usable as both
//! target and receiver. Posting on one delivers to the other with the
//! sender's origin and endpoint id attached, the way a browser fills in
//! `MessageEvent.origin` and `MessageEvent.source`.

use crate::error::ChannelError;
use crate::ports::channel::{EndpointId, MessageEvent, MessageReceiver, MessageTarget};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::debug;

static NEXT_PORT: AtomicU64 = AtomicU64::new(1);

fn next_endpoint_id() -> EndpointId {
    EndpointId::new(format!("memory-port-{}", NEXT_PORT.fetch_add(1, Ordering::Relaxed)))
}

/// One end of an in-memory channel.
pub struct MemoryPort {
    local_id: EndpointId,
    local_origin: Option<String>,
    peer_id: EndpointId,
    peer_origin: Option<String>,
    /// Peer's inbox.
    outbox: mpsc::UnboundedSender<MessageEvent>,
    /// Own inbox, for `inject`.
    inbox_tx: mpsc::UnboundedSender<MessageEvent>,
    inbox: Mutex<mpsc::UnboundedReceiver<MessageEvent>>,
    /// Shared by both ports; `true` once either side closes.
    closed: Arc<watch::Sender<bool>>,
}

impl MemoryPort {
    /// Create a connected pair. `origin_a` is the origin of the first port's
    /// context, `origin_b` that of the second.
    #[must_use]
    pub fn pair(origin_a: Option<&str>, origin_b: Option<&str>) -> (MemoryPort, MemoryPort) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        let closed = Arc::new(closed);

        let a_id = next_endpoint_id();
        let b_id = next_endpoint_id();

        let a = MemoryPort {
            local_id: a_id.clone(),
            local_origin: origin_a.map(str::to_owned),
            peer_id: b_id.clone(),
            peer_origin: origin_b.map(str::to_owned),
            outbox: b_tx.clone(),
            inbox_tx: a_tx.clone(),
            inbox: Mutex::new(a_rx),
            closed: closed.clone(),
        };
        let b = MemoryPort {
            local_id: b_id,
            local_origin: origin_b.map(str::to_owned),
            peer_id: a_id,
            peer_origin: origin_a.map(str::to_owned),
            outbox: a_tx,
            inbox_tx: b_tx,
            inbox: Mutex::new(b_rx),
            closed,
        };
        (a, b)
    }

    /// Identity of this port's own context.
    #[must_use]
    pub fn local_id(&self) -> EndpointId {
        self.local_id.clone()
    }

    /// Deliver an arbitrary event to this port, as if the transport had.
    pub fn inject(&self, event: MessageEvent) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }
        self.inbox_tx.send(event).map_err(|_| ChannelError::Closed)
    }

    /// Close both directions. Pending and future `recv` calls return `None`.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl MessageTarget for MemoryPort {
    fn target_id(&self) -> EndpointId {
        self.peer_id.clone()
    }

    fn target_origin(&self) -> Option<String> {
        self.peer_origin.clone()
    }

    fn post_message(&self, message: Value, target_origin: Option<&str>) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }

        if let Some(expected) = target_origin {
            if self.peer_origin.as_deref() != Some(expected) {
                // Delivery refused, silently, like a browser does
                debug!(
                    target_origin = expected,
                    peer_origin = ?self.peer_origin,
                    "Message not delivered: origin mismatch"
                );
                return Ok(());
            }
        }

        let event = MessageEvent {
            data: Some(message),
            origin: self.local_origin.clone(),
            source: Some(self.local_id.clone()),
        };
        self.outbox.send(event).map_err(|_| ChannelError::Closed)
    }
}

#[async_trait]
impl MessageReceiver for MemoryPort {
    fn receiver_id(&self) -> EndpointId {
        self.local_id.clone()
    }

    async fn recv(&self) -> Option<MessageEvent> {
        let mut inbox = self.inbox.lock().await;
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return None;
        }

        loop {
            tokio::select! {
                event = inbox.recv() => return event,
                changed = closed.changed() => {
                    if changed.is_err() || *closed.borrow_and_update() {
                        return None;
                    }
                }
            }
        }
    }
}
