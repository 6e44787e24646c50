//! Pending Request Store - correlates outgoing requests with their responses.
//!
//! Flow:
//! 1. Correlator calls `register()`: a fresh [`RequestId`] and a oneshot receiver
//! 2. Correlator sends the request envelope carrying that id
//! 3. Listener receives the response and calls `complete()`
//! 4. Caller awaits the receiver
//!
//! Entries are removed before they are acted on, so a duplicate or late
//! response for the same id finds nothing and is reported as an orphan.

use crate::error::CallError;
use dashmap::DashMap;
use duplex_types::{RequestId, TransferableError};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What a pending caller eventually receives.
pub type Completion = Result<Value, CallError>;

/// A request waiting for its response
struct PendingRequest {
    /// Channel to the waiting caller
    sender: oneshot::Sender<Completion>,
    /// When request was registered
    created_at: Instant,
    /// Method name (for logging)
    method: String,
}

/// Statistics for the pending request store
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests completed by a response
    pub total_completed: AtomicU64,
    /// Total responses that matched no pending request
    pub total_orphaned: AtomicU64,
    /// Total requests cancelled locally (or whose caller went away)
    pub total_cancelled: AtomicU64,
    /// Total requests that hit their timeout
    pub total_timeouts: AtomicU64,
    /// Total requests rejected because the channel closed
    pub total_closed: AtomicU64,
}

/// Registry of outstanding outgoing requests for one dispatcher.
pub struct PendingRequestStore {
    /// Map of request id to pending request
    pending: DashMap<RequestId, PendingRequest>,
    /// Last identifier handed out
    last_id: AtomicU64,
    /// Statistics
    stats: PendingStats,
}

impl PendingRequestStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            last_id: AtomicU64::new(0),
            stats: PendingStats::default(),
        }
    }

    /// Allocate the next identifier and register a pending request under it.
    ///
    /// Identifiers start at 1 and are never reused, even for requests that
    /// are later cancelled or time out.
    pub fn register(&self, method: &str) -> (RequestId, oneshot::Receiver<Completion>) {
        let id = RequestId::new(self.last_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (tx, rx) = oneshot::channel();

        self.pending.insert(
            id,
            PendingRequest {
                sender: tx,
                created_at: Instant::now(),
                method: method.to_string(),
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(id = %id, method = method, "Registered pending request");

        (id, rx)
    }

    /// Complete a pending request with the response outcome.
    ///
    /// Returns false when no request is pending under `id` (orphan).
    pub fn complete(&self, id: RequestId, result: Result<Value, TransferableError>) -> bool {
        let Some((_, pending)) = self.pending.remove(&id) else {
            self.stats.total_orphaned.fetch_add(1, Ordering::Relaxed);
            debug!(id = %id, "Response for unknown or already completed request");
            return false;
        };

        let response_time = pending.created_at.elapsed();
        match pending.sender.send(result.map_err(CallError::Remote)) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    id = %id,
                    method = pending.method,
                    response_time_ms = response_time.as_millis() as u64,
                    "Completed pending request"
                );
            }
            Err(_) => {
                // Caller dropped its future
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(id = %id, method = pending.method, "Pending request receiver dropped");
            }
        }
        true
    }

    /// Cancel a pending request; its caller sees [`CallError::Cancelled`].
    pub fn cancel(&self, id: RequestId) -> bool {
        match self.pending.remove(&id) {
            Some((_, pending)) => {
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                let _ = pending.sender.send(Err(CallError::Cancelled));
                debug!(id = %id, method = pending.method, "Cancelled pending request");
                true
            }
            None => false,
        }
    }

    /// Drop a pending request whose caller already gave up on it.
    pub fn expire(&self, id: RequestId) -> bool {
        match self.pending.remove(&id) {
            Some((_, pending)) => {
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                warn!(
                    id = %id,
                    method = pending.method,
                    elapsed_ms = pending.created_at.elapsed().as_millis() as u64,
                    "Pending request timed out"
                );
                true
            }
            None => false,
        }
    }

    /// Remove a request whose envelope never left (send failure).
    pub(crate) fn discard(&self, id: RequestId) {
        self.pending.remove(&id);
    }

    /// Reject every pending request with [`CallError::ChannelClosed`].
    ///
    /// Returns the number of requests rejected.
    pub fn close_all(&self) -> usize {
        let ids: Vec<RequestId> = self.pending.iter().map(|entry| *entry.key()).collect();
        let mut closed = 0;
        for id in ids {
            if let Some((_, pending)) = self.pending.remove(&id) {
                let _ = pending.sender.send(Err(CallError::ChannelClosed));
                closed += 1;
            }
        }
        if closed > 0 {
            self.stats
                .total_closed
                .fetch_add(closed as u64, Ordering::Relaxed);
            debug!(closed = closed, "Rejected pending requests on close");
        }
        closed
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a request is pending
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

impl fmt::Debug for PendingRequestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequestStore")
            .field("pending", &self.pending.len())
            .field("last_id", &self.last_id.load(Ordering::Relaxed))
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for PendingRequestStore {
    fn default() -> Self {
        Self::new()
    }
}
