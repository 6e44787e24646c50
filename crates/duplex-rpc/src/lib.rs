//! Duplex RPC - bidirectional JSON-RPC 2.0 over a message-passing channel.
//!
//! Each side of a channel runs one dispatcher. A dispatcher answers calls
//! into its local [`Namespace`] and issues calls into the remote one, over
//! the same channel, at the same time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Dispatcher                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  request / notify                         receiver events    │
//! │        │                                         │           │
//! │  ┌─────┴──────────┐                   ┌──────────┴────────┐  │
//! │  │   Correlator   │◄──── response ────│     Validator     │  │
//! │  │ (pending store │                   │ origin → sender → │  │
//! │  │  via oneshot)  │                   │   jsonrpc "2.0"   │  │
//! │  └─────┬──────────┘                   └──────────┬────────┘  │
//! │        │                                 request │           │
//! │        │                              ┌──────────┴────────┐  │
//! │        │                              │      Invoker      │  │
//! │        │                              │ (namespace lookup)│  │
//! │        │                              └──────────┬────────┘  │
//! │  ┌─────┴─────────────────────────────────────────┴────────┐  │
//! │  │        Outbound port (send captured at bind time)      │  │
//! │  └────────────────────────────┬───────────────────────────┘  │
//! └───────────────────────────────┼──────────────────────────────┘
//!                                 ▼
//!                           MessageTarget
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use duplex_rpc::{dispatch, DispatchConfig, MemoryPort, Namespace};
//!
//! let (left, right) = MemoryPort::pair(None, None);
//! let _server = dispatch(
//!     DispatchConfig::new(Arc::new(right))
//!         .namespace(Namespace::new().with_sync("ping", |_| Ok(json!("pong")))),
//! )?;
//! let client = dispatch(DispatchConfig::new(Arc::new(left)))?;
//! assert_eq!(client.request("ping", vec![]).await?, json!("pong"));
//! ```
//!
//! # Security
//!
//! - Inbound events are checked against an expected origin and, for split
//!   endpoints, an expected sender before they are parsed.
//! - Outbound posts are restricted to the expected origin when one is set.
//! - Method failures cross the channel only as `{name, message}`.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod adapters;
pub mod binder;
pub mod correlator;
pub mod domain;
pub mod error;
pub mod invoker;
pub mod ports;
pub mod service;
pub mod validator;

// Re-exports
pub use adapters::{
    Diagnostic, MemoryPort, RecordingDiagnostics, SilentDiagnostics, TracingDiagnostics,
};
pub use binder::OutboundPort;
pub use correlator::{Correlator, PendingCall};
pub use domain::{
    arg, ConfigError, DispatchConfig, DispatchOptions, Method, MethodFuture, Namespace,
    NotificationPolicy, Outcome, PendingRequestStore, PendingStats,
};
pub use error::{CallError, CallResult, ChannelError, DispatchError, MethodError};
pub use invoker::Invoker;
pub use ports::{
    DiagnosticKind, Diagnostics, EndpointId, MessageEvent, MessageReceiver, MessageTarget,
    Severity,
};
pub use service::{dispatch, Dispatcher};
pub use validator::{EnvelopeValidator, Rejection, Verdict};

pub use duplex_types::{Envelope, RequestId, TransferableError, JSONRPC_VERSION};
