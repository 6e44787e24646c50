//! # Duplex Types Crate
//!
//! Wire vocabulary shared by both ends of a Duplex channel.
//!
//! ## Envelope Shapes
//!
//! ```text
//! Request:       { id,  method, params, jsonrpc: "2.0" }
//! Notification:  {      method, params, jsonrpc: "2.0" }
//! Response:      { id,  result,         jsonrpc: "2.0" }
//!              | { id,  error: { name, message }, jsonrpc: "2.0" }
//! ```
//!
//! ## Design Principles
//!
//! - **Lenient Inbound, Strict Outbound**: anything received off the channel
//!   parses into an [`Envelope`] (missing fields stay `None`); everything we
//!   send is built through typed constructors.
//! - **Exact Version Tag**: `jsonrpc` must equal [`JSONRPC_VERSION`] byte for
//!   byte. No trimming, no case folding, no numeric coercion.
//! - **Reduced Errors**: only `{name, message}` crosses the channel
//!   ([`TransferableError`]).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod envelope;
pub mod error;
pub mod id;

pub use envelope::{normalize_params, Envelope, EnvelopeKind};
pub use error::{EnvelopeError, EnvelopeResult, TransferableError};
pub use id::RequestId;

/// Protocol-version tag carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";
