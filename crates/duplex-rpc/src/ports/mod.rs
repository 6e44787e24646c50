//! Ports: the seams between the dispatcher and its host.
//!
//! - [`channel`]: where messages go out and come in.
//! - [`diagnostics`]: where local diagnostics are reported.

pub mod channel;
pub mod diagnostics;

pub use channel::{EndpointId, MessageEvent, MessageReceiver, MessageTarget};
pub use diagnostics::{DiagnosticKind, Diagnostics, Severity};
