//! Diagnostic sinks.
//!
//! Validation failures, orphan responses and failed response sends are
//! local conditions: they never cross the channel. They are reported here,
//! at one of three severities, so hosts can route them wherever they like.

use std::fmt;

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `jsonrpc` tag missing or not exactly `"2.0"`.
    ProtocolMismatch,
    /// Event origin differs from the expected origin.
    OriginMismatch,
    /// Event source differs from the expected sender.
    SenderMismatch,
    /// Response whose id has no pending request.
    OrphanResponse,
    /// A computed response could not be sent back.
    ResponseSendFailed,
    /// The receive source ended.
    ChannelClosed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::ProtocolMismatch => "protocol_mismatch",
            DiagnosticKind::OriginMismatch => "origin_mismatch",
            DiagnosticKind::SenderMismatch => "sender_mismatch",
            DiagnosticKind::OrphanResponse => "orphan_response",
            DiagnosticKind::ResponseSendFailed => "response_send_failed",
            DiagnosticKind::ChannelClosed => "channel_closed",
        };
        f.write_str(s)
    }
}

/// Severity of a diagnostic, one per sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Log,
    Warn,
    Error,
}

/// The `log` / `warn` / `error` sinks.
pub trait Diagnostics: Send + Sync {
    fn log(&self, kind: DiagnosticKind, message: &str);

    fn warn(&self, kind: DiagnosticKind, message: &str);

    fn error(&self, kind: DiagnosticKind, message: &str);

    /// Route to the sink matching `severity`.
    fn emit(&self, severity: Severity, kind: DiagnosticKind, message: &str) {
        match severity {
            Severity::Log => self.log(kind, message),
            Severity::Warn => self.warn(kind, message),
            Severity::Error => self.error(kind, message),
        }
    }
}
