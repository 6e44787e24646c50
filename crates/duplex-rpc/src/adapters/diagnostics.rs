//! Diagnostic sink adapters.

use crate::ports::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

/// Forwards diagnostics to `tracing`: `log` at debug, `warn` at warn,
/// `error` at error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log(&self, kind: DiagnosticKind, message: &str) {
        debug!(kind = %kind, "{}", message);
    }

    fn warn(&self, kind: DiagnosticKind, message: &str) {
        warn!(kind = %kind, "{}", message);
    }

    fn error(&self, kind: DiagnosticKind, message: &str) {
        error!(kind = %kind, "{}", message);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn log(&self, _kind: DiagnosticKind, _message: &str) {}

    fn warn(&self, _kind: DiagnosticKind, _message: &str) {}

    fn error(&self, _kind: DiagnosticKind, _message: &str) {}
}

/// One captured diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Recorded diagnostics of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.lock().iter().filter(|d| d.kind == kind).count()
    }

    fn record(&self, severity: Severity, kind: DiagnosticKind, message: &str) {
        self.entries.lock().push(Diagnostic {
            severity,
            kind,
            message: message.to_owned(),
        });
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log(&self, kind: DiagnosticKind, message: &str) {
        self.record(Severity::Log, kind, message);
    }

    fn warn(&self, kind: DiagnosticKind, message: &str) {
        self.record(Severity::Warn, kind, message);
    }

    fn error(&self, kind: DiagnosticKind, message: &str) {
        self.record(Severity::Error, kind, message);
    }
}
