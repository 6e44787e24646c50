//! Adapters for the dispatcher ports.

pub mod diagnostics;
pub mod memory;

pub use diagnostics::{Diagnostic, RecordingDiagnostics, SilentDiagnostics, TracingDiagnostics};
pub use memory::MemoryPort;
