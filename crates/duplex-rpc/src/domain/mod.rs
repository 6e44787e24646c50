//! Domain types for the dispatcher.
//!
//! Configuration, the namespace dispatch table, invocation outcomes and the
//! pending request store.

pub mod config;
pub mod namespace;
pub mod outcome;
pub mod pending;

// Re-exports for convenience
pub use config::{ConfigError, DispatchConfig, DispatchOptions, NotificationPolicy};
pub use namespace::{arg, Method, MethodFuture, Namespace};
pub use outcome::{reduce_failure, Outcome};
pub use pending::{PendingRequestStore, PendingStats};
