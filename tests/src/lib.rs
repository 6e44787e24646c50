//! # Duplex RPC Test Suite
//!
//! Cross-crate flows: two dispatchers joined by an in-memory channel, plus a
//! raw peer for the cases a well-behaved dispatcher never produces (spoofed
//! senders, out-of-order responses, foreign protocol tags).
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── dispatch_benchmarks.rs  # Round-trip and envelope throughput
//! └── src/integration/
//!     ├── fixtures.rs              # Shared namespaces, pairs, raw peer
//!     ├── round_trip.rs            # Calls in both directions
//!     ├── errors.rs                # Error reduction across the channel
//!     ├── correlation.rs           # Ids, ordering, orphans
//!     ├── validation.rs            # Origin, sender and version gates
//!     └── lifecycle.rs             # Timeouts, cancel, close, shutdown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p duplex-tests
//! cargo test -p duplex-tests integration::correlation
//! RUST_LOG=duplex_rpc=debug cargo test -p duplex-tests -- --nocapture
//! cargo bench -p duplex-tests
//! ```

pub mod integration;
