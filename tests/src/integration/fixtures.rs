//! Shared fixtures for the integration flows.

use duplex_rpc::{
    arg, dispatch, DispatchConfig, Dispatcher, MemoryPort, MessageReceiver, MessageTarget,
    MethodError, Namespace,
};
use serde_json::{json, Value};
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Upper bound on any single wait in a flow.
pub const WAIT: Duration = Duration::from_secs(2);

static TRACING: Once = Once::new();

/// Route `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A namespace exercising every return shape.
pub fn math() -> Namespace {
    Namespace::new()
        .with_sync("add", |args| {
            let a: i64 = arg(&args, 0)?;
            let b: i64 = arg(&args, 1)?;
            Ok(json!(a + b))
        })
        .with_sync("echo", |args| Ok(Value::Array(args)))
        .with_sync("fail", |_| Err(MethodError::range_error("bad")))
        .with_sync("silent", |_| Err(MethodError::new("OperationError", "")))
        .with_async("sleep_then_echo", |args| async move {
            let ms: u64 = arg(&args, 0)?;
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, MethodError>(args.get(1).cloned().unwrap_or(Value::Null))
        })
}

/// Two dispatchers over one in-memory pair.
pub fn connected(left: Namespace, right: Namespace) -> (Dispatcher, Dispatcher) {
    connected_with(left, right, |c| c, |c| c)
}

/// Like [`connected`], with a hook to adjust each side's configuration.
pub fn connected_with(
    left: Namespace,
    right: Namespace,
    left_config: impl FnOnce(DispatchConfig) -> DispatchConfig,
    right_config: impl FnOnce(DispatchConfig) -> DispatchConfig,
) -> (Dispatcher, Dispatcher) {
    init_tracing();
    let (left_port, right_port) = MemoryPort::pair(None, None);
    let left = dispatch(left_config(DispatchConfig::new(Arc::new(left_port)).namespace(left)))
        .expect("left dispatcher");
    let right = dispatch(right_config(
        DispatchConfig::new(Arc::new(right_port)).namespace(right),
    ))
    .expect("right dispatcher");
    (left, right)
}

/// The far end of a channel, driven by hand.
pub struct RawPeer {
    pub port: MemoryPort,
}

impl RawPeer {
    /// Post a raw message to the dispatcher.
    pub fn send(&self, message: Value) {
        self.port
            .post_message(message, None)
            .expect("raw peer send");
    }

    /// Next message from the dispatcher, or `None` after `within`.
    pub async fn recv_within(&self, within: Duration) -> Option<Value> {
        tokio::time::timeout(within, self.port.recv())
            .await
            .ok()
            .flatten()
            .and_then(|event| event.data)
    }

    /// Next message from the dispatcher; panics after [`WAIT`].
    pub async fn recv(&self) -> Value {
        self.recv_within(WAIT).await.expect("message from dispatcher")
    }
}

/// A dispatcher whose peer is a [`RawPeer`].
pub fn with_raw_peer(
    namespace: Namespace,
    configure: impl FnOnce(DispatchConfig) -> DispatchConfig,
) -> (Dispatcher, Arc<MemoryPort>, RawPeer) {
    init_tracing();
    let (port, peer) = MemoryPort::pair(None, None);
    let port = Arc::new(port);
    let dispatcher = dispatch(configure(
        DispatchConfig::new(port.clone()).namespace(namespace),
    ))
    .expect("dispatcher");
    (dispatcher, port, RawPeer { port: peer })
}
