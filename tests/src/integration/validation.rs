//! # Validation Flows
//!
//! Inbound events pass three gates before anything runs: origin, sender,
//! protocol tag. A rejected event produces a local diagnostic only; nothing
//! is sent back and no pending call is touched.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{init_tracing, math, with_raw_peer, RawPeer, WAIT};
    use duplex_rpc::{
        dispatch, DiagnosticKind, DispatchConfig, Dispatcher, MemoryPort, MessageEvent,
        MessageTarget, RecordingDiagnostics, Severity,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const QUIET: Duration = Duration::from_millis(100);

    async fn wait_for_entries(diagnostics: &RecordingDiagnostics, n: usize) {
        timeout(WAIT, async {
            while diagnostics.entries().len() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    /// A dispatcher on origin A talking to a raw peer on origin B, with the
    /// target and receiver given separately.
    fn split_dispatcher(diagnostics: Arc<RecordingDiagnostics>) -> (Dispatcher, Arc<MemoryPort>, RawPeer) {
        init_tracing();
        let (port, peer) = MemoryPort::pair(Some("https://app.example"), Some("https://frame.example"));
        let port = Arc::new(port);
        let dispatcher = dispatch(
            DispatchConfig::split(port.clone(), port.clone())
                .namespace(math())
                .diagnostics(diagnostics),
        )
        .unwrap();
        (dispatcher, port, RawPeer { port: peer })
    }

    #[tokio::test]
    async fn test_version_gate_no_response_no_registry_change() {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let (dispatcher, _port, peer) = with_raw_peer(math(), |c| c.diagnostics(diagnostics.clone()));

        let call = dispatcher.request("pending", vec![]);
        let id = peer.recv().await["id"].clone();

        peer.send(json!({"id": 1, "method": "add", "params": [1, 2], "jsonrpc": "1.0"}));
        peer.send(json!({"id": id, "result": "spoofed", "jsonrpc": 2.0}));
        peer.send(json!({"id": id, "result": "spoofed"}));

        wait_for_entries(&diagnostics, 3).await;
        assert_eq!(peer.recv_within(QUIET).await, None);
        assert_eq!(diagnostics.count(DiagnosticKind::ProtocolMismatch), 3);
        assert!(diagnostics
            .entries()
            .iter()
            .all(|d| d.severity == Severity::Warn));
        assert_eq!(dispatcher.pending_count(), 1);

        // Channel still usable
        peer.send(json!({"id": id, "result": "real", "jsonrpc": "2.0"}));
        assert_eq!(timeout(WAIT, call).await.unwrap().unwrap(), json!("real"));
    }

    #[tokio::test]
    async fn test_non_object_messages_dropped() {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let (_dispatcher, port, peer) = with_raw_peer(math(), |c| c.diagnostics(diagnostics.clone()));

        peer.send(json!("hello"));
        peer.send(json!([1, 2, 3]));
        port.inject(MessageEvent {
            data: None,
            origin: None,
            source: None,
        })
        .unwrap();

        wait_for_entries(&diagnostics, 3).await;
        assert_eq!(diagnostics.count(DiagnosticKind::ProtocolMismatch), 3);
        assert_eq!(peer.recv_within(QUIET).await, None);
    }

    #[tokio::test]
    async fn test_origin_mismatch_dropped() {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let (_dispatcher, port, peer) = with_raw_peer(math(), |c| {
            c.origin("https://trusted.example")
                .diagnostics(diagnostics.clone())
        });

        port.inject(
            MessageEvent::new(json!({"id": 1, "method": "add", "params": [1, 2], "jsonrpc": "2.0"}))
                .with_origin("https://evil.example"),
        )
        .unwrap();

        wait_for_entries(&diagnostics, 1).await;
        let entry = &diagnostics.of_kind(DiagnosticKind::OriginMismatch)[0];
        assert_eq!(entry.severity, Severity::Error);
        assert_eq!(peer.recv_within(QUIET).await, None);
    }

    #[tokio::test]
    async fn test_split_endpoints_check_sender() {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let (_dispatcher, port, peer) = split_dispatcher(diagnostics.clone());

        // Right origin, wrong source
        port.inject(
            MessageEvent::new(json!({"id": 1, "method": "add", "params": [1, 2], "jsonrpc": "2.0"}))
                .with_origin("https://frame.example")
                .with_source(port.local_id()),
        )
        .unwrap();

        wait_for_entries(&diagnostics, 1).await;
        assert_eq!(diagnostics.count(DiagnosticKind::SenderMismatch), 1);
        assert_eq!(peer.recv_within(QUIET).await, None);

        // The genuine peer still gets answers
        peer.send(json!({"id": 2, "method": "add", "params": [1, 2], "jsonrpc": "2.0"}));
        assert_eq!(peer.recv().await, json!({"id": 2, "result": 3, "jsonrpc": "2.0"}));
    }

    #[tokio::test]
    async fn test_split_endpoints_default_origin_to_target() {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let (_dispatcher, port, peer) = split_dispatcher(diagnostics.clone());

        // Right source, wrong origin
        port.inject(
            MessageEvent::new(json!({"id": 1, "method": "add", "params": [1, 2], "jsonrpc": "2.0"}))
                .with_origin("https://evil.example")
                .with_source(port.target_id()),
        )
        .unwrap();

        wait_for_entries(&diagnostics, 1).await;
        assert_eq!(diagnostics.count(DiagnosticKind::OriginMismatch), 1);
        assert_eq!(peer.recv_within(QUIET).await, None);
    }

    #[tokio::test]
    async fn test_outbound_restricted_to_expected_origin() {
        init_tracing();
        let (port, peer) = MemoryPort::pair(None, Some("https://other.example"));
        let dispatcher = dispatch(DispatchConfig::new(Arc::new(port)).origin("https://trusted.example")).unwrap();
        let peer = RawPeer { port: peer };

        // The transport refuses delivery to a peer on the wrong origin
        let _call = dispatcher.request("add", vec![json!(1), json!(2)]);
        assert_eq!(peer.recv_within(QUIET).await, None);
        assert_eq!(dispatcher.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_namespace_defaults_to_empty() {
        init_tracing();
        let (port, peer) = MemoryPort::pair(None, None);
        let _dispatcher = dispatch(DispatchConfig::new(Arc::new(port))).unwrap();
        let peer = RawPeer { port: peer };

        peer.send(json!({"id": 3, "method": "anything", "jsonrpc": "2.0"}));

        let response = peer.recv().await;
        assert_eq!(response["error"]["message"], json!("anything is not defined."));
    }
}
