//! # Error Reduction Flows
//!
//! Method failures on the answering side arrive on the calling side as
//! `CallError::Remote` holding exactly the `{name, message}` pair.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{connected, math, with_raw_peer, WAIT};
    use duplex_rpc::{CallError, MethodError, Namespace, TransferableError};
    use serde_json::json;
    use std::fmt;
    use tokio::time::timeout;

    async fn remote_error(method: &str) -> TransferableError {
        let (left, _right) = connected(Namespace::new(), math());
        match timeout(WAIT, left.request(method, vec![])).await.unwrap() {
            Err(CallError::Remote(error)) => error,
            other => panic!("expected remote error for {method}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_thrown_error_keeps_name_and_message() {
        assert_eq!(
            remote_error("fail").await,
            TransferableError::new("RangeError", "bad")
        );
    }

    #[tokio::test]
    async fn test_unknown_method_is_not_defined() {
        let error = remote_error("missing").await;
        assert_eq!(error.message, "missing is not defined.");
        assert_eq!(error.name, "MethodNotFound");
    }

    #[tokio::test]
    async fn test_unknown_method_on_empty_namespace() {
        let (left, _right) = connected(Namespace::new(), Namespace::new());
        let err = timeout(WAIT, left.request("missing", vec![]))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.remote().unwrap().message, "missing is not defined.");
    }

    #[tokio::test]
    async fn test_empty_message_is_synthesized() {
        assert_eq!(
            remote_error("silent").await,
            TransferableError::new("OperationError", "OperationError in silent.")
        );
    }

    #[tokio::test]
    async fn test_argument_type_error() {
        let (left, _right) = connected(Namespace::new(), math());
        let err = timeout(WAIT, left.request("add", vec![json!("two"), json!(3)]))
            .await
            .unwrap()
            .unwrap_err();
        let remote = err.remote().unwrap();
        assert_eq!(remote.name, "TypeError");
        assert!(remote.message.contains("argument 0"));
    }

    #[derive(Debug)]
    struct QuotaExceeded;

    impl fmt::Display for QuotaExceeded {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("quota exceeded")
        }
    }

    impl std::error::Error for QuotaExceeded {}

    #[tokio::test]
    async fn test_native_error_type_name_crosses() {
        let ns = Namespace::new().with_sync("spend", |_| Err(MethodError::from_error(QuotaExceeded)));
        let (left, _right) = connected(Namespace::new(), ns);

        let err = timeout(WAIT, left.request("spend", vec![]))
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(
            err.remote(),
            Some(&TransferableError::new("QuotaExceeded", "quota exceeded"))
        );
    }

    #[tokio::test]
    async fn test_panicking_method_does_not_kill_dispatcher() {
        let ns = Namespace::new()
            .with_sync("explode", |_| panic!("kaboom"))
            .with_sync("ping", |_| Ok(json!("pong")));
        let (left, _right) = connected(Namespace::new(), ns);

        let err = timeout(WAIT, left.request("explode", vec![]))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.remote(), Some(&TransferableError::new("Panic", "kaboom")));

        let pong = timeout(WAIT, left.request("ping", vec![])).await.unwrap().unwrap();
        assert_eq!(pong, json!("pong"));
    }

    #[tokio::test]
    async fn test_error_wire_shape() {
        let (_dispatcher, _port, peer) = with_raw_peer(math(), |c| c);

        peer.send(json!({"id": 5, "method": "fail", "params": [], "jsonrpc": "2.0"}));

        assert_eq!(
            peer.recv().await,
            json!({"id": 5, "error": {"name": "RangeError", "message": "bad"}, "jsonrpc": "2.0"})
        );
    }
}
