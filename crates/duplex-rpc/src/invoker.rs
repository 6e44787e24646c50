//! Inbound invoker: runs namespace methods for incoming requests.

use crate::domain::namespace::Namespace;
use crate::domain::outcome::{reduce_failure, Outcome};
use crate::error::MethodError;
use duplex_types::{normalize_params, Envelope};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::debug;

/// Looks up and calls methods by name on a shared namespace.
#[derive(Debug, Clone)]
pub struct Invoker {
    namespace: Arc<Namespace>,
}

impl Invoker {
    pub fn new(namespace: Arc<Namespace>) -> Self {
        Self { namespace }
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Call `method` with `params` normalized to positional arguments.
    ///
    /// Failures (including a missing method and a panicking one) come back
    /// as [`Outcome::Failure`] already reduced to `{name, message}`.
    pub async fn invoke(&self, method: &str, params: Option<Value>) -> Outcome {
        let args = normalize_params(params);

        let Some(callable) = self.namespace.get(method) else {
            debug!(method = method, "Method not in namespace");
            return Outcome::Failure(reduce_failure(method, false, &MethodError::not_found()));
        };

        let result = AssertUnwindSafe(async move { callable.call(args).await })
            .catch_unwind()
            .await;
        match result {
            Ok(Ok(value)) => {
                debug!(method = method, "Method succeeded");
                Outcome::Success(value)
            }
            Ok(Err(error)) => {
                debug!(method = method, error = %error, "Method failed");
                Outcome::Failure(reduce_failure(method, true, &error))
            }
            Err(panic) => {
                let error = MethodError::new("Panic", panic_message(panic.as_ref()));
                debug!(method = method, error = %error, "Method panicked");
                Outcome::Failure(reduce_failure(method, true, &error))
            }
        }
    }

    /// Invoke the method a request names and build the response envelope.
    ///
    /// Called only for envelopes classified as requests, which always carry
    /// a non-empty method.
    pub async fn respond(&self, request: &Envelope) -> Envelope {
        let method = request.method_name().unwrap_or_default();
        self.invoke(method, request.params.clone())
            .await
            .into_envelope(request.id.clone())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    }
}
