//! Namespace: the dispatch table of locally callable methods.
//!
//! Every method takes its positional arguments as `Vec<Value>` and returns a
//! [`MethodFuture`]. Synchronous closures are adapted with
//! [`Namespace::with_sync`]; asynchronous ones with [`Namespace::with_async`].
//! The invoker awaits both the same way.

use crate::error::MethodError;
use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Settles to a value or a method failure.
pub type MethodFuture = BoxFuture<'static, Result<Value, MethodError>>;

/// A callable namespace entry.
pub trait Method: Send + Sync {
    fn call(&self, args: Vec<Value>) -> MethodFuture;
}

impl<F> Method for F
where
    F: Fn(Vec<Value>) -> MethodFuture + Send + Sync,
{
    fn call(&self, args: Vec<Value>) -> MethodFuture {
        self(args)
    }
}

/// Methods callable by the remote side, keyed by exact name.
#[derive(Clone, Default)]
pub struct Namespace {
    methods: HashMap<String, Arc<dyn Method>>,
}

impl Namespace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method, replacing any previous entry with that name.
    pub fn register<M>(&mut self, name: impl Into<String>, method: M) -> &mut Self
    where
        M: Method + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Register a method that completes before returning.
    pub fn register_sync<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        self.register(name, move |args: Vec<Value>| -> MethodFuture {
            future::ready(f(args)).boxed()
        })
    }

    /// Register a method that returns a future.
    pub fn register_async<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
    {
        self.register(name, move |args: Vec<Value>| -> MethodFuture { f(args).boxed() })
    }

    /// Builder form of [`Namespace::register_sync`].
    #[must_use]
    pub fn with_sync<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        self.register_sync(name, f);
        self
    }

    /// Builder form of [`Namespace::register_async`].
    #[must_use]
    pub fn with_async<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
    {
        self.register_async(name, f);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Method>> {
        self.methods.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("methods", &self.names())
            .finish()
    }
}

/// Deserialize positional argument `index`.
///
/// A missing argument reads as `null`, so `Option<T>` parameters are optional.
pub fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<T, MethodError> {
    let value = args.get(index).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| MethodError::type_error(format!("argument {index}: {e}")))
}
