//! Invocation outcome and failure reduction.

use crate::error::MethodError;
use duplex_types::{Envelope, TransferableError};
use serde_json::Value;

/// Result of invoking one namespace method.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(TransferableError),
}

impl Outcome {
    /// Response envelope echoing the request `id`.
    #[must_use]
    pub fn into_envelope(self, id: Option<Value>) -> Envelope {
        match self {
            Outcome::Success(result) => Envelope::success(id, result),
            Outcome::Failure(error) => Envelope::failure(id, &error),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Reduce a method failure to `{name, message}` and annotate the message.
///
/// - `method` absent from the namespace and not mentioned in the message:
///   the message becomes `"<method> is not defined."`.
/// - Otherwise an empty message becomes `"<label> in <method>."`, where the
///   label is the error name, or its string form when the name is empty.
#[must_use]
pub fn reduce_failure(method: &str, found: bool, error: &MethodError) -> TransferableError {
    let mut reduced = error.reduce();

    if !found && !reduced.message.contains(method) {
        reduced.message = format!("{method} is not defined.");
    } else if reduced.message.is_empty() {
        let label = if reduced.name.is_empty() {
            error.to_string()
        } else {
            reduced.name.clone()
        };
        reduced.message = format!("{label} in {method}.");
    }

    reduced
}
