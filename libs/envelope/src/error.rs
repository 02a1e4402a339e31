//! Error types for envelope handling.

use thiserror::Error;

/// Errors that can occur while wrapping or unwrapping resource envelopes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The payload is not valid JSON.
    #[error("body is not valid JSON: {0}")]
    NotJson(String),

    /// The expected top-level resource key is absent.
    #[error("expected top-level key {key:?} in body")]
    MissingKey { key: String },

    /// The value under the resource key has the wrong JSON shape.
    #[error("value under {key:?} is not {expected}")]
    WrongShape { key: String, expected: &'static str },
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(err: serde_json::Error) -> Self {
        EnvelopeError::NotJson(err.to_string())
    }
}

/// Errors that can occur during typed field access on a decoded body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field is absent from the body.
    #[error("field {0:?} is missing")]
    Missing(String),

    /// The field exists but holds a different JSON type.
    #[error("field {field:?} is not {expected}")]
    WrongType { field: String, expected: &'static str },
}
