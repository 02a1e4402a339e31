//! Typed API failures and the status-to-kind mapping.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use stratus_envelope::{EnvelopeError, FieldError};
use thiserror::Error;

/// Headers services use to echo a request id for an API call.
pub(crate) const REQUEST_ID_HEADERS: [&str; 2] =
    ["x-openstack-request-id", "x-compute-request-id"];

/// A typed failure from an API call.
///
/// One variant per distinguishable fault class, so tests assert on the
/// kind instead of re-parsing numeric status codes. Each HTTP fault keeps
/// the message the service put in its fault envelope and the request id
/// header when one was sent.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: the request itself was invalid.
    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        request_id: Option<String>,
    },

    /// 401: missing or expired credentials.
    #[error("unauthorized: {message}")]
    Unauthorized {
        message: String,
        request_id: Option<String>,
    },

    /// 403: authenticated but not allowed.
    #[error("forbidden: {message}")]
    Forbidden {
        message: String,
        request_id: Option<String>,
    },

    /// 404: the resource does not exist.
    #[error("not found: {message}")]
    NotFound {
        message: String,
        request_id: Option<String>,
    },

    /// 409: the request conflicts with current resource state.
    #[error("conflict: {message}")]
    Conflict {
        message: String,
        request_id: Option<String>,
    },

    /// 413, or 403 carrying an over-limit fault: a quota was exhausted.
    #[error("over limit: {message}")]
    OverLimit {
        message: String,
        request_id: Option<String>,
    },

    /// Any other status that differs from what the caller declared.
    #[error("expected status {expected}, got {actual}: {message}")]
    UnexpectedStatus {
        expected: StatusCode,
        actual: StatusCode,
        message: String,
        request_id: Option<String>,
    },

    /// The service confirmed success but the body did not decode.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request never completed: connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// True for the 404 kind. Deletion flows branch on this.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// The request id attached to the fault, if the service sent one.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { request_id, .. }
            | ApiError::Unauthorized { request_id, .. }
            | ApiError::Forbidden { request_id, .. }
            | ApiError::NotFound { request_id, .. }
            | ApiError::Conflict { request_id, .. }
            | ApiError::OverLimit { request_id, .. }
            | ApiError::UnexpectedStatus { request_id, .. } => request_id.as_deref(),
            ApiError::Malformed(_) | ApiError::Transport(_) => None,
        }
    }
}

impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        ApiError::Malformed(err.to_string())
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::Malformed(err.to_string())
    }
}

/// The request id echoed in `headers`, if any known header carries one.
pub(crate) fn request_id_of(headers: &HeaderMap) -> Option<&str> {
    REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|value| value.to_str().ok()))
}

/// Maps an unexpected response onto the fault taxonomy.
pub(crate) fn fault(
    expected: StatusCode,
    actual: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiError {
    let request_id = request_id_of(headers).map(str::to_string);
    let (fault_key, message) = fault_body(actual, body);

    match actual {
        StatusCode::BAD_REQUEST => ApiError::BadRequest {
            message,
            request_id,
        },
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized {
            message,
            request_id,
        },
        StatusCode::FORBIDDEN if is_over_limit(fault_key.as_deref()) => ApiError::OverLimit {
            message,
            request_id,
        },
        StatusCode::FORBIDDEN => ApiError::Forbidden {
            message,
            request_id,
        },
        StatusCode::NOT_FOUND => ApiError::NotFound {
            message,
            request_id,
        },
        StatusCode::CONFLICT => ApiError::Conflict {
            message,
            request_id,
        },
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::OverLimit {
            message,
            request_id,
        },
        _ => ApiError::UnexpectedStatus {
            expected,
            actual,
            message,
            request_id,
        },
    }
}

/// Extracts the fault key and human message from an error body.
///
/// Fault bodies follow the same one-key envelope as success bodies:
/// `{"badRequest": {"message": "...", "code": 400}}`. Anything that does
/// not parse that way degrades to the raw body text, or to the status
/// reason phrase when the body is empty.
fn fault_body(status: StatusCode, body: &[u8]) -> (Option<String>, String) {
    let fallback = || {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            text
        }
    };

    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return (None, fallback());
    };
    let Some(root) = value.as_object() else {
        return (None, fallback());
    };
    let Some((key, fault)) = root.iter().next() else {
        return (None, fallback());
    };

    let message = fault
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(fallback);
    (Some(key.clone()), message)
}

/// Quota faults arrive as 403 with an `overLimit`-family fault key.
fn is_over_limit(fault_key: Option<&str>) -> bool {
    fault_key.is_some_and(|key| key.to_ascii_lowercase().starts_with("overlimit"))
}
