//! Error types for waits.

use std::time::Duration;

use stratus_envelope::Fields;
use stratus_rest::ApiError;
use thiserror::Error;

/// A wait that did not end in a success state.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The resource moved to a state in the failure set. Waiting longer
    /// cannot help; the last body rides along for triage.
    #[error("resource {resource} entered error state {status:?}")]
    ErrorState {
        resource: String,
        status: String,
        body: Fields,
    },

    /// The budget ran out before any terminal state was seen.
    #[error(
        "timed out waiting for {resource}: last status {last_status:?} after {waited:?} (budget {timeout:?})"
    )]
    Timeout {
        resource: String,
        last_status: Option<String>,
        waited: Duration,
        timeout: Duration,
    },

    /// The body carries no readable status field, so the wait can never
    /// terminate on it.
    #[error("resource {resource} has no readable {field:?} field")]
    MissingStatus { resource: String, field: String },

    /// The fetch itself failed. The poller never retries these.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WaitError {
    /// The status last observed before the wait ended, if any.
    #[must_use]
    pub fn last_status(&self) -> Option<&str> {
        match self {
            WaitError::ErrorState { status, .. } => Some(status),
            WaitError::Timeout { last_status, .. } => last_status.as_deref(),
            WaitError::MissingStatus { .. } | WaitError::Api(_) => None,
        }
    }
}
