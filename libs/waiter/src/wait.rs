//! The polling loops.

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use stratus_envelope::Fields;

use crate::error::WaitError;
use crate::source::StatusSource;
use crate::spec::{StateSet, WaitSpec};

/// Where one observed status leaves a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A success state was observed.
    Reached,
    /// A failure state was observed; waiting longer cannot help.
    Failed,
    /// Neither terminal set matched; keep polling.
    Pending,
}

/// Classifies one observed status against the terminal sets.
///
/// Success is checked first, so a status listed in both sets counts as
/// reached.
#[must_use]
pub fn classify(status: &str, success: &StateSet, failure: &StateSet) -> Progress {
    if success.contains(status) {
        Progress::Reached
    } else if failure.contains(status) {
        Progress::Failed
    } else {
        Progress::Pending
    }
}

/// Polls `source` until a success state is observed, returning the final
/// body.
///
/// The first fetch happens immediately, so a resource already in a
/// success state returns without sleeping. A failure state ends the wait
/// at once with [`WaitError::ErrorState`] carrying the full body. When
/// the budget runs out the wait ends with [`WaitError::Timeout`] naming
/// the last observed status; the timeout is checked after each fetch, so
/// it fires within one poll interval past the budget. Fetch errors
/// propagate immediately and are never retried here.
pub async fn wait_for_status<S>(source: &S, spec: &WaitSpec) -> Result<Fields, WaitError>
where
    S: StatusSource + ?Sized,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;
    let mut last_status: Option<String> = None;

    loop {
        let body = source.latest().await?;
        let Ok(status) = body.str(&spec.status_field) else {
            return Err(WaitError::MissingStatus {
                resource: spec.resource.clone(),
                field: spec.status_field.clone(),
            });
        };
        let status = status.to_string();

        match classify(&status, &spec.success, &spec.failure) {
            Progress::Reached => {
                debug!(
                    resource = %spec.resource,
                    status = %status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Wait finished"
                );
                return Ok(body);
            }
            Progress::Failed => {
                warn!(
                    resource = %spec.resource,
                    status = %status,
                    "Resource entered error state"
                );
                return Err(WaitError::ErrorState {
                    resource: spec.resource.clone(),
                    status,
                    body,
                });
            }
            Progress::Pending => {}
        }
        last_status = Some(status);

        let waited = started.elapsed();
        if waited >= spec.timeout {
            return Err(WaitError::Timeout {
                resource: spec.resource.clone(),
                last_status,
                waited,
                timeout: spec.timeout,
            });
        }

        attempt += 1;
        let delay = spec.backoff.delay_for(spec.interval, attempt);
        debug!(
            resource = %spec.resource,
            status = ?last_status,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Still waiting"
        );
        sleep(delay).await;
    }
}

/// Polls until the source reports the resource gone.
///
/// `NotFound` from the source is the success condition here; it confirms
/// a deletion completed. A status from the failure set, such as
/// `error_deleting`, still ends the wait with [`WaitError::ErrorState`].
/// Bodies without a readable status field keep the wait pending, since
/// some resource types report no status while tearing down. Every other
/// fetch error propagates.
pub async fn wait_for_absence<S>(source: &S, spec: &WaitSpec) -> Result<(), WaitError>
where
    S: StatusSource + ?Sized,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;
    let mut last_status: Option<String> = None;

    loop {
        match source.latest().await {
            Ok(body) => {
                if let Ok(status) = body.str(&spec.status_field) {
                    let status = status.to_string();
                    if spec.failure.contains(&status) {
                        warn!(
                            resource = %spec.resource,
                            status = %status,
                            "Resource entered error state during deletion"
                        );
                        return Err(WaitError::ErrorState {
                            resource: spec.resource.clone(),
                            status,
                            body,
                        });
                    }
                    last_status = Some(status);
                }
            }
            Err(err) if err.is_not_found() => {
                debug!(
                    resource = %spec.resource,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Resource gone"
                );
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        let waited = started.elapsed();
        if waited >= spec.timeout {
            return Err(WaitError::Timeout {
                resource: spec.resource.clone(),
                last_status,
                waited,
                timeout: spec.timeout,
            });
        }

        attempt += 1;
        let delay = spec.backoff.delay_for(spec.interval, attempt);
        debug!(
            resource = %spec.resource,
            status = ?last_status,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Still waiting for deletion"
        );
        sleep(delay).await;
    }
}
