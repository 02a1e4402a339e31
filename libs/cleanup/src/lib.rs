//! # stratus-cleanup
//!
//! Deferred teardown tracking for the stratus harness.
//!
//! Every resource a test creates must be released when the test ends,
//! whether the body passed, failed an assertion, or panicked outright. A
//! [`CleanupTracker`] collects teardown actions as resources appear and
//! replays them in reverse registration order, so dependents go before
//! their dependencies.
//!
//! ## Design Principles
//!
//! - Teardown runs unconditionally; [`guarded`] makes that hold even
//!   across a panicking test body
//! - One broken teardown never strands the rest: failures are logged,
//!   collected into the report, and the drain continues
//! - A resource the test already deleted reports not-found here and
//!   counts as already gone, not as a failure

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use tracing::{debug, warn};

use stratus_rest::ApiError;
use stratus_waiter::WaitError;

type TeardownFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type TeardownFn = Box<dyn FnOnce() -> TeardownFuture + Send>;

/// One deferred teardown action.
struct CleanupEntry {
    label: String,
    action: TeardownFn,
}

/// Outcome of one teardown pass.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// How many entries ran.
    pub executed: usize,
    /// Entries whose resource was already gone when teardown reached it.
    pub already_gone: usize,
    /// Label and error text of each entry that failed.
    pub failures: Vec<(String, String)>,
}

impl CleanupReport {
    /// True when no entry failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// LIFO registry of deferred teardown actions.
///
/// Clones share the registry, so helpers that create resources can
/// register teardowns on their own copy. [`run_all`](Self::run_all)
/// drains the registry; entries run at most once even if it is called
/// again.
#[derive(Clone, Default)]
pub struct CleanupTracker {
    entries: Arc<Mutex<Vec<CleanupEntry>>>,
}

impl CleanupTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a teardown action. The last one registered runs first.
    ///
    /// `label` names the action in logs and in the report, typically
    /// `"delete <type> <id>"`.
    pub fn register<F, Fut>(&self, label: impl Into<String>, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let entry = CleanupEntry {
            label: label.into(),
            action: Box::new(move || Box::pin(action())),
        };
        self.entries
            .lock()
            .expect("cleanup registry lock poisoned")
            .push(entry);
    }

    /// Number of teardown actions still pending.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("cleanup registry lock poisoned")
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every pending action in reverse registration order.
    ///
    /// A failing action is logged and recorded in the report, and the
    /// drain continues with the next one. Actions registered while the
    /// drain runs are drained too.
    pub async fn run_all(&self) -> CleanupReport {
        let mut report = CleanupReport::default();

        loop {
            // Keep the registry unlocked while an action runs, so actions
            // may register further teardown.
            let entry = {
                self.entries
                    .lock()
                    .expect("cleanup registry lock poisoned")
                    .pop()
            };
            let Some(entry) = entry else {
                break;
            };

            report.executed += 1;
            match (entry.action)().await {
                Ok(()) => {
                    debug!(action = %entry.label, "Teardown finished");
                }
                Err(err) if is_already_gone(&err) => {
                    debug!(action = %entry.label, "Resource already gone");
                    report.already_gone += 1;
                }
                Err(err) => {
                    warn!(action = %entry.label, error = %err, "Teardown failed, continuing");
                    report.failures.push((entry.label, err.to_string()));
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for CleanupTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupTracker")
            .field("pending", &self.len())
            .finish()
    }
}

/// A not-found during teardown means the test body already deleted the
/// resource. That is success, not breakage.
fn is_already_gone(err: &anyhow::Error) -> bool {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return api.is_not_found();
    }
    if let Some(wait) = err.downcast_ref::<WaitError>() {
        return matches!(wait, WaitError::Api(api) if api.is_not_found());
    }
    false
}

/// Runs `body`, then the tracker's teardown, no matter how `body` exits.
///
/// A panic in the body is caught, teardown runs to completion, and the
/// panic resumes afterwards, so the test still fails with its original
/// message while everything it created gets released.
pub async fn guarded<T>(tracker: CleanupTracker, body: impl Future<Output = T>) -> T {
    let outcome = AssertUnwindSafe(body).catch_unwind().await;

    let report = tracker.run_all().await;
    if !report.is_clean() {
        warn!(
            failed = report.failures.len(),
            executed = report.executed,
            "Teardown pass completed with failures"
        );
    }

    match outcome {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
