//! Wait specifications.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::config::WaitTimings;

/// A set of status values, matched exactly and case-sensitively.
///
/// Status strings are service vocabulary (`ACTIVE`, `error_deleting`);
/// the poller never normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet(BTreeSet<String>);

impl StateSet {
    /// The empty set, which matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// A set holding the given states.
    pub fn of<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(states.into_iter().map(Into::into).collect())
    }

    /// Whether `status` is in the set.
    #[must_use]
    pub fn contains(&self, status: &str) -> bool {
        self.0.contains(status)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for StateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for state in &self.0 {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(state)?;
            first = false;
        }
        Ok(())
    }
}

/// Delay policy between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every poll. The default.
    Fixed,
    /// Delay grows by `multiplier` for each poll, capped at `cap`.
    Exponential { multiplier: u32, cap: Duration },
}

impl Backoff {
    /// Delay before poll number `attempt` (1-based; the initial fetch is
    /// attempt 0 and never waits).
    #[must_use]
    pub fn delay_for(&self, base: Duration, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed => base,
            Backoff::Exponential { multiplier, cap } => {
                let exponent = attempt.saturating_sub(1);
                let factor = multiplier.saturating_pow(exponent);
                base.saturating_mul(factor).min(*cap)
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed
    }
}

/// One wait: what to watch, which states end it, and the time budget.
///
/// Specs are built per call and dropped afterwards. `resource` is a label
/// for logs and errors, typically `"<type> <id>"`.
#[derive(Debug, Clone)]
pub struct WaitSpec {
    /// Label naming the watched resource in logs and errors.
    pub resource: String,
    /// Body field carrying the status value.
    pub status_field: String,
    /// States that end the wait successfully.
    pub success: StateSet,
    /// States that end the wait as a failure, immediately.
    pub failure: StateSet,
    /// Base delay between polls.
    pub interval: Duration,
    /// Overall budget.
    pub timeout: Duration,
    /// Delay policy applied to `interval`.
    pub backoff: Backoff,
}

impl WaitSpec {
    /// A spec watching the conventional `status` field with default
    /// timings, an empty failure set, and fixed backoff.
    pub fn new(resource: impl Into<String>, success: StateSet) -> Self {
        let timings = WaitTimings::default();
        Self {
            resource: resource.into(),
            status_field: "status".to_string(),
            success,
            failure: StateSet::new(),
            interval: timings.interval,
            timeout: timings.timeout,
            backoff: Backoff::Fixed,
        }
    }

    /// States that end the wait as a failure.
    #[must_use]
    pub fn with_failure(mut self, failure: StateSet) -> Self {
        self.failure = failure;
        self
    }

    /// Watches a non-conventional status field, e.g. `provision_state`.
    #[must_use]
    pub fn with_status_field(mut self, field: impl Into<String>) -> Self {
        self.status_field = field.into();
        self
    }

    /// Overrides the base poll interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Overrides the overall budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Applies configured timings, setting interval and budget together.
    #[must_use]
    pub fn with_timings(mut self, timings: WaitTimings) -> Self {
        self.interval = timings.interval;
        self.timeout = timings.timeout;
        self
    }

    /// Overrides the delay policy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}
