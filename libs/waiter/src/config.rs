//! Per-resource-type wait timings.

use std::collections::BTreeMap;
use std::time::Duration;

/// Default delay between polls.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default overall wait budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Poll interval and overall budget for one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimings {
    /// Delay between consecutive polls.
    pub interval: Duration,
    /// Overall budget for the wait.
    pub timeout: Duration,
}

impl WaitTimings {
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for WaitTimings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Read-only map from resource type to wait timings.
///
/// Convergence rates differ by orders of magnitude between resource types;
/// a port is ready in seconds while an image import takes minutes. The
/// budget for each type lives here, owned by whoever sets the run up, so
/// call sites never hardcode their own.
#[derive(Debug, Clone, Default)]
pub struct WaitConfig {
    default: WaitTimings,
    overrides: BTreeMap<String, WaitTimings>,
}

impl WaitConfig {
    /// A config where every resource type uses `default`.
    #[must_use]
    pub fn new(default: WaitTimings) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Load default timings from environment variables.
    ///
    /// `STRATUS_WAIT_INTERVAL_MS` and `STRATUS_WAIT_TIMEOUT_SECS` set the
    /// defaults; unset or unparsable values fall back to 1s / 300s.
    #[must_use]
    pub fn from_env() -> Self {
        let interval = std::env::var("STRATUS_WAIT_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_INTERVAL);

        let timeout = std::env::var("STRATUS_WAIT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self::new(WaitTimings::new(interval, timeout))
    }

    /// Pins timings for one resource type.
    #[must_use]
    pub fn with_override(mut self, resource_type: impl Into<String>, timings: WaitTimings) -> Self {
        self.overrides.insert(resource_type.into(), timings);
        self
    }

    /// Timings for a resource type: its override, or the default.
    #[must_use]
    pub fn timings_for(&self, resource_type: &str) -> WaitTimings {
        self.overrides
            .get(resource_type)
            .copied()
            .unwrap_or(self.default)
    }
}
