//! # stratus-waiter
//!
//! Resource state poller for the stratus harness.
//!
//! Cloud resources converge asynchronously: a create call is confirmed
//! long before the resource is usable. This crate owns the waiting. A
//! [`WaitSpec`] names the terminal state sets and the time budget, a
//! [`StatusSource`] fetches the current body, and the poll loop turns the
//! two into either the final body or a diagnosable failure.
//!
//! ## Design Principles
//!
//! - Fetch first, sleep later: a resource already converged costs zero
//!   waiting time
//! - Failure states end the wait immediately; a resource in `ERROR` will
//!   not improve by being stared at
//! - Timeouts name the resource, the last observed status, and the
//!   budget, because that line is often all a triage gets
//! - Intervals, budgets, and backoff come from configuration, never from
//!   hardcoded sleeps at call sites

mod config;
mod error;
mod source;
mod spec;
mod wait;

pub use config::{WaitConfig, WaitTimings, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
pub use error::WaitError;
pub use source::{FnSource, StatusSource};
pub use spec::{Backoff, StateSet, WaitSpec};
pub use wait::{classify, wait_for_absence, wait_for_status, Progress};
