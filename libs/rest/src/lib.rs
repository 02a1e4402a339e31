//! # stratus-rest
//!
//! Generic REST resource client for the stratus harness.
//!
//! The services under test expose near-identical CRUD surfaces: bodies
//! wrapped under a single resource key, success confirmed by one expected
//! status, faults reported as `{"<faultKind>": {"message": ...}}`. This
//! crate implements that surface once, parameterized by resource kind, so
//! per-service clients reduce to paths and expected statuses.
//!
//! ## Design Principles
//!
//! - The caller declares the expected status; anything else is a typed
//!   fault, never a retry and never a silent pass
//! - Fault kinds mirror what tests assert on: bad request, unauthorized,
//!   forbidden, not found, conflict, over limit
//! - Request ids echoed by the service ride along on responses and faults
//! - No process-wide state: a client owns its configuration and token

mod auth;
mod client;
mod config;
mod error;
mod handle;

pub use auth::{StaticToken, TokenProvider};
pub use client::{ApiResponse, RestClient};
pub use config::{ClientConfig, DEFAULT_AUTH_HEADER, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use handle::ResourceHandle;

pub use reqwest::StatusCode;
