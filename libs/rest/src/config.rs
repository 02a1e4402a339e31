//! Configuration for the REST client.

use std::time::Duration;

/// Default header carrying the auth token.
pub const DEFAULT_AUTH_HEADER: &str = "X-Auth-Token";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// REST client configuration.
///
/// Built explicitly by the caller or loaded from the environment; there is
/// no process-wide configuration object behind it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service endpoint, without a trailing slash.
    pub base_url: String,

    /// Name of the header carrying the auth token.
    pub auth_header: String,

    /// Per-request timeout, covering connect through body read.
    pub timeout: Duration,

    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration for the given endpoint with default
    /// header, timeout, and user agent.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var("STRATUS_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8774".to_string());

        let auth_header = std::env::var("STRATUS_AUTH_HEADER")
            .unwrap_or_else(|_| DEFAULT_AUTH_HEADER.to_string());

        let timeout = std::env::var("STRATUS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
            timeout,
            ..Self::default()
        }
    }

    /// Overrides the auth header name.
    #[must_use]
    pub fn with_auth_header(mut self, name: impl Into<String>) -> Self {
        self.auth_header = name.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8774".to_string(),
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("stratus/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
