//! Auth token wiring.
//!
//! Tokens are opaque strings minted elsewhere; the client asks a provider
//! for the current value on every request, so rotation never requires
//! rebuilding the client.

use std::fmt;

/// Supplies the auth token attached to every request.
pub trait TokenProvider: Send + Sync {
    /// The current token value.
    fn token(&self) -> String;
}

/// A fixed token, handed out verbatim.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> String {
        self.0.clone()
    }
}

// Token values stay out of Debug output and logs.
impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}
