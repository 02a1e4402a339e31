//! Status sources the poller can watch.

use std::future::Future;

use async_trait::async_trait;

use stratus_envelope::Fields;
use stratus_rest::{ApiError, ResourceHandle};

/// Anything the poller can repeatedly fetch a resource body from.
///
/// The poller owns no transport knowledge. A source is one async call
/// returning the current body or a typed API failure; the poller decides
/// what each outcome means for the wait.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the current resource body.
    async fn latest(&self) -> Result<Fields, ApiError>;
}

#[async_trait]
impl StatusSource for ResourceHandle {
    async fn latest(&self) -> Result<Fields, ApiError> {
        Ok(self.show().await?.body)
    }
}

/// Adapter turning an async closure into a source.
///
/// Useful when the watched state is not one GET away, e.g. a listing that
/// must be filtered first.
pub struct FnSource<F>(F);

impl<F, Fut> FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Fields, ApiError>> + Send,
{
    pub fn new(fetch: F) -> Self {
        Self(fetch)
    }
}

#[async_trait]
impl<F, Fut> StatusSource for FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Fields, ApiError>> + Send,
{
    async fn latest(&self) -> Result<Fields, ApiError> {
        (self.0)().await
    }
}
