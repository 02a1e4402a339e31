//! HTTP client for resource APIs.
//!
//! One generic client covers every service that follows the single-key
//! envelope convention. Callers name the resource kind, the path, and the
//! status the operation is expected to confirm with; anything else coming
//! back is mapped onto the fault taxonomy and returned. The client never
//! retries and never swallows a failure.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use stratus_envelope::{BodyCodec, Fields, JsonEnvelope, ResourceKind};

use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::error::{fault, request_id_of, ApiError};
use crate::handle::ResourceHandle;

/// A decoded response plus the transport facts callers assert on.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// Status the service answered with.
    pub status: StatusCode,
    /// Response headers, verbatim.
    pub headers: HeaderMap,
    /// Decoded body.
    pub body: T,
}

impl<T> ApiResponse<T> {
    /// The request id echoed by the service, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        request_id_of(&self.headers)
    }
}

/// Generic REST resource client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    config: ClientConfig,
    token: Arc<dyn TokenProvider>,
    codec: Arc<dyn BodyCodec>,
}

impl RestClient {
    /// Creates a client speaking the JSON envelope convention.
    pub fn new(config: ClientConfig, token: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        Self::with_codec(config, token, Arc::new(JsonEnvelope))
    }

    /// Creates a client with an explicit body codec.
    pub fn with_codec(
        config: ClientConfig,
        token: Arc<dyn TokenProvider>,
        codec: Arc<dyn BodyCodec>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            token,
            codec,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A handle for an already-known resource id under `collection`.
    #[must_use]
    pub fn handle(
        &self,
        kind: ResourceKind,
        collection: &str,
        id: impl Into<String>,
    ) -> ResourceHandle {
        ResourceHandle::new(self.clone(), kind, collection, id)
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// GET a collection. Services confirm listings with 200 only.
    pub async fn list(
        &self,
        kind: ResourceKind,
        path: &str,
        filters: &[(&str, &str)],
    ) -> Result<ApiResponse<Vec<Fields>>, ApiError> {
        let request = self.http.get(self.url(path)).query(filters);
        let (status, headers, bytes) = self.send(Method::GET, path, request).await?;
        self.expect(StatusCode::OK, status, path, &headers, &bytes)?;

        let body = self.codec.decode_list(kind.plural(), &bytes)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// GET a single resource. Services confirm with 200 only; a missing
    /// resource surfaces as [`ApiError::NotFound`].
    pub async fn show(
        &self,
        kind: ResourceKind,
        path: &str,
    ) -> Result<ApiResponse<Fields>, ApiError> {
        let request = self.http.get(self.url(path));
        let (status, headers, bytes) = self.send(Method::GET, path, request).await?;
        self.expect(StatusCode::OK, status, path, &headers, &bytes)?;

        let body = self.codec.decode(kind.singular(), &bytes)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// POST a new resource. Services answer 200, 201, or 202 depending on
    /// whether creation is synchronous; the caller declares which one
    /// counts as success here.
    pub async fn create(
        &self,
        kind: ResourceKind,
        path: &str,
        fields: &Fields,
        expected: StatusCode,
    ) -> Result<ApiResponse<Fields>, ApiError> {
        let payload = self.codec.encode(kind.singular(), fields)?;
        let request = self
            .http
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, self.codec.content_type())
            .body(payload);
        let (status, headers, bytes) = self.send(Method::POST, path, request).await?;
        self.expect(expected, status, path, &headers, &bytes)?;

        let body = self.codec.decode(kind.singular(), &bytes)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// POST several resources in one call, wrapped under the plural key.
    pub async fn create_bulk(
        &self,
        kind: ResourceKind,
        path: &str,
        items: &[Fields],
        expected: StatusCode,
    ) -> Result<ApiResponse<Vec<Fields>>, ApiError> {
        let payload = self.codec.encode_list(kind.plural(), items)?;
        let request = self
            .http
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, self.codec.content_type())
            .body(payload);
        let (status, headers, bytes) = self.send(Method::POST, path, request).await?;
        self.expect(expected, status, path, &headers, &bytes)?;

        let body = self.codec.decode_list(kind.plural(), &bytes)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// PUT changed fields to an existing resource.
    pub async fn update(
        &self,
        kind: ResourceKind,
        path: &str,
        fields: &Fields,
        expected: StatusCode,
    ) -> Result<ApiResponse<Fields>, ApiError> {
        let payload = self.codec.encode(kind.singular(), fields)?;
        let request = self
            .http
            .put(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, self.codec.content_type())
            .body(payload);
        let (status, headers, bytes) = self.send(Method::PUT, path, request).await?;
        self.expect(expected, status, path, &headers, &bytes)?;

        let body = self.codec.decode(kind.singular(), &bytes)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// DELETE a resource. Deleting something already gone surfaces as
    /// [`ApiError::NotFound`], which teardown flows tolerate.
    pub async fn delete(
        &self,
        path: &str,
        expected: StatusCode,
    ) -> Result<ApiResponse<()>, ApiError> {
        let request = self.http.delete(self.url(path));
        let (status, headers, bytes) = self.send(Method::DELETE, path, request).await?;
        self.expect(expected, status, path, &headers, &bytes)?;

        Ok(ApiResponse {
            status,
            headers,
            body: (),
        })
    }

    /// Sends one request with auth attached and collects the full body.
    async fn send(
        &self,
        method: Method,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), ApiError> {
        let started = Instant::now();
        let response = request
            .header(self.config.auth_header.as_str(), self.token.token())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?.to_vec();

        debug!(
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            request_id = request_id_of(&headers),
            "API call finished"
        );

        Ok((status, headers, bytes))
    }

    /// Confirms the declared status or maps the response onto a fault.
    fn expect(
        &self,
        expected: StatusCode,
        actual: StatusCode,
        path: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(), ApiError> {
        if actual == expected {
            return Ok(());
        }

        let err = fault(expected, actual, headers, body);
        warn!(
            path,
            expected = expected.as_u16(),
            actual = actual.as_u16(),
            error = %err,
            "API call returned unexpected status"
        );
        Err(err)
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.config.base_url)
            .field("auth_header", &self.config.auth_header)
            .finish_non_exhaustive()
    }
}
