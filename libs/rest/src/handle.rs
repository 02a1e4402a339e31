//! Handles to created resources.

use reqwest::StatusCode;

use stratus_envelope::{Fields, ResourceKind};

use crate::client::{ApiResponse, RestClient};
use crate::error::ApiError;

/// One created resource: its kind, its id, and the client that reaches it.
///
/// A handle is minted when a create call succeeds and stays valid until a
/// delete is confirmed. It carries no cached state; every read goes back
/// to the service.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    client: RestClient,
    kind: ResourceKind,
    id: String,
    path: String,
}

impl ResourceHandle {
    /// Builds a handle for a known id under a collection path.
    pub fn new(
        client: RestClient,
        kind: ResourceKind,
        collection: &str,
        id: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let path = format!("{}/{}", collection.trim_end_matches('/'), id);
        Self {
            client,
            kind,
            id,
            path,
        }
    }

    /// Builds a handle from a create response body, reading its `id`.
    pub fn from_create(
        client: RestClient,
        kind: ResourceKind,
        collection: &str,
        body: &Fields,
    ) -> Result<Self, ApiError> {
        let id = body.id()?;
        Ok(Self::new(client, kind, collection, id))
    }

    /// The resource id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The resource kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Path of the resource relative to the endpoint base.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fetches the current resource body.
    pub async fn show(&self) -> Result<ApiResponse<Fields>, ApiError> {
        self.client.show(self.kind, &self.path).await
    }

    /// Pushes changed fields to the resource.
    pub async fn update(
        &self,
        fields: &Fields,
        expected: StatusCode,
    ) -> Result<ApiResponse<Fields>, ApiError> {
        self.client.update(self.kind, &self.path, fields, expected).await
    }

    /// Deletes the resource.
    pub async fn delete(&self, expected: StatusCode) -> Result<ApiResponse<()>, ApiError> {
        self.client.delete(&self.path, expected).await
    }
}
