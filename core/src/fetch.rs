//! Resource Client and Partial-Collection Fetcher.
//!
//! # Design
//! `ResourceClient::fetch_resource` surfaces every failure to its caller.
//! `ResourceClient::fetch_collection` is for title-scoped collections that
//! may legitimately be missing: any failure collapses to
//! `CollectionOutcome::Absent` and is only logged.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::parse_json;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Result of a collection fetch that is allowed to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome<T> {
    /// Fetched; possibly empty.
    Present(Vec<T>),
    /// Not fetched, or the fetch failed.
    Absent,
}

impl<T> CollectionOutcome<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, CollectionOutcome::Present(_))
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            CollectionOutcome::Present(items) => items,
            CollectionOutcome::Absent => &[],
        }
    }

    pub fn into_option(self) -> Option<Vec<T>> {
        match self {
            CollectionOutcome::Present(items) => Some(items),
            CollectionOutcome::Absent => None,
        }
    }
}

/// Executes requests through a `Transport` and decodes JSON replies.
#[derive(Debug, Clone)]
pub struct ResourceClient<T> {
    transport: T,
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One round-trip, no retries. Non-2xx responses are returned as data.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(method, %path, status = response.status, "request settled");
                Ok(response)
            }
            Err(e) => {
                debug!(method, %path, error = %e, "request failed");
                Err(e)
            }
        }
    }

    /// `method` on `path` with an optional JSON body, decoding a 2xx reply
    /// as `R`.
    pub async fn fetch_resource<R, B>(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<&B>,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (headers, body) = match body {
            Some(body) => {
                let json = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
                (vec![("content-type".to_string(), "application/json".to_string())], Some(json))
            }
            None => (Vec::new(), None),
        };
        let request = HttpRequest {
            method,
            path: path.to_string(),
            headers,
            body,
        };
        self.send(request).await
    }

    /// Executes a prepared request and decodes a 2xx reply as `R`.
    pub async fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        parse_json(response)
    }

    /// GET a collection; every failure becomes `Absent`.
    pub async fn fetch_collection<R: DeserializeOwned>(&self, request: HttpRequest) -> CollectionOutcome<R> {
        let path = request.path.clone();
        match self.send::<Vec<R>>(request).await {
            Ok(items) => CollectionOutcome::Present(items),
            Err(e) => {
                warn!(%path, error = %e, "collection unavailable, treating as absent");
                CollectionOutcome::Absent
            }
        }
    }
}
