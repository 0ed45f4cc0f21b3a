use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::StreamError;

/// Where a video lives, as reported by the lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceLocation(PathBuf);

impl ResourceLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ResourceLocation(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Bearer token of the caller, forwarded verbatim to the lookup service.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        BearerToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Resolves a video id to the location of its bytes.
///
/// Any failure aborts the request before a read is attempted.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    async fn locate(&self, resource_id: i64, auth: Option<&BearerToken>) -> Result<ResourceLocation, StreamError>;
}

/// Response body of the video service's path endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoPath {
    pub path: String,
}

#[derive(Error, Debug)]
pub enum LookupClientError {
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("{base_url} cannot be used as the video service base URL: {reason}")]
    BaseUrl { base_url: Url, reason: String },
}

/// Asks the video service for `GET <base>/video/path?videoId=<id>`.
#[derive(Debug, Clone)]
pub struct HttpResourceLookup {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpResourceLookup {
    /// Builds a client that gives up on the video service after `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, LookupClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, mut base_url: Url) -> Result<Self, LookupClientError> {
        if base_url.cannot_be_a_base() {
            return Err(LookupClientError::BaseUrl { base_url, reason: "not a hierarchical URL".into() });
        }
        // without a trailing slash `join` would replace the last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let endpoint = base_url
            .join("video/path")
            .map_err(|e| LookupClientError::BaseUrl { reason: e.to_string(), base_url: base_url.clone() })?;
        Ok(HttpResourceLookup { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ResourceLookup for HttpResourceLookup {
    #[instrument(level = "debug", skip(self, auth), fields(endpoint = %self.endpoint))]
    async fn locate(&self, resource_id: i64, auth: Option<&BearerToken>) -> Result<ResourceLocation, StreamError> {
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("videoId", resource_id)]);
        if let Some(token) = auth {
            request = request.bearer_auth(token.as_str());
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StreamError::lookup(resource_id, e))?;
        let VideoPath { path } = response
            .json()
            .await
            .map_err(|e| StreamError::lookup(resource_id, e))?;

        if path.is_empty() {
            return Err(StreamError::lookup(resource_id, "video service returned an empty path"));
        }
        debug!(path = %path, "located video");
        Ok(ResourceLocation::new(path))
    }
}

/// Fixed id to path table, for deployments without a video service.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceLookup {
    locations: HashMap<i64, PathBuf>,
}

impl StaticResourceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource_id: i64, path: impl Into<PathBuf>) -> &mut Self {
        self.locations.insert(resource_id, path.into());
        self
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<(i64, P)> for StaticResourceLookup {
    fn from_iter<I: IntoIterator<Item = (i64, P)>>(iter: I) -> Self {
        let locations = iter.into_iter().map(|(id, path)| (id, path.into())).collect();
        StaticResourceLookup { locations }
    }
}

#[async_trait]
impl ResourceLookup for StaticResourceLookup {
    async fn locate(&self, resource_id: i64, _auth: Option<&BearerToken>) -> Result<ResourceLocation, StreamError> {
        self.locations
            .get(&resource_id)
            .map(ResourceLocation::new)
            .ok_or_else(|| StreamError::lookup(resource_id, "unknown video id"))
    }
}
