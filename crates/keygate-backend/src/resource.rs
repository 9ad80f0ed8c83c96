//! Authenticated access to the backend HTTP API.

use std::fmt::Display;

use reqwest::{Client, header::ACCEPT};
use serde_json::Value;
use url::Url;

/// Collection of all categories; each record carries at least a `name`.
pub const CATEGORIES_PATH: &str = "/backend/categories";

/// Echoes the claims of the caller's token.
pub const PROFILE_PATH: &str = "/backend/require/auth";

/// Path of a single category's items.
pub fn category_path(id: impl Display) -> String {
    format!("/backend/category/{id}")
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("refusing to send a request without a bearer token")]
    EmptyToken,
    #[error("invalid resource path {path:?}: {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Issues bearer-authenticated GET requests against the backend origin.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    origin: Url,
}

impl ResourceClient {
    pub fn new(http: Client, origin: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            origin: Url::parse(origin)?,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Fetches `path` and returns its parsed JSON body as-is.
    ///
    /// There is no retry and no timeout. A non-success status is not an error
    /// by itself: its body is parsed and returned like any other.
    pub async fn fetch_resource(&self, path: &str, token: &str) -> Result<Value, ResourceError> {
        if token.is_empty() {
            return Err(ResourceError::EmptyToken);
        }

        let url = self
            .origin
            .join(path)
            .map_err(|source| ResourceError::InvalidPath {
                path: path.to_owned(),
                source,
            })?;

        log::debug!("Calling fetch for {url}");
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{path} answered with {status}");
        }

        let body = response.bytes().await?;
        log::debug!("Fetch of {path} done, decoding {} bytes", body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}
