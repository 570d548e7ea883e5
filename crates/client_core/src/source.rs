use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::ListingFilter,
    error::ListingDecodeError,
    protocol::{decode_listings, Listing},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://mars.udacity.com/";
const LISTINGS_PATH: &str = "realestate";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid listings base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("listings request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("listings service responded with {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Decode(#[from] ListingDecodeError),
}

/// Anything that can produce the listings for a filter.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, FetchError>;
}

/// Reads listings from the remote service with one GET per fetch.
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    http: Client,
    endpoint: Url,
}

impl HttpListingSource {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Transport)?;
        Self::with_client(base_url, http)
    }

    pub fn with_client(base_url: &str, http: Client) -> Result<Self, FetchError> {
        Ok(Self {
            http,
            endpoint: listings_endpoint(base_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, FetchError> {
        debug!(endpoint = %self.endpoint, %filter, "requesting listings");
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("filter", filter.query_value())])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        Ok(decode_listings(&body)?)
    }
}

fn listings_endpoint(base_url: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut base = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
    }

    // Url::join replaces the last path segment unless the base ends in '/'.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);

    base.join(LISTINGS_PATH).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
