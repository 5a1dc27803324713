//! HTTP fetcher for subscription payloads
//!
//! One GET per source with a fixed custom user-agent. Fetches are
//! single attempts: every user-triggered run is one try per source, and
//! failures are reported through the per-source outcome instead of
//! being retried. The [`Fetch`] trait is the seam tests use to
//! substitute a scripted fetcher.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::FetchConfig;

/// Errors that can occur while fetching a subscription payload
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (DNS, connection refused, protocol)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-success response status
    #[error("Server returned status {0}")]
    Status(u16),

    /// URL failed the pre-fetch well-formedness check
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Payload retrieval capability
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the response body for `url`
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Reqwest-backed fetcher used in production
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Create a fetcher with default configuration
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(&crate::config::Config::default().fetch)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::Http)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = HttpFetcher::with_defaults();
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(FetchError::Status(404).to_string(), "Server returned status 404");
        assert_eq!(FetchError::Timeout.to_string(), "Request timeout");
        assert!(FetchError::InvalidUrl("x".into()).to_string().contains("Invalid URL"));
    }
}
