//! HTTP implementation of [`Fetcher`].

use crate::retry;
use crate::{FetchConfig, Fetcher, ScrapeError};

/// Fetches pages over HTTP with a shared [`reqwest::Client`].
///
/// Every request carries the configured timeout and headers; transient
/// failures are retried (see [`retry::send_text`]).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl HttpFetcher {
    /// Builds a fetcher from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if a header name or value is invalid,
    /// or [`ScrapeError::Http`] if the client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self, ScrapeError> {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in &config.headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ScrapeError::Config(format!("invalid header name '{key}': {e}")))?;
            let val = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| ScrapeError::Config(format!("invalid header value '{value}': {e}")))?;
            header_map.insert(name, val);
        }

        let client = reqwest::Client::builder()
            .default_headers(header_map)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        log::debug!("GET {url}");
        retry::send_text(|| self.client.get(url), self.max_retries).await
    }
}
