#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page fetching and HTML document access for the series crawler.
//!
//! Provides the [`Fetcher`] trait (given a URL, return the page body or
//! fail), an HTTP implementation with timeouts and retry ([`http`]), and the
//! narrow parsed-document interface ([`html::Page`], [`html::Region`]) that
//! every field extractor consumes.
//!
//! This crate knows nothing about series: selectors and field semantics
//! live in the crawl crate.

pub mod html;
pub mod http;
pub mod progress;
pub mod retry;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur while fetching a page.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP {status} for {url}")]
    Status {
        /// The requested URL.
        url: String,
        /// The response status code.
        status: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error("Timed out fetching {url}")]
    Timeout {
        /// The requested URL.
        url: String,
    },

    /// The fetcher was configured with an invalid value (header, etc.).
    #[error("Invalid fetch configuration: {0}")]
    Config(String),
}

/// Settings shared by every HTTP request the crawler makes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of retries for transient failures (0 disables retrying).
    pub max_retries: u32,
    /// Additional HTTP headers to include in requests.
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("series_tv/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            max_retries: 3,
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Fetches the body of a page.
///
/// Implementations return the raw HTML; callers parse it with
/// [`html::Page::parse`]. A failed fetch (transport error, timeout, non-2xx
/// status) is an `Err`, never an empty body.
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the request fails or the server answers
    /// with a non-success status.
    fn fetch(&self, url: &str)
    -> impl std::future::Future<Output = Result<String, ScrapeError>> + Send;
}
