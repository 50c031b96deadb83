//! Crawl configuration.
//!
//! Everything the walker, the enricher and the snapshot sink need is passed
//! in explicitly as a [`CrawlConfig`]. Values come from the defaults below,
//! optionally overridden by a TOML file and then by CLI flags:
//!
//! ```toml
//! base_url = "https://www.sensacine.com/"
//! listing_path = "series-tv/"
//! start_page = 1
//! end_page = 150        # 0 walks until the listing runs out
//! concurrency = 1
//! delay_ms = 250
//!
//! [fetch]
//! request_timeout_secs = 30
//! max_retries = 3
//!
//! [snapshot]
//! data_dir = "data"
//! ```

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;
use series_tv_scraper::FetchConfig;
use series_tv_table::SnapshotConfig;

use crate::CrawlError;

/// Default last listing page to read.
pub const DEFAULT_END_PAGE: u32 = 150;

/// Complete configuration of a crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Site root; listing hrefs are resolved against it.
    pub base_url: String,
    /// Path of the series listing, relative to `base_url`.
    pub listing_path: String,
    /// First listing page to read (inclusive).
    pub start_page: u32,
    /// Last listing page to read (inclusive). `0` or absent means unbounded.
    pub end_page: Option<u32>,
    /// Maximum number of detail pages fetched at once.
    pub concurrency: usize,
    /// Fixed pause between sequential requests, in milliseconds.
    pub delay_ms: Option<u64>,
    /// HTTP settings.
    pub fetch: FetchConfig,
    /// Snapshot location and naming.
    pub snapshot: SnapshotConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sensacine.com/".to_string(),
            listing_path: "series-tv/".to_string(),
            start_page: 1,
            end_page: Some(DEFAULT_END_PAGE),
            concurrency: 1,
            delay_ms: None,
            fetch: FetchConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl CrawlConfig {
    /// Returns the last page to read, or `None` when unbounded.
    #[must_use]
    pub fn end_page(&self) -> Option<u32> {
        self.end_page.filter(|&page| page > 0)
    }

    /// Resolves the listing location.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Config`] if `base_url` or `listing_path` is not
    /// a valid URL.
    pub fn site(&self) -> Result<ListingSite, CrawlError> {
        ListingSite::new(&self.base_url, &self.listing_path)
    }
}

/// The listing's location on the target site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSite {
    base: Url,
    listing_url: String,
}

impl ListingSite {
    /// Joins `listing_path` onto `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Config`] if either part is not a valid URL.
    pub fn new(base_url: &str, listing_path: &str) -> Result<Self, CrawlError> {
        let base = Url::parse(base_url)
            .map_err(|e| CrawlError::Config(format!("invalid base_url '{base_url}': {e}")))?;
        let listing = base.join(listing_path).map_err(|e| {
            CrawlError::Config(format!("invalid listing_path '{listing_path}': {e}"))
        })?;
        Ok(Self {
            base,
            listing_url: listing.to_string(),
        })
    }

    /// The listing URL without a page parameter.
    #[must_use]
    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    /// URL of listing page `page`: `<listing_url>?page=<page>`.
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        format!("{}?page={page}", self.listing_url)
    }

    /// Resolves a (possibly relative) href found on the site to an absolute
    /// URL.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<String> {
        self.base.join(href).ok().map(|url| url.to_string())
    }
}

/// Parses a TOML crawl configuration. Missing keys take their defaults.
///
/// # Errors
///
/// Returns [`CrawlError::Config`] if the TOML is malformed.
pub fn parse_config(toml_str: &str) -> Result<CrawlConfig, CrawlError> {
    toml::de::from_str(toml_str).map_err(|e| CrawlError::Config(e.to_string()))
}

/// Loads the configuration from `path`, or the defaults when `path` is
/// `None`.
///
/// # Errors
///
/// Returns [`CrawlError`] if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<CrawlConfig, CrawlError> {
    let Some(path) = path else {
        return Ok(CrawlConfig::default());
    };
    log::info!("Loading crawl configuration from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}
