#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! TV series crawl: listing walk, detail enrichment and table building.
//!
//! [`run`] drives a whole crawl against any [`Fetcher`]:
//!
//! 1. [`walker::walk`] reads the paginated listing and collects every
//!    series link and title,
//! 2. [`enrich::enrich_all`] completes each series from its detail page,
//! 3. the results are normalized into a [`SeriesTable`].
//!
//! Page-level problems (a failed listing page, a failed detail page) are
//! logged and reflected in the returned [`CrawlOutcome`]; only a crawl that
//! finds nothing at all is an error.

pub mod config;
pub mod enrich;
pub mod extract;
pub mod walker;

#[cfg(test)]
mod stub;

use std::path::PathBuf;
use std::sync::Arc;

use series_tv_scraper::progress::{ProgressCallback, null_progress};
use series_tv_scraper::Fetcher;
use series_tv_series_models::Series;
use series_tv_table::{SeriesTable, SnapshotConfig};

pub use config::{CrawlConfig, ListingSite, load_config};
pub use enrich::{EnrichFailure, EnrichOptions, EnrichReport};
pub use walker::{StopReason, Walk, WalkOptions};

/// Errors that can occur while crawling.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The listing walk found no series at all.
    #[error("No series found on the listing ({stop})")]
    EmptyResult {
        /// Why the walk ended.
        stop: StopReason,
    },

    /// The crawl configuration is invalid.
    #[error("Invalid crawl configuration: {0}")]
    Config(String),

    /// I/O error (reading the config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress sinks for the two phases of a crawl.
#[derive(Clone)]
pub struct CrawlProgress {
    /// One increment per listing page.
    pub pages: Arc<dyn ProgressCallback>,
    /// One increment per detail page.
    pub items: Arc<dyn ProgressCallback>,
}

impl Default for CrawlProgress {
    fn default() -> Self {
        Self {
            pages: null_progress(),
            items: null_progress(),
        }
    }
}

/// Everything a finished crawl produced.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Enriched series in listing order.
    pub series: Vec<Series>,
    /// The normalized table built from `series`.
    pub table: SeriesTable,
    /// Why the listing walk ended.
    pub stop: StopReason,
    /// Number of listing fetches issued.
    pub pages_requested: u32,
    pub start_page: u32,
    /// Last listing page whose series were kept.
    pub last_page: u32,
    /// The bounded end page, if the walk was bounded.
    pub end_page: Option<u32>,
    /// Series whose detail page could not be read.
    pub failures: Vec<EnrichFailure>,
}

impl CrawlOutcome {
    /// Page-range snapshot path for this crawl.
    ///
    /// A bounded crawl is named after its requested end page; an unbounded
    /// one after the last page that yielded series.
    #[must_use]
    pub fn snapshot_path(&self, snapshot: &SnapshotConfig) -> PathBuf {
        let end = self.end_page.unwrap_or(self.last_page);
        snapshot.range_path(self.start_page, end)
    }
}

/// Crawls the listing configured in `config` and builds the series table.
///
/// # Errors
///
/// Returns [`CrawlError::Config`] if the site URLs are invalid, or
/// [`CrawlError::EmptyResult`] if the listing yields no series.
pub async fn run<F: Fetcher>(
    fetcher: &F,
    config: &CrawlConfig,
    progress: &CrawlProgress,
) -> Result<CrawlOutcome, CrawlError> {
    let site = config.site()?;
    let walk_options = WalkOptions {
        start_page: config.start_page,
        end_page: config.end_page(),
        delay_ms: config.delay_ms,
    };

    log::info!(
        "Walking {} from page {} to {}",
        site.listing_url(),
        walk_options.start_page,
        walk_options
            .end_page
            .map_or_else(|| "the last page".to_string(), |p| p.to_string())
    );
    let Walk {
        mut items,
        pages_requested,
        last_page_with_items,
        stop,
    } = walker::walk(fetcher, &site, walk_options, &progress.pages).await;

    let Some(last_page) = last_page_with_items.filter(|_| !items.is_empty()) else {
        return Err(CrawlError::EmptyResult { stop });
    };
    log::info!(
        "Found {} series on {pages_requested} listing pages; reading detail pages",
        items.len()
    );

    let enrich_options = EnrichOptions {
        concurrency: config.concurrency,
        delay_ms: config.delay_ms,
    };
    let report = enrich::enrich_all(fetcher, &mut items, enrich_options, &progress.items).await;
    if !report.failures.is_empty() {
        log::warn!(
            "{} of {} detail pages could not be read",
            report.failures.len(),
            items.len()
        );
    }

    let table = SeriesTable::from_series(&items);
    log::info!("Crawl finished: {} series", table.len());

    Ok(CrawlOutcome {
        series: items,
        table,
        stop,
        pages_requested,
        start_page: config.start_page,
        last_page,
        end_page: walk_options.end_page,
        failures: report.failures,
    })
}
