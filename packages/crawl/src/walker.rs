//! Paginated listing walker.
//!
//! Reads listing pages `start_page, start_page + 1, ...` one at a time and
//! accumulates the `(link, title)` entries found on each. The walk stops at
//! the first of these conditions, checked in this order:
//!
//! 1. the bounded end page has been read,
//! 2. a page fetch fails,
//! 3. a page yields no entries,
//! 4. a page yields the same set of entries as the page before it (the site
//!    keeps serving its last page for out-of-range page numbers).
//!
//! A fetch failure is never raised: the entries gathered so far are
//! returned together with the reason the walk stopped.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use series_tv_scraper::html::Page;
use series_tv_scraper::progress::ProgressCallback;
use series_tv_scraper::Fetcher;
use series_tv_series_models::Series;

use crate::config::ListingSite;
use crate::extract::listing_entries;

/// Which pages to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// First page (inclusive).
    pub start_page: u32,
    /// Last page (inclusive); `None` walks until another condition stops it.
    pub end_page: Option<u32>,
    /// Pause between page requests.
    pub delay_ms: Option<u64>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: Some(crate::config::DEFAULT_END_PAGE),
            delay_ms: None,
        }
    }
}

/// Why a walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Every page up to the bounded end page was read.
    EndPageReached,
    /// Fetching `page` failed.
    FetchFailed { page: u32, error: String },
    /// `page` had no entries.
    EmptyPage { page: u32 },
    /// `page` repeated the previous page's entries.
    RepeatedPage { page: u32 },
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndPageReached => write!(f, "end page reached"),
            Self::FetchFailed { page, error } => write!(f, "page {page} failed: {error}"),
            Self::EmptyPage { page } => write!(f, "page {page} is empty"),
            Self::RepeatedPage { page } => write!(f, "page {page} repeats the previous page"),
        }
    }
}

/// Result of a walk.
#[derive(Debug, Clone)]
pub struct Walk {
    /// Entries in page-encounter order.
    pub items: Vec<Series>,
    /// Number of listing fetches issued, including a failed one.
    pub pages_requested: u32,
    /// Last page whose entries were kept, if any.
    pub last_page_with_items: Option<u32>,
    pub stop: StopReason,
}

/// Walks the listing starting at `options.start_page`.
///
/// Pages are fetched strictly in increasing order, once each. `progress`
/// receives one increment per page.
pub async fn walk<F: Fetcher>(
    fetcher: &F,
    site: &ListingSite,
    options: WalkOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Walk {
    let mut items = Vec::new();
    let mut previous: Option<BTreeSet<(String, Option<String>)>> = None;
    let mut last_page_with_items = None;
    let mut pages_requested = 0;
    let mut page = options.start_page;

    let stop = loop {
        if options.end_page.is_some_and(|end| page > end) {
            break StopReason::EndPageReached;
        }

        if let Some(delay) = options.delay_ms.filter(|_| pages_requested > 0) {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let url = site.page_url(page);
        log::info!("Reading listing page {page}");
        progress.set_message(format!("listing page {page}"));
        pages_requested += 1;

        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Listing page {page} failed, stopping walk: {e}");
                break StopReason::FetchFailed {
                    page,
                    error: e.to_string(),
                };
            }
        };
        let entries = listing_entries(&Page::parse(&body), site);
        progress.inc(1);

        if entries.is_empty() {
            log::info!("Listing page {page} has no series, stopping walk");
            break StopReason::EmptyPage { page };
        }

        let keys: BTreeSet<_> = entries
            .iter()
            .map(|s| (s.link.clone(), s.title.clone()))
            .collect();
        if previous.as_ref() == Some(&keys) {
            log::info!("Listing page {page} repeats page {}, stopping walk", page - 1);
            break StopReason::RepeatedPage { page };
        }

        log::debug!("Listing page {page}: {} series", entries.len());
        items.extend(entries);
        previous = Some(keys);
        last_page_with_items = Some(page);

        let Some(next) = page.checked_add(1) else {
            break StopReason::EndPageReached;
        };
        page = next;
    };

    progress.finish(format!("{} series from {pages_requested} pages ({stop})", items.len()));

    Walk {
        items,
        pages_requested,
        last_page_with_items,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use series_tv_scraper::progress::null_progress;

    use super::*;
    use crate::extract::fixtures::listing_html;
    use crate::stub::StubFetcher;

    const LISTING: &str = "https://www.sensacine.com/series-tv/";

    fn site() -> ListingSite {
        ListingSite::new("https://www.sensacine.com/", "series-tv/").unwrap()
    }

    fn page_url(page: u32) -> String {
        format!("{LISTING}?page={page}")
    }

    fn unbounded() -> WalkOptions {
        WalkOptions {
            start_page: 1,
            end_page: None,
            delay_ms: None,
        }
    }

    #[tokio::test]
    async fn stops_on_repeated_page() {
        let same = listing_html(&[("/series/a/", "A"), ("/series/b/", "B")]);
        let fetcher = StubFetcher::new()
            .with_page(&page_url(1), &same)
            .with_page(&page_url(2), &same);

        let walk = walk(&fetcher, &site(), unbounded(), &null_progress()).await;

        assert_eq!(walk.items.len(), 2);
        assert_eq!(walk.stop, StopReason::RepeatedPage { page: 2 });
        assert_eq!(walk.last_page_with_items, Some(1));
        assert_eq!(fetcher.requests(), vec![page_url(1), page_url(2)]);
    }

    #[tokio::test]
    async fn reordered_repeat_is_still_a_repeat() {
        let fetcher = StubFetcher::new()
            .with_page(&page_url(1), &listing_html(&[("/a/", "A"), ("/b/", "B")]))
            .with_page(&page_url(2), &listing_html(&[("/b/", "B"), ("/a/", "A")]));

        let walk = walk(&fetcher, &site(), unbounded(), &null_progress()).await;
        assert_eq!(walk.items.len(), 2);
        assert_eq!(walk.stop, StopReason::RepeatedPage { page: 2 });
    }

    #[tokio::test]
    async fn stops_on_empty_page_without_reading_further() {
        let fetcher = StubFetcher::new()
            .with_page(&page_url(1), &listing_html(&[("/a/", "A")]))
            .with_page(&page_url(2), &listing_html(&[("/b/", "B")]))
            .with_page(&page_url(3), &listing_html(&[]))
            .with_page(&page_url(4), &listing_html(&[("/c/", "C")]));

        let walk = walk(&fetcher, &site(), unbounded(), &null_progress()).await;

        let titles: Vec<_> = walk.items.iter().filter_map(|s| s.title.as_deref()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(walk.stop, StopReason::EmptyPage { page: 3 });
        assert_eq!(walk.pages_requested, 3);
        assert!(!fetcher.requests().contains(&page_url(4)));
    }

    #[tokio::test]
    async fn fetch_failure_keeps_accumulated_items() {
        let fetcher = StubFetcher::new()
            .with_page(&page_url(1), &listing_html(&[("/a/", "A")]))
            .with_failure(&page_url(2), 503);

        let walk = walk(&fetcher, &site(), unbounded(), &null_progress()).await;

        assert_eq!(walk.items.len(), 1);
        assert!(matches!(walk.stop, StopReason::FetchFailed { page: 2, .. }));
        assert_eq!(walk.last_page_with_items, Some(1));
    }

    #[tokio::test]
    async fn bounded_walk_stops_at_end_page() {
        let fetcher = StubFetcher::new()
            .with_page(&page_url(2), &listing_html(&[("/a/", "A")]))
            .with_page(&page_url(3), &listing_html(&[("/b/", "B")]))
            .with_page(&page_url(4), &listing_html(&[("/c/", "C")]));

        let options = WalkOptions {
            start_page: 2,
            end_page: Some(3),
            delay_ms: None,
        };
        let walk = walk(&fetcher, &site(), options, &null_progress()).await;

        assert_eq!(walk.items.len(), 2);
        assert_eq!(walk.stop, StopReason::EndPageReached);
        assert_eq!(fetcher.requests(), vec![page_url(2), page_url(3)]);
    }

    #[tokio::test]
    async fn start_past_end_fetches_nothing() {
        let fetcher = StubFetcher::new();
        let options = WalkOptions {
            start_page: 5,
            end_page: Some(4),
            delay_ms: None,
        };
        let walk = walk(&fetcher, &site(), options, &null_progress()).await;
        assert!(walk.items.is_empty());
        assert_eq!(walk.pages_requested, 0);
        assert!(fetcher.requests().is_empty());
    }
}
