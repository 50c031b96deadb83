//! Detail-page enrichment.
//!
//! Each series found on the listing is completed from its own detail page.
//! A failed fetch leaves that series with only its link and title; the rest
//! of the batch carries on.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use series_tv_scraper::html::Page;
use series_tv_scraper::progress::ProgressCallback;
use series_tv_scraper::{Fetcher, ScrapeError};
use series_tv_series_models::Series;

use crate::extract::apply_detail;

/// How detail pages are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Maximum number of detail fetches in flight. `0` is treated as `1`.
    pub concurrency: usize,
    /// Pause before each detail fetch after the first.
    pub delay_ms: Option<u64>,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            delay_ms: None,
        }
    }
}

/// A series whose detail page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichFailure {
    pub link: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    /// Number of series whose detail page was read.
    pub enriched: usize,
    /// Series left at their listing attributes, in input order.
    pub failures: Vec<EnrichFailure>,
}

/// Fetches `series`' detail page and fills in every attribute it provides.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the detail page cannot be fetched. `series` is
/// left untouched in that case.
pub async fn enrich<F: Fetcher>(fetcher: &F, series: &mut Series) -> Result<(), ScrapeError> {
    let body = fetcher.fetch(&series.link).await?;
    apply_detail(series, &Page::parse(&body));
    Ok(())
}

/// Enriches every series in `items`.
///
/// Up to `options.concurrency` detail pages are fetched at once; results
/// are applied in input order and each series is filled from exactly one
/// page. Failures are logged and reported, never raised.
pub async fn enrich_all<F: Fetcher>(
    fetcher: &F,
    items: &mut [Series],
    options: EnrichOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> EnrichReport {
    let mut report = EnrichReport::default();
    progress.set_total(items.len() as u64);

    let links: Vec<String> = items.iter().map(|s| s.link.clone()).collect();
    let mut fetches = futures::stream::iter(links.into_iter().enumerate())
        .map(|(index, link)| async move {
            if let Some(delay) = options.delay_ms.filter(|_| index > 0) {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            let result = fetcher.fetch(&link).await;
            (index, link, result)
        })
        .buffered(options.concurrency.max(1));

    while let Some((index, link, result)) = fetches.next().await {
        match result {
            Ok(body) => {
                if let Some(series) = items.get_mut(index) {
                    apply_detail(series, &Page::parse(&body));
                    log::info!("{series}");
                }
                report.enriched += 1;
            }
            Err(e) => {
                log::warn!("Could not read detail page {link}: {e}");
                report.failures.push(EnrichFailure {
                    link,
                    error: e.to_string(),
                });
            }
        }
        progress.inc(1);
    }

    progress.finish(format!(
        "{} series enriched, {} failed",
        report.enriched,
        report.failures.len()
    ));
    report
}

#[cfg(test)]
mod tests {
    use series_tv_scraper::progress::null_progress;
    use series_tv_series_models::{
        NUMBER_PLACEHOLDER, UNAVAILABLE_PLACEHOLDER, UNKNOWN_PLACEHOLDER, YEAR_PLACEHOLDER,
    };
    use series_tv_table::SeriesTable;

    use super::*;
    use crate::extract::fixtures::detail_html;
    use crate::stub::StubFetcher;

    fn items(links: &[&str]) -> Vec<Series> {
        links
            .iter()
            .map(|l| Series::new(*l, Some(l.to_uppercase())))
            .collect()
    }

    fn stub_for(links: &[&str], failing: &str) -> StubFetcher {
        links.iter().fold(StubFetcher::new(), |stub, link| {
            if *link == failing {
                stub.with_failure(link, 500)
            } else {
                stub.with_page(link, &detail_html(&["Drama"], "2015 - 2019", "4,1", &["Netflix"]))
            }
        })
    }

    #[tokio::test]
    async fn single_enrich_fills_fields() {
        let fetcher = stub_for(&["https://x.test/a"], "");
        let mut series = Series::new("https://x.test/a", None);
        enrich(&fetcher, &mut series).await.unwrap();
        assert_eq!(series.genres, vec!["Drama"]);
        assert_eq!(series.rating, Some(4.1));
    }

    #[tokio::test]
    async fn single_enrich_failure_leaves_series_untouched() {
        let fetcher = stub_for(&["https://x.test/a"], "https://x.test/a");
        let mut series = Series::new("https://x.test/a", Some("A".to_string()));
        let before = series.clone();
        assert!(enrich(&fetcher, &mut series).await.is_err());
        assert_eq!(series, before);
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_siblings() {
        let links = ["https://x.test/1", "https://x.test/2", "https://x.test/3"];
        let fetcher = stub_for(&links, links[1]);
        let mut batch = items(&links);

        let report =
            enrich_all(&fetcher, &mut batch, EnrichOptions::default(), &null_progress()).await;

        assert_eq!(report.enriched, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].link, links[1]);

        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].genres, vec!["Drama"]);
        assert!(batch[1].is_bare());
        assert_eq!(batch[1].title.as_deref(), Some("HTTPS://X.TEST/2"));
        assert_eq!(batch[2].available_on, vec!["Netflix"]);
        assert_eq!(fetcher.requests(), links.to_vec());

        let table = SeriesTable::from_series(&batch);
        assert_eq!(table.len(), 3);
        let [first, failed, third] = table.rows.as_slice() else {
            panic!("expected three rows");
        };
        assert_eq!(failed.link, links[1]);
        assert_eq!(failed.title, "HTTPS://X.TEST/2");
        assert_eq!(failed.title_original, UNKNOWN_PLACEHOLDER);
        assert_eq!(failed.genres, UNAVAILABLE_PLACEHOLDER);
        assert_eq!(failed.available_on, UNAVAILABLE_PLACEHOLDER);
        assert_eq!(failed.season_count, NUMBER_PLACEHOLDER);
        assert_eq!(failed.air_year_start, YEAR_PLACEHOLDER);
        assert_eq!(failed.rating, None);
        for row in [first, third] {
            assert_eq!(row.genres, "Drama");
            assert_eq!(row.season_count, 3);
            assert_eq!(row.air_year_end, 2019);
            assert_eq!(row.rating, Some(4.1));
            assert_eq!(row.available_on, "Netflix");
        }
    }

    #[tokio::test]
    async fn concurrent_batch_applies_in_input_order() {
        let links: Vec<String> = (0..8).map(|i| format!("https://x.test/{i}")).collect();
        let fetcher = links.iter().enumerate().fold(StubFetcher::new(), |stub, (i, link)| {
            stub.with_page(link, &detail_html(&["Drama"], "2010", &format!("{i},0"), &[]))
        });
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let mut batch = items(&link_refs);

        let options = EnrichOptions {
            concurrency: 4,
            delay_ms: None,
        };
        let report = enrich_all(&fetcher, &mut batch, options, &null_progress()).await;

        assert_eq!(report.enriched, 8);
        for (i, series) in batch.iter().enumerate() {
            assert_eq!(series.link, links[i]);
            #[allow(clippy::cast_precision_loss)]
            let expected = Some(i as f64).filter(|r| *r <= 5.0);
            assert_eq!(series.rating, expected);
        }
    }
}
